use anyhow::{bail, Context, Result};
use lexicard_core::{CardStore, EntryStore};

use crate::cli::EntriesCommands;
use crate::context::AppContext;
use crate::output::{card_lines, entries_table, print_json, OutputFormat};

/// Execute entries subcommand
pub async fn execute(context: &AppContext, cmd: EntriesCommands, format: OutputFormat) -> Result<()> {
    match cmd {
        EntriesCommands::List { book } => list(context, book, format).await,
        EntriesCommands::Show { word } => show(context, &word, format).await,
        EntriesCommands::Delete { word } => delete(context, &word).await,
    }
}

async fn list(context: &AppContext, book: Option<String>, format: OutputFormat) -> Result<()> {
    let store = &context.stores.entries;
    let entries = match book {
        Some(book) => store.find_by_book(&book).await,
        None => store.find_all().await,
    }
    .context("Failed to load entries")?;

    match format {
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Text if entries.is_empty() => println!("No entries"),
        OutputFormat::Text => println!("{}", entries_table(&entries)),
    }
    Ok(())
}

async fn show(context: &AppContext, word: &str, format: OutputFormat) -> Result<()> {
    let entry = context
        .stores
        .entries
        .find_by_word(word)
        .await
        .context("Failed to look up entry")?
        .with_context(|| format!("No entry for '{}'", word))?;
    let card = context
        .stores
        .cards
        .find(&entry.word, &entry.book_filename)
        .await
        .context("Failed to look up card")?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "entry": entry, "card": card }))?,
        OutputFormat::Text => {
            println!("{} from {}", entry.word, entry.book_filename);
            println!("  file:  {}", entry.source_file);
            println!("  added: {}", entry.created_at.format("%Y-%m-%d %H:%M"));
            match card {
                Some(card) => card_lines(&card).iter().for_each(|line| println!("{}", line)),
                None => println!("  (no card yet)"),
            }
        }
    }
    Ok(())
}

async fn delete(context: &AppContext, word: &str) -> Result<()> {
    let removed = context
        .stores
        .entries
        .delete_by_word(word)
        .await
        .context("Failed to delete entry")?;
    if !removed {
        bail!("No entry for '{}'", word);
    }
    println!("Deleted '{}'", word);
    Ok(())
}
