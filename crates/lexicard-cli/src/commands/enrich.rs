use anyhow::{Context, Result};
use colored::Colorize;
use lexicard_core::{DigestEntry, EntryStore};

use crate::context::AppContext;
use crate::output::{card_lines, enrichment_json, enrichment_line, print_json, OutputFormat};

/// Execute enrich command
pub async fn execute(
    context: &AppContext,
    sources: Vec<String>,
    force: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    match force {
        Some(word) => reenrich(context, &word, format).await,
        None => enrich_missing(context, sources, format).await,
    }
}

async fn enrich_missing(context: &AppContext, sources: Vec<String>, format: OutputFormat) -> Result<()> {
    let entries = load_entries(context, &sources).await?;
    let summary = context
        .orchestrator()
        .execute_for_entries(&entries)
        .await
        .context("Enrichment failed")?;

    match format {
        OutputFormat::Json => print_json(&enrichment_json(&summary))?,
        OutputFormat::Text => println!("{}", enrichment_line(&summary)),
    }
    Ok(())
}

async fn reenrich(context: &AppContext, word: &str, format: OutputFormat) -> Result<()> {
    let entry = context
        .stores
        .entries
        .find_by_word(word)
        .await
        .context("Failed to look up entry")?
        .with_context(|| format!("No entry for '{}'", word))?;

    let card = context
        .orchestrator()
        .reenrich(&entry.word, &entry.book_filename)
        .await
        .with_context(|| format!("Failed to regenerate card for '{}'", word))?;

    match (card, format) {
        (Some(card), OutputFormat::Json) => print_json(&card)?,
        (Some(card), OutputFormat::Text) => {
            for line in card_lines(&card) {
                println!("{}", line);
            }
        }
        (None, OutputFormat::Json) => print_json(&serde_json::Value::Null)?,
        (None, OutputFormat::Text) => println!(
            "{} provider returned no card for '{}'; the stored card is unchanged",
            "Warning:".yellow().bold(),
            word
        ),
    }
    Ok(())
}

async fn load_entries(context: &AppContext, sources: &[String]) -> Result<Vec<DigestEntry>> {
    let store = &context.stores.entries;
    if sources.is_empty() {
        return store.find_all().await.context("Failed to load entries");
    }
    let mut entries = Vec::new();
    for source in sources {
        let found = store
            .find_by_book(source)
            .await
            .with_context(|| format!("Failed to load entries of '{}'", source))?;
        entries.extend(found);
    }
    Ok(entries)
}
