use anyhow::{Context, Result};
use lexicard_core::CardStore;

use crate::context::AppContext;
use crate::output::{print_json, push_json, push_line, OutputFormat};

/// Execute push command
///
/// Without `--source`, every source that has cards is pushed.
pub async fn execute(context: &AppContext, sources: Vec<String>, format: OutputFormat) -> Result<()> {
    let sources = if sources.is_empty() {
        context
            .stores
            .cards
            .list_sources()
            .await
            .context("Failed to list card sources")?
    } else {
        sources
    };

    if sources.is_empty() {
        match format {
            OutputFormat::Json => print_json(&serde_json::json!({ "sources": 0 }))?,
            OutputFormat::Text => println!("No cards to push"),
        }
        return Ok(());
    }

    let summary = context
        .reconciler()
        .push_for_sources(&sources)
        .await
        .context("Deck push failed")?;

    match format {
        OutputFormat::Json => print_json(&push_json(&summary))?,
        OutputFormat::Text => println!("{}", push_line(&summary)),
    }
    Ok(())
}
