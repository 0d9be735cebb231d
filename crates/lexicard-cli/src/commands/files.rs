use anyhow::{bail, Context, Result};
use lexicard_core::FileLedger;
use lexicard_pipeline::ledger_key;
use std::path::Path;

use crate::cli::FilesCommands;
use crate::context::AppContext;
use crate::output::{files_table, print_json, OutputFormat};

/// Execute files subcommand
pub async fn execute(context: &AppContext, cmd: FilesCommands, format: OutputFormat) -> Result<()> {
    let ledger = &context.stores.ledger;
    match cmd {
        FilesCommands::List => {
            let records = ledger.list().await.context("Failed to list file records")?;
            match format {
                OutputFormat::Json => print_json(&records)?,
                OutputFormat::Text if records.is_empty() => println!("No tracked files"),
                OutputFormat::Text => println!("{}", files_table(&records)),
            }
        }
        FilesCommands::Forget { path } => {
            // Records are keyed by canonical path; a deleted file can only be named by its key
            let key = ledger_key(Path::new(&path)).unwrap_or_else(|_| path.clone());
            let removed = ledger.forget(&key).await.context("Failed to forget file")?;
            if !removed {
                bail!("No record for '{}'", path);
            }
            println!("Forgot '{}'; it will be processed on the next run", path);
        }
    }
    Ok(())
}
