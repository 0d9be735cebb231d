use anyhow::{bail, Result};
use colored::Colorize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::error;

use crate::cli::StageFlags;
use crate::context::AppContext;
use crate::output::{outcome_json, outcome_lines, print_json, OutputFormat};
use lexicard_pipeline::PipelineConfig;

/// Execute ingest command
///
/// Every path is attempted; the command fails afterwards if any path failed.
pub async fn execute(
    context: &AppContext,
    paths: Vec<PathBuf>,
    force: bool,
    stages: StageFlags,
    format: OutputFormat,
) -> Result<()> {
    let pipeline = context.pipeline(pipeline_config(force, stages));

    let mut outcomes: Vec<Value> = Vec::with_capacity(paths.len());
    let mut failed = 0;
    for path in &paths {
        match pipeline.process(path).await {
            Ok(outcome) => match format {
                OutputFormat::Json => outcomes.push(outcome_json(&outcome)),
                OutputFormat::Text => {
                    for line in outcome_lines(&outcome) {
                        println!("{}", line);
                    }
                }
            },
            Err(e) => {
                failed += 1;
                error!(path = %path.display(), error = ?e, "Ingest failed");
                match format {
                    OutputFormat::Json => outcomes.push(serde_json::json!({
                        "path": path,
                        "status": "failed",
                        "error": format!("{e:#}"),
                    })),
                    OutputFormat::Text => {
                        eprintln!("{} {}: {:#}", "Error:".red().bold(), path.display(), e)
                    }
                }
            }
        }
    }

    if format == OutputFormat::Json {
        print_json(&outcomes)?;
    }
    if failed > 0 {
        bail!("{} of {} files failed", failed, paths.len());
    }
    Ok(())
}

pub fn pipeline_config(force: bool, stages: StageFlags) -> PipelineConfig {
    PipelineConfig {
        force,
        enrich: !stages.no_enrich,
        push: !stages.no_push,
    }
}
