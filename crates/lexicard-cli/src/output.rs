//! Output formatting
//!
//! Text output is a table or a few lines per record; JSON output is one
//! pretty-printed document per command.

use anyhow::{Context, Result};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, Table};
use lexicard_core::{DigestEntry, EnrichedCard, FileRecord};
use lexicard_deck::PushSummary;
use lexicard_enrichment::EnrichmentSummary;
use lexicard_pipeline::PipelineOutcome;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

pub fn entries_table(entries: &[DigestEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Word", "Book", "Source file", "Added"]);
    for entry in entries {
        table.add_row(vec![
            entry.word.clone(),
            entry.book_filename.clone(),
            entry.source_file.clone(),
            entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table
}

pub fn files_table(records: &[FileRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Path", "Fingerprint", "Last seen"]);
    for record in records {
        table.add_row(vec![
            record.path.clone(),
            short_fingerprint(&record.fingerprint).to_string(),
            record.last_seen.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table
}

pub fn card_lines(card: &EnrichedCard) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", card.word, card.part_of_speech),
        format!("  answer:     {}", card.canonical_answer),
    ];
    if let Some(alternate) = &card.alternate_answer {
        lines.push(format!("  alternate:  {}", alternate));
    }
    lines.push(format!("  definition: {}", card.definition));
    lines.push(format!("  example:    {}", card.example_sentence));
    lines.push(format!("  hint:       {}", card.hint));
    lines.push(format!("  source:     {}", card.source_title));
    lines
}

pub fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

pub fn enrichment_json(summary: &EnrichmentSummary) -> Value {
    json!({
        "requested": summary.requested,
        "created": summary.created,
        "sources": summary.sources,
        "provider_calls": summary.provider_calls,
        "splits": summary.splits,
    })
}

pub fn push_json(summary: &PushSummary) -> Value {
    json!({
        "created": summary.created,
        "updated": summary.updated,
        "unchanged": summary.unchanged,
        "skipped": summary.skipped,
        "synced": summary.synced,
    })
}

pub fn enrichment_line(summary: &EnrichmentSummary) -> String {
    format!(
        "enriched {} of {} missing cards ({} calls, {} splits)",
        summary.created, summary.requested, summary.provider_calls, summary.splits
    )
}

pub fn push_line(summary: &PushSummary) -> String {
    format!(
        "pushed: {} created, {} updated, {} unchanged, {} skipped{}",
        summary.created,
        summary.updated,
        summary.unchanged,
        summary.skipped,
        if summary.synced { ", synced" } else { "" }
    )
}

pub fn outcome_json(outcome: &PipelineOutcome) -> Value {
    match outcome {
        PipelineOutcome::Skipped { path, fingerprint } => json!({
            "path": path,
            "status": "unchanged",
            "fingerprint": fingerprint,
        }),
        PipelineOutcome::Processed(report) => json!({
            "path": report.path,
            "status": "processed",
            "fingerprint": report.fingerprint,
            "entries_parsed": report.entries_parsed,
            "entries_inserted": report.entries_inserted,
            "enrichment": report.enrichment.as_ref().map(enrichment_json),
            "push": report.push.as_ref().map(push_json),
        }),
    }
}

pub fn outcome_lines(outcome: &PipelineOutcome) -> Vec<String> {
    match outcome {
        PipelineOutcome::Skipped { path, .. } => {
            vec![format!("{}: unchanged, skipped", path.display())]
        }
        PipelineOutcome::Processed(report) => {
            let mut lines = vec![format!(
                "{}: {} entries parsed, {} new",
                report.path.display(),
                report.entries_parsed,
                report.entries_inserted
            )];
            if let Some(summary) = &report.enrichment {
                lines.push(format!("  {}", enrichment_line(summary)));
            }
            if let Some(summary) = &report.push {
                lines.push(format!("  {}", push_line(summary)));
            }
            lines
        }
    }
}
