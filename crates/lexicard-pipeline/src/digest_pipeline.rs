//! Digest Processing Pipeline
//!
//! ## Stages
//!
//! 1. **Fingerprint**: BLAKE3 of the file content; unchanged files are skipped
//! 2. **Ledger**: the new fingerprint is recorded *before* parsing, so a
//!    failure later in the run does not cause the same content to be
//!    re-ingested on the next event
//! 3. **Ingest**: parse, then insert absent entries as one batch
//! 4. **Enrich**: cards for the parsed entries the store holds under the same
//!    book; an occurrence of a word already recorded under another book is dropped
//! 5. **Push**: reconcile the distinct books of those entries
//!
//! Files are keyed in the ledger by their canonical path, so a relative and an
//! absolute spelling of the same file share one record.
//!
//! Events are processed one at a time; nothing here runs stages concurrently.

use anyhow::{Context, Result};
use chrono::Utc;
use lexicard_core::{fingerprint_file, DigestEntry, EntryStore, FileLedger};
use lexicard_deck::{DeckReconciler, PushSummary};
use lexicard_enrichment::{EnrichmentOrchestrator, EnrichmentSummary};
use lexicard_parser::{parse_with_stats, ParseStats};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Configuration for pipeline behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Process even when the fingerprint matches the ledger
    pub force: bool,
    /// Run enrichment when an orchestrator is configured
    pub enrich: bool,
    /// Run the deck push when a reconciler is configured
    pub push: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            force: false,
            enrich: true,
            push: true,
        }
    }
}

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Content matched the stored fingerprint
    Skipped { path: PathBuf, fingerprint: String },
    Processed(ProcessReport),
}

impl PipelineOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Skipped { path, .. } => path,
            Self::Processed(report) => &report.path,
        }
    }
}

/// Per-stage results of a processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub path: PathBuf,
    pub fingerprint: String,
    pub entries_parsed: usize,
    /// Parsed entries whose word was not yet stored
    pub entries_inserted: usize,
    pub parse_stats: ParseStats,
    /// `None` when enrichment did not run
    pub enrichment: Option<EnrichmentSummary>,
    /// `None` when the push did not run
    pub push: Option<PushSummary>,
}

/// The main pipeline orchestrator
///
/// ```text
/// DigestPipeline
///   ├─> FileLedger            (fingerprint compare + upsert)
///   ├─> lexicard-parser       (text -> entries)
///   ├─> EntryStore            (insert absent entries)
///   ├─> EnrichmentOrchestrator (optional)
///   └─> DeckReconciler        (optional)
/// ```
pub struct DigestPipeline {
    ledger: Arc<dyn FileLedger>,
    entries: Arc<dyn EntryStore>,
    enrichment: Option<Arc<EnrichmentOrchestrator>>,
    reconciler: Option<Arc<DeckReconciler>>,
    config: PipelineConfig,
}

impl DigestPipeline {
    /// Ingest-only pipeline with default configuration
    pub fn new(ledger: Arc<dyn FileLedger>, entries: Arc<dyn EntryStore>) -> Self {
        Self {
            ledger,
            entries,
            enrichment: None,
            reconciler: None,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_enrichment(mut self, orchestrator: Arc<EnrichmentOrchestrator>) -> Self {
        self.enrichment = Some(orchestrator);
        self
    }

    pub fn with_reconciler(mut self, reconciler: Arc<DeckReconciler>) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage for one file
    ///
    /// An error aborts the remaining stages for this file only. Entries and
    /// cards committed by earlier stages stay committed.
    pub async fn process(&self, path: &Path) -> Result<PipelineOutcome> {
        let start = Instant::now();
        let path_key = ledger_key(path)
            .with_context(|| format!("Failed to resolve digest path '{}'", path.display()))?;

        let (content, fingerprint) = fingerprint_file(path)
            .await
            .with_context(|| format!("Failed to read digest file '{}'", path.display()))?;

        if !self.config.force {
            let stored = self
                .ledger
                .lookup(&path_key)
                .await
                .with_context(|| format!("Failed to look up file record for '{}'", path.display()))?;
            if stored.is_some_and(|record| record.fingerprint == fingerprint) {
                debug!(path = %path.display(), "Digest unchanged, skipping");
                return Ok(PipelineOutcome::Skipped {
                    path: path.to_path_buf(),
                    fingerprint,
                });
            }
        }

        self.ledger
            .upsert_fingerprint(&path_key, &fingerprint)
            .await
            .with_context(|| format!("Failed to record fingerprint for '{}'", path.display()))?;

        let text = String::from_utf8_lossy(&content);
        let (parsed, parse_stats) = parse_with_stats(&text, &path_key, Utc::now());
        let entries_inserted = self
            .entries
            .insert_many_if_absent(&parsed)
            .await
            .with_context(|| format!("Failed to store entries from '{}'", path.display()))?;
        info!(
            path = %path.display(),
            parsed = parsed.len(),
            inserted = entries_inserted,
            "Ingested digest"
        );

        let accepted = self.accepted(&parsed).await?;
        if accepted.len() < parsed.len() {
            debug!(
                path = %path.display(),
                dropped = parsed.len() - accepted.len(),
                "Words already recorded under another book"
            );
        }

        let enrichment = self.enrich(&accepted).await?;
        let push = self.push(&accepted).await?;

        info!(
            path = %path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Processed digest"
        );

        Ok(PipelineOutcome::Processed(ProcessReport {
            path: path.to_path_buf(),
            fingerprint,
            entries_parsed: parsed.len(),
            entries_inserted,
            parse_stats,
            enrichment,
            push,
        }))
    }

    /// Process paths from `events` one at a time until the channel closes
    ///
    /// A failing file is logged and does not stop the loop. Returns the number
    /// of events handled.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<PathBuf>) -> usize {
        let mut handled = 0;
        while let Some(path) = events.recv().await {
            handled += 1;
            match self.process(&path).await {
                Ok(PipelineOutcome::Skipped { .. }) => {}
                Ok(PipelineOutcome::Processed(report)) => {
                    debug!(path = %path.display(), inserted = report.entries_inserted, "Event handled");
                }
                Err(e) => {
                    error!(path = %path.display(), error = ?e, "Failed to process digest");
                }
            }
        }
        handled
    }

    /// Parsed entries whose stored entry carries the same book, one per word
    async fn accepted(&self, parsed: &[DigestEntry]) -> Result<Vec<DigestEntry>> {
        let mut seen = HashSet::new();
        let mut accepted = Vec::with_capacity(parsed.len());
        for entry in parsed {
            if !seen.insert(entry.word.as_str()) {
                continue;
            }
            let stored = self
                .entries
                .find_by_word(&entry.word)
                .await
                .with_context(|| format!("Failed to look up entry '{}'", entry.word))?;
            if stored.is_some_and(|stored| stored.book_filename == entry.book_filename) {
                accepted.push(entry.clone());
            }
        }
        Ok(accepted)
    }

    async fn enrich(&self, parsed: &[DigestEntry]) -> Result<Option<EnrichmentSummary>> {
        let Some(orchestrator) = self.enrichment.as_ref().filter(|_| self.config.enrich) else {
            return Ok(None);
        };
        if parsed.is_empty() {
            return Ok(None);
        }
        let summary = orchestrator
            .execute_for_entries(parsed)
            .await
            .context("Enrichment failed")?;
        Ok(Some(summary))
    }

    async fn push(&self, parsed: &[DigestEntry]) -> Result<Option<PushSummary>> {
        let Some(reconciler) = self.reconciler.as_ref().filter(|_| self.config.push) else {
            return Ok(None);
        };
        let sources = distinct_books(parsed);
        if sources.is_empty() {
            return Ok(None);
        }
        let summary = reconciler
            .push_for_sources(&sources)
            .await
            .context("Deck push failed")?;
        Ok(Some(summary))
    }
}

/// Ledger key of a digest file: its canonical absolute path
pub fn ledger_key(path: &Path) -> std::io::Result<String> {
    Ok(std::fs::canonicalize(path)?.to_string_lossy().to_string())
}

/// Book titles in first-seen order
fn distinct_books(entries: &[DigestEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| seen.insert(e.book_filename.as_str()))
        .map(|e| e.book_filename.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_books_keeps_first_seen_order() {
        let now = Utc::now();
        let entries = vec![
            DigestEntry::new("a", "B2", "f", now),
            DigestEntry::new("b", "B1", "f", now),
            DigestEntry::new("c", "B2", "f", now),
        ];
        assert_eq!(distinct_books(&entries), vec!["B2", "B1"]);
    }

    #[test]
    fn test_ledger_key_resolves_dot_dot() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let path = dir.path().join("digest.txt");
        std::fs::write(&path, "swoon").unwrap();

        let direct = ledger_key(&path).unwrap();
        let indirect = ledger_key(&dir.path().join("sub").join("..").join("digest.txt")).unwrap();
        assert_eq!(direct, indirect);
        assert!(ledger_key(&dir.path().join("missing.txt")).is_err());
    }
}
