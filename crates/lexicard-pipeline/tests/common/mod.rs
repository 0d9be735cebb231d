//! Common test utilities for pipeline tests.

#![allow(dead_code)]

use lexicard_core::{InMemoryCardStore, InMemoryEntryStore, InMemoryFileLedger};
use lexicard_deck::testing::FakeDeck;
use lexicard_deck::{DeckReconciler, ReconcilerConfig};
use lexicard_enrichment::testing::ScriptedProvider;
use lexicard_enrichment::{EnrichmentOrchestrator, OrchestratorConfig};
use lexicard_pipeline::DigestPipeline;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Write a digest file into `dir` and return its path.
pub fn write_digest(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn path_key(path: &Path) -> String {
    lexicard_pipeline::ledger_key(path).unwrap()
}

/// In-memory stores plus the fakes behind a fully wired pipeline.
#[derive(Clone)]
pub struct Harness {
    pub ledger: InMemoryFileLedger,
    pub entries: InMemoryEntryStore,
    pub cards: InMemoryCardStore,
    pub provider: ScriptedProvider,
    pub deck: FakeDeck,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_provider(ScriptedProvider::new())
    }

    pub fn with_provider(provider: ScriptedProvider) -> Self {
        Self {
            ledger: InMemoryFileLedger::new(),
            entries: InMemoryEntryStore::new(),
            cards: InMemoryCardStore::new(),
            provider,
            deck: FakeDeck::new("Word"),
        }
    }

    pub fn ingest_only(&self) -> DigestPipeline {
        DigestPipeline::new(Arc::new(self.ledger.clone()), Arc::new(self.entries.clone()))
    }

    pub fn orchestrator(&self) -> Arc<EnrichmentOrchestrator> {
        Arc::new(EnrichmentOrchestrator::new(
            Arc::new(self.provider.clone()),
            Arc::new(self.cards.clone()),
            OrchestratorConfig::default(),
        ))
    }

    pub fn reconciler(&self) -> Arc<DeckReconciler> {
        Arc::new(DeckReconciler::new(
            Arc::new(self.deck.clone()),
            Arc::new(self.cards.clone()),
            ReconcilerConfig::default(),
        ))
    }

    pub fn full(&self) -> DigestPipeline {
        self.ingest_only()
            .with_enrichment(self.orchestrator())
            .with_reconciler(self.reconciler())
    }
}
