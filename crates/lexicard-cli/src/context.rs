//! Process-wide wiring
//!
//! One [`AppContext`] is built per invocation. It owns the only database
//! handle; every component receives the stores from here.

use anyhow::{Context, Result};
use lexicard_config::{DeckConfig, EnrichmentConfig, LexicardConfig, LlmConfig};
use lexicard_deck::{AnkiConnectClient, DeckReconciler, NoteFields, ReconcilerConfig};
use lexicard_enrichment::{EnrichmentOrchestrator, OrchestratorConfig};
use lexicard_llm::{OpenAiCompatConfig, OpenAiCompatProvider};
use lexicard_pipeline::{DigestPipeline, PipelineConfig};
use lexicard_sqlite::{SqliteConfig, SqliteStores};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct AppContext {
    pub config: LexicardConfig,
    pub stores: SqliteStores,
}

impl AppContext {
    /// Open the configured database; the pool creates its directory
    pub fn open(config: LexicardConfig) -> Result<Self> {
        let sqlite = SqliteConfig::new(&config.database.path);
        debug!(path = %sqlite.path.display(), "Opening database");
        let stores = SqliteStores::open(sqlite).with_context(|| {
            format!("Failed to open database '{}'", config.database.path.display())
        })?;
        Ok(Self { config, stores })
    }

    pub fn orchestrator(&self) -> Arc<EnrichmentOrchestrator> {
        let provider = OpenAiCompatProvider::new(provider_config(&self.config.llm));
        Arc::new(EnrichmentOrchestrator::new(
            Arc::new(provider),
            self.stores.cards.clone(),
            orchestrator_config(&self.config.enrichment),
        ))
    }

    pub fn reconciler(&self) -> Arc<DeckReconciler> {
        let client = anki_client(&self.config.deck);
        Arc::new(DeckReconciler::new(
            Arc::new(client),
            self.stores.cards.clone(),
            reconciler_config(&self.config.deck),
        ))
    }

    /// Pipeline with the stages the config enables and the flags allow
    pub fn pipeline(&self, config: PipelineConfig) -> DigestPipeline {
        let mut pipeline = DigestPipeline::new(self.stores.ledger.clone(), self.stores.entries.clone())
            .with_config(config);
        if config.enrich && self.config.enrichment.enabled {
            pipeline = pipeline.with_enrichment(self.orchestrator());
        }
        if config.push && self.config.deck.enabled {
            pipeline = pipeline.with_reconciler(self.reconciler());
        }
        pipeline
    }
}

pub fn provider_config(llm: &LlmConfig) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        endpoint: llm.endpoint.clone(),
        api_key: llm.api_key.clone(),
        model: llm.model.clone(),
        temperature: llm.temperature,
        max_tokens: llm.max_tokens,
        ..OpenAiCompatConfig::default()
    }
}

pub fn orchestrator_config(enrichment: &EnrichmentConfig) -> OrchestratorConfig {
    OrchestratorConfig {
        batch_size: enrichment.batch_size,
        provider_timeout: Duration::from_secs(enrichment.provider_timeout_secs),
        max_parallel_sources: if enrichment.parallel_sources {
            enrichment.max_parallel_sources
        } else {
            1
        },
    }
}

pub fn anki_client(deck: &DeckConfig) -> AnkiConnectClient {
    AnkiConnectClient::new(deck.endpoint.clone())
        .with_timeout(Duration::from_secs(deck.request_timeout_secs))
}

pub fn reconciler_config(deck: &DeckConfig) -> ReconcilerConfig {
    let fields = &deck.fields;
    ReconcilerConfig {
        deck_prefix: deck.deck_prefix.clone(),
        note_type: deck.note_type.clone(),
        fields: NoteFields {
            word: fields.word.clone(),
            answer: fields.answer.clone(),
            alternate_answer: fields.alternate_answer.clone(),
            part_of_speech: fields.part_of_speech.clone(),
            definition: fields.definition.clone(),
            example: fields.example.clone(),
            hint: fields.hint.clone(),
            source: fields.source.clone(),
        },
        base_tags: deck.tags.clone(),
        sync_after_push: deck.sync_after_push,
    }
}
