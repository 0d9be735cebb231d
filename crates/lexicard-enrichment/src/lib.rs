//! # Lexicard Enrichment
//!
//! Turns vocabulary entries into flashcards through an
//! [`EnrichmentProvider`](lexicard_core::EnrichmentProvider).
//!
//! ## Architecture
//!
//! - **Dependencies**: only `lexicard-core` traits; the provider and card store
//!   are injected as `Arc<dyn Trait>`
//! - **Pure planning**: grouping, batching and truncation splitting live in
//!   [`batching`] and never touch I/O
//! - **Orchestration**: [`EnrichmentOrchestrator`] sequences provider calls and
//!   persists results
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lexicard_enrichment::{EnrichmentOrchestrator, OrchestratorConfig};
//!
//! let orchestrator = EnrichmentOrchestrator::new(provider, cards, OrchestratorConfig::default());
//! let summary = orchestrator.execute_for_entries(&entries).await?;
//! println!("{} of {} cards created", summary.created, summary.requested);
//! ```

pub mod batching;
pub mod error;
pub mod orchestrator;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{EnrichmentError, EnrichmentResult};
pub use orchestrator::{
    EnrichmentOrchestrator, EnrichmentSummary, OrchestratorConfig, DEFAULT_BATCH_SIZE,
    DEFAULT_PROVIDER_TIMEOUT,
};
