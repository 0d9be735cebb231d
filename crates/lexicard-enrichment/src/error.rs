//! Enrichment errors

use lexicard_core::{ProviderError, StorageError};
use thiserror::Error;

/// Why an enrichment run stopped early
///
/// Cards committed before the failure stay committed.
#[derive(Error, Debug, Clone)]
pub enum EnrichmentError {
    /// The provider failed with something other than truncation
    #[error("Provider failed for source '{source_title}': {error}")]
    Provider {
        source_title: String,
        #[source]
        error: ProviderError,
    },

    /// A provider call exceeded the configured timeout
    #[error("Provider timed out after {seconds}s for source '{source_title}'")]
    ProviderTimeout { source_title: String, seconds: u64 },

    /// A single word still overflowed the provider's output limit
    #[error("Output for '{word}' ({source_title}) is truncated even on its own")]
    Truncated { word: String, source_title: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for orchestrator operations
pub type EnrichmentResult<T> = Result<T, EnrichmentError>;
