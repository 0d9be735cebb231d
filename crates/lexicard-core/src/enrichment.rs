//! Enrichment Provider Contract
//!
//! A provider turns a batch of words from one source into card drafts. The
//! orchestrator in `lexicard-enrichment` owns batching and persistence; a
//! provider only talks to the generative backend.
//!
//! Providers must report output cut off by a size limit as
//! [`ProviderError::Truncated`] and nothing else, because that variant drives
//! the orchestrator's batch splitting.

use crate::model::CardDraft;
use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by an enrichment provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Output hit the provider's size/token limit before completing
    #[error("Provider output was truncated: {0}")]
    Truncated(String),

    /// The provider did not answer in time
    #[error("Provider request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Provider rejected credentials: {0}")]
    Auth(String),

    #[error("Provider rate limit or quota exceeded: {0}")]
    RateLimited(String),

    #[error("Provider refused the request: {0}")]
    Refused(String),

    #[error("Provider HTTP error: {0}")]
    Http(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether this is the truncation signal
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated(_))
    }
}

/// Result type for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Generates card drafts for a batch of words.
///
/// Returning fewer drafts than words (including none) is legitimate:
/// malformed items are dropped by the provider, never surfaced as errors.
/// Output does not need to be deterministic across retries.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Generate drafts for `words`, all taken from `source_title`
    async fn enrich(&self, words: &[String], source_title: &str) -> ProviderResult<Vec<CardDraft>>;

    /// Human readable provider name for logs
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_truncated_is_truncation() {
        assert!(ProviderError::Truncated("length".into()).is_truncation());
        assert!(!ProviderError::Timeout { seconds: 60 }.is_truncation());
        assert!(!ProviderError::RateLimited("429".into()).is_truncation());
    }
}
