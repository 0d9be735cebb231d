//! # Lexicard LLM
//!
//! [`EnrichmentProvider`](lexicard_core::EnrichmentProvider) backed by any
//! OpenAI-compatible chat completions endpoint (OpenAI, Ollama, LM Studio,
//! vLLM, ...).
//!
//! Output cut off by `max_tokens` is reported as
//! [`ProviderError::Truncated`](lexicard_core::ProviderError::Truncated) so the
//! orchestrator can split the batch.

pub mod openai;
pub mod prompt;
pub mod response;

pub use openai::{OpenAiCompatConfig, OpenAiCompatProvider};
