//! Pipeline Orchestration Layer
//!
//! Sequences the stages that run once per observed digest file:
//! 1. **Fingerprint**: hash the file content and compare with the file ledger
//! 2. **Ingest**: record the new fingerprint, parse, store absent entries
//! 3. **Enrich**: generate cards for the parsed entries (optional)
//! 4. **Push**: reconcile the touched sources with the remote deck (optional)
//!
//! Stores, orchestrator and reconciler are injected; this crate only decides
//! the order and what to skip.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lexicard_pipeline::{DigestPipeline, PipelineConfig};
//!
//! let pipeline = DigestPipeline::new(ledger, entries)
//!     .with_enrichment(orchestrator)
//!     .with_reconciler(reconciler);
//!
//! let outcome = pipeline.process(&path).await?;
//! ```

pub mod digest_pipeline;

pub use digest_pipeline::*;
