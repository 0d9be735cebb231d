//! # Lexicard Core
//!
//! Domain types and contracts shared by every Lexicard crate.
//!
//! ## Architecture
//!
//! Core defines abstractions; infrastructure crates implement them:
//! - `lexicard-sqlite` implements the [`storage`] traits
//! - `lexicard-llm` implements [`EnrichmentProvider`]
//! - `lexicard-deck` implements [`DeckClient`] (AnkiConnect)
//!
//! Higher-level crates (`lexicard-pipeline`, `lexicard-cli`) wire concrete
//! implementations together and pass them around as `Arc<dyn Trait>`.

pub mod deck;
pub mod enrichment;
pub mod hashing;
pub mod model;
pub mod storage;

pub use deck::{DeckClient, DeckError, DeckResult, NewNote, NoteId, RemoteNote};
pub use enrichment::{EnrichmentProvider, ProviderError, ProviderResult};
pub use hashing::{fingerprint, fingerprint_file};
pub use model::{CardDraft, DigestEntry, EnrichedCard, FileRecord, PartOfSpeech};
pub use storage::{
    CardStore, EntryStore, FileLedger, InMemoryCardStore, InMemoryEntryStore, InMemoryFileLedger,
    StorageError, StorageResult,
};
