//! Configuration types and defaults

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level Lexicard configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexicardConfig {
    /// Persistent store settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Digest directory watching
    #[serde(default)]
    pub watch: WatchConfig,

    /// Enrichment orchestration
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Generative provider endpoint
    #[serde(default)]
    pub llm: LlmConfig,

    /// Remote deck reconciliation
    #[serde(default)]
    pub deck: DeckConfig,
}

/// Persistent store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file (`:memory:` for an ephemeral store)
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("lexicard").join("lexicard.db"))
        .unwrap_or_else(|| PathBuf::from("lexicard.db"))
}

/// Digest directory watching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Directory holding digest exports
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Glob matched against file names
    #[serde(default = "default_watch_pattern")]
    pub pattern: String,

    /// Quiet period before a burst of file events is delivered
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Watch subdirectories too
    #[serde(default)]
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directory: None,
            pattern: default_watch_pattern(),
            debounce_ms: default_debounce_ms(),
            recursive: false,
        }
    }
}

fn default_watch_pattern() -> String {
    "*.txt".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

/// Enrichment orchestration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Run enrichment after ingestion
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Words per provider call before any truncation split
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Overlap batches of independent sources
    #[serde(default)]
    pub parallel_sources: bool,

    /// Upper bound on sources enriched at once when `parallel_sources` is set
    #[serde(default = "default_max_parallel_sources")]
    pub max_parallel_sources: usize,

    /// Timeout applied to every provider call
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            batch_size: default_batch_size(),
            parallel_sources: false,
            max_parallel_sources: default_max_parallel_sources(),
            provider_timeout_secs: default_provider_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    20
}

fn default_max_parallel_sources() -> usize {
    2
}

fn default_provider_timeout_secs() -> u64 {
    60
}

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL, without the `/chat/completions` suffix
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// API key (usually supplied through `OPENAI_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token limit per call; hitting it triggers batch splitting
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: None,
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    4096
}

/// Remote deck reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Push cards after enrichment
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// AnkiConnect URL
    #[serde(default = "default_anki_endpoint")]
    pub endpoint: String,

    /// Per-request AnkiConnect timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Parent deck; each source title becomes one child deck
    #[serde(default = "default_deck_prefix")]
    pub deck_prefix: String,

    /// Note type (card type) used for created notes
    #[serde(default = "default_note_type")]
    pub note_type: String,

    /// Note field names
    #[serde(default)]
    pub fields: DeckFields,

    /// Tags attached to every pushed note
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,

    /// Trigger a remote sync after a push that changed something
    #[serde(default = "default_true")]
    pub sync_after_push: bool,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_anki_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            deck_prefix: default_deck_prefix(),
            note_type: default_note_type(),
            fields: DeckFields::default(),
            tags: default_tags(),
            sync_after_push: true,
        }
    }
}

fn default_anki_endpoint() -> String {
    "http://localhost:8765".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_deck_prefix() -> String {
    "Vocabulary".to_string()
}

fn default_note_type() -> String {
    "Lexicard".to_string()
}

fn default_tags() -> Vec<String> {
    vec!["lexicard".to_string()]
}

/// Names of the note fields each card attribute is written to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckFields {
    /// Headword field; notes are matched on its exact value
    pub word: String,
    pub answer: String,
    pub alternate_answer: String,
    pub part_of_speech: String,
    pub definition: String,
    pub example: String,
    pub hint: String,
    pub source: String,
}

impl Default for DeckFields {
    fn default() -> Self {
        Self {
            word: "Word".to_string(),
            answer: "Answer".to_string(),
            alternate_answer: "AlternateAnswer".to_string(),
            part_of_speech: "PartOfSpeech".to_string(),
            definition: "Definition".to_string(),
            example: "Example".to_string(),
            hint: "Hint".to_string(),
            source: "Source".to_string(),
        }
    }
}

impl DeckFields {
    /// All configured field names, paired with their config key
    pub fn named(&self) -> [(&'static str, &str); 8] {
        [
            ("word", self.word.as_str()),
            ("answer", self.answer.as_str()),
            ("alternate_answer", self.alternate_answer.as_str()),
            ("part_of_speech", self.part_of_speech.as_str()),
            ("definition", self.definition.as_str()),
            ("example", self.example.as_str()),
            ("hint", self.hint.as_str()),
            ("source", self.source.as_str()),
        ]
    }
}
