//! Loading, layering and validation

use crate::config::LexicardConfig;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variables consulted by [`LexicardConfig::load`]
pub const ENV_VARS: [&str; 6] = [
    "LEXICARD_DB_PATH",
    "LEXICARD_WATCH_DIR",
    "LEXICARD_LLM_ENDPOINT",
    "LEXICARD_LLM_MODEL",
    "OPENAI_API_KEY",
    "LEXICARD_ANKI_URL",
];

/// `<config dir>/lexicard/config.toml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("lexicard").join("config.toml"))
}

impl LexicardConfig {
    /// Load configuration with precedence: defaults < file < env
    ///
    /// An explicit `config_file` must exist; the default location is optional.
    pub fn load(config_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_file {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path() {
                Ok(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Overlay environment values obtained through `lookup`
    ///
    /// Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = get("LEXICARD_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(dir) = get("LEXICARD_WATCH_DIR") {
            self.watch.directory = Some(PathBuf::from(dir));
        }
        if let Some(endpoint) = get("LEXICARD_LLM_ENDPOINT") {
            self.llm.endpoint = endpoint;
        }
        if let Some(model) = get("LEXICARD_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(api_key) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(api_key);
        }
        if let Some(url) = get("LEXICARD_ANKI_URL") {
            self.deck.endpoint = url;
        }
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enrichment.batch_size == 0 {
            return Err(ConfigError::invalid("enrichment.batch_size", "must be at least 1"));
        }
        if self.enrichment.max_parallel_sources == 0 {
            return Err(ConfigError::invalid(
                "enrichment.max_parallel_sources",
                "must be at least 1",
            ));
        }
        if self.enrichment.provider_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "enrichment.provider_timeout_secs",
                "must be at least 1",
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::invalid("llm.temperature", "must be within 0.0..=2.0"));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::invalid("llm.max_tokens", "must be at least 1"));
        }
        if self.deck.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "deck.request_timeout_secs",
                "must be at least 1",
            ));
        }
        if self.deck.deck_prefix.trim().is_empty() {
            return Err(ConfigError::invalid("deck.deck_prefix", "must not be empty"));
        }
        if self.deck.note_type.trim().is_empty() {
            return Err(ConfigError::invalid("deck.note_type", "must not be empty"));
        }
        for (key, name) in self.deck.fields.named() {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("deck.fields.{key}"),
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Write an annotated example config to `path`
    pub fn create_example(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, EXAMPLE_CONFIG).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Wrote example configuration");
        Ok(())
    }
}

const EXAMPLE_CONFIG: &str = r#"# Lexicard Configuration
# Location: ~/.config/lexicard/config.toml

[database]
# SQLite file holding the file ledger, entries and cards
# Override: LEXICARD_DB_PATH
# path = "/home/user/.local/share/lexicard/lexicard.db"

[watch]
# Directory your reader exports vocabulary digests into
# Override: LEXICARD_WATCH_DIR
# directory = "/home/user/Documents/digests"

# Glob matched against file names
pattern = "*.txt"

# Quiet period (ms) before a burst of file events is processed
debounce_ms = 500

recursive = false

[enrichment]
enabled = true

# Words per provider call; halved automatically when output is truncated
batch_size = 20

# Overlap calls for different books (results are identical, only faster)
parallel_sources = false
max_parallel_sources = 2

# Timeout for a single provider call
provider_timeout_secs = 60

[llm]
# OpenAI-compatible endpoint, without /chat/completions
# Override: LEXICARD_LLM_ENDPOINT
endpoint = "https://api.openai.com/v1"

# Override: LEXICARD_LLM_MODEL
model = "gpt-4o-mini"

temperature = 0.3
max_tokens = 4096

# API key (prefer the OPENAI_API_KEY env var)
# api_key = "sk-..."

[deck]
enabled = true

# AnkiConnect URL
# Override: LEXICARD_ANKI_URL
endpoint = "http://localhost:8765"
request_timeout_secs = 30

# Cards for "Book.epub" land in "Vocabulary::Book.epub"
deck_prefix = "Vocabulary"

# Note type; it must exist and have the fields below
note_type = "Lexicard"

tags = ["lexicard"]

# Ask Anki to sync after a push that created or updated notes
sync_after_push = true

[deck.fields]
word = "Word"
answer = "Answer"
alternate_answer = "AlternateAnswer"
part_of_speech = "PartOfSpeech"
definition = "Definition"
example = "Example"
hint = "Hint"
source = "Source"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = LexicardConfig::default();
        config.validate().unwrap();
        assert_eq!(config.enrichment.batch_size, 20);
        assert_eq!(config.enrichment.provider_timeout_secs, 60);
        assert_eq!(config.deck.endpoint, "http://localhost:8765");
        assert_eq!(config.deck.request_timeout_secs, 30);
        assert_eq!(config.deck.fields.word, "Word");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[enrichment]\nbatch_size = 5\n\n[deck]\ndeck_prefix = \"Words\"\n",
        )
        .unwrap();

        let config = LexicardConfig::load(Some(path)).unwrap();
        assert_eq!(config.enrichment.batch_size, 5);
        assert_eq!(config.enrichment.provider_timeout_secs, 60);
        assert_eq!(config.deck.deck_prefix, "Words");
        assert_eq!(config.deck.note_type, "Lexicard");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = LexicardConfig::load(Some(temp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[enrichment\nbatch_size = ").unwrap();

        let err = LexicardConfig::from_file(&path).unwrap_err();
        match err {
            ConfigError::Parse { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = LexicardConfig::default();
        config.apply_env_from(env(&[
            ("LEXICARD_DB_PATH", "/tmp/lex.db"),
            ("LEXICARD_WATCH_DIR", "/tmp/digests"),
            ("LEXICARD_LLM_MODEL", "local-model"),
            ("OPENAI_API_KEY", "sk-test"),
            ("LEXICARD_ANKI_URL", "http://anki:8765"),
        ]));

        assert_eq!(config.database.path, PathBuf::from("/tmp/lex.db"));
        assert_eq!(config.watch.directory, Some(PathBuf::from("/tmp/digests")));
        assert_eq!(config.llm.model, "local-model");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.deck.endpoint, "http://anki:8765");
        assert_eq!(config.llm.endpoint, "https://api.openai.com/v1");
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = LexicardConfig::default();
        config.apply_env_from(env(&[("LEXICARD_LLM_MODEL", "  ")]));
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = LexicardConfig::default();
        config.enrichment.batch_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("enrichment.batch_size"));
    }

    #[test]
    fn test_validate_rejects_zero_deck_timeout() {
        let mut config = LexicardConfig::default();
        config.deck.request_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("deck.request_timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_blank_field_name() {
        let mut config = LexicardConfig::default();
        config.deck.fields.hint = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("deck.fields.hint"));
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        LexicardConfig::create_example(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Lexicard Configuration"));
        let parsed = LexicardConfig::from_file(&path).unwrap();
        let defaults = LexicardConfig::default();
        assert_eq!(parsed.enrichment, defaults.enrichment);
        assert_eq!(parsed.deck, defaults.deck);
        assert_eq!(parsed.llm, defaults.llm);
    }

    #[test]
    fn test_toml_rendering_round_trips() {
        let config = LexicardConfig::default();
        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("[deck.fields]"));
        let parsed: LexicardConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
