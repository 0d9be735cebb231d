//! Scripted provider for tests
//!
//! Produces a well-formed draft for every requested word and records each
//! call. Behaviour can be scripted per batch size or per word.

use async_trait::async_trait;
use lexicard_core::{CardDraft, EnrichmentProvider, PartOfSpeech, ProviderError, ProviderResult};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// One recorded `enrich` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub words: Vec<String>,
    pub source_title: String,
}

#[derive(Debug, Default)]
struct ScriptState {
    calls: Vec<RecordedCall>,
    truncate_above: Option<usize>,
    truncate_sizes: HashSet<usize>,
    fail_words: Vec<(String, ProviderError)>,
    omit_words: HashSet<String>,
    extra_words: Vec<String>,
    delay: Option<Duration>,
}

/// Deterministic [`EnrichmentProvider`] with call recording
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report truncation for every batch larger than `max_words`
    pub fn truncate_above(self, max_words: usize) -> Self {
        self.state.lock().truncate_above = Some(max_words);
        self
    }

    /// Report truncation for batches of exactly `size` words
    pub fn truncate_size(self, size: usize) -> Self {
        self.state.lock().truncate_sizes.insert(size);
        self
    }

    /// Fail any batch containing `word`
    pub fn fail_on(self, word: &str, error: ProviderError) -> Self {
        self.state.lock().fail_words.push((word.to_string(), error));
        self
    }

    /// Silently leave `word` out of the results
    pub fn omit(self, word: &str) -> Self {
        self.state.lock().omit_words.insert(word.to_string());
        self
    }

    /// Add a draft for a word nobody asked for to every response
    pub fn with_unrequested(self, word: &str) -> Self {
        self.state.lock().extra_words.push(word.to_string());
        self
    }

    /// Sleep before answering
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    /// Sizes of every recorded batch, in call order
    pub fn call_sizes(&self) -> Vec<usize> {
        self.state.lock().calls.iter().map(|c| c.words.len()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// The draft this provider returns for `word`
    pub fn draft_for(word: &str, source_title: &str) -> CardDraft {
        CardDraft {
            word: word.to_string(),
            canonical_answer: format!("{word}-answer"),
            alternate_answer: None,
            part_of_speech: PartOfSpeech::Noun,
            definition: format!("meaning of the headword from {source_title}"),
            example_sentence: format!("A sentence using {word}."),
            source_title: source_title.to_string(),
            hint: format!("starts with {}", word.chars().next().unwrap_or('?')),
        }
    }
}

#[async_trait]
impl EnrichmentProvider for ScriptedProvider {
    async fn enrich(&self, words: &[String], source_title: &str) -> ProviderResult<Vec<CardDraft>> {
        let delay = {
            let mut state = self.state.lock();
            state.calls.push(RecordedCall {
                words: words.to_vec(),
                source_title: source_title.to_string(),
            });
            state.delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock();
        if let Some((_, error)) = state
            .fail_words
            .iter()
            .find(|(word, _)| words.contains(word))
        {
            return Err(error.clone());
        }
        let over_limit = state.truncate_above.is_some_and(|max| words.len() > max);
        if over_limit || state.truncate_sizes.contains(&words.len()) {
            return Err(ProviderError::Truncated(format!("{} words", words.len())));
        }

        let mut drafts: Vec<CardDraft> = words
            .iter()
            .filter(|word| !state.omit_words.contains(*word))
            .map(|word| Self::draft_for(word, source_title))
            .collect();
        drafts.extend(
            state
                .extra_words
                .iter()
                .map(|word| Self::draft_for(word, source_title)),
        );
        Ok(drafts)
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}
