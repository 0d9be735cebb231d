//! Enrichment Orchestrator
//!
//! Turns stored vocabulary entries into persisted cards:
//!
//! 1. **Group**: words per source title, first-seen order, deduplicated
//! 2. **Plan**: keep only words without a (word, source) card
//! 3. **Batch**: fixed-size batches, run in order within a source
//! 4. **Call**: provider call under a timeout; truncated batches are halved
//!    until they fit or a single word still overflows
//! 5. **Store**: insert-if-absent, one transaction per successful call
//!
//! Any other provider or storage failure stops the run. Cards committed by
//! earlier calls are kept.

use crate::batching::{group_by_source, partition, SplitQueue};
use crate::error::{EnrichmentError, EnrichmentResult};
use chrono::Utc;
use futures::stream::{self, TryStreamExt};
use lexicard_core::{
    CardDraft, CardStore, DigestEntry, EnrichedCard, EnrichmentProvider, ProviderError,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default words per provider call
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Default timeout for one provider call
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Words per top-level batch
    pub batch_size: usize,

    /// Applied to every provider call, including split sub-batches
    pub provider_timeout: Duration,

    /// How many sources may be enriched at once; 1 runs them in order
    pub max_parallel_sources: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            max_parallel_sources: 1,
        }
    }
}

/// Outcome of [`EnrichmentOrchestrator::execute_for_entries`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    /// Missing (word, source) pairs found while planning
    pub requested: usize,
    /// Cards actually inserted
    pub created: usize,
    /// Sources with at least one missing word
    pub sources: usize,
    /// Provider calls made, including split retries
    pub provider_calls: usize,
    /// Truncated batches that were halved
    pub splits: usize,
}

impl EnrichmentSummary {
    fn absorb(&mut self, other: SourceOutcome) {
        self.created += other.created;
        self.provider_calls += other.provider_calls;
        self.splits += other.splits;
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SourceOutcome {
    created: usize,
    provider_calls: usize,
    splits: usize,
}

/// Words of one source that still need cards
#[derive(Debug, Clone)]
struct SourcePlan {
    source_title: String,
    missing: Vec<String>,
}

/// Drives batching, truncation backoff and persistence
pub struct EnrichmentOrchestrator {
    provider: Arc<dyn EnrichmentProvider>,
    cards: Arc<dyn CardStore>,
    config: OrchestratorConfig,
}

impl EnrichmentOrchestrator {
    pub fn new(
        provider: Arc<dyn EnrichmentProvider>,
        cards: Arc<dyn CardStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            provider,
            cards,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Generate and store cards for every entry lacking one
    ///
    /// The source title of an entry is its `book_filename`.
    pub async fn execute_for_entries(
        &self,
        entries: &[DigestEntry],
    ) -> EnrichmentResult<EnrichmentSummary> {
        let start = Instant::now();
        let groups = group_by_source(
            entries
                .iter()
                .map(|e| (e.word.as_str(), e.book_filename.as_str())),
        );

        let plans = self.plan(groups).await?;
        let mut summary = EnrichmentSummary {
            requested: plans.iter().map(|p| p.missing.len()).sum(),
            sources: plans.len(),
            ..EnrichmentSummary::default()
        };

        if plans.is_empty() {
            debug!(entries = entries.len(), "Every entry already has a card");
            return Ok(summary);
        }

        info!(
            provider = self.provider.provider_name(),
            sources = summary.sources,
            requested = summary.requested,
            "Starting enrichment"
        );

        let limit = self.config.max_parallel_sources.max(1);
        if limit == 1 {
            for plan in &plans {
                let outcome = self.enrich_source(plan).await?;
                summary.absorb(outcome);
            }
        } else {
            // Different sources overlap; batches of one source stay sequential
            let outcomes: Vec<SourceOutcome> = stream::iter(plans.iter().map(Ok))
                .map_ok(|plan| self.enrich_source(plan))
                .try_buffer_unordered(limit)
                .try_collect()
                .await?;
            for outcome in outcomes {
                summary.absorb(outcome);
            }
        }

        info!(
            requested = summary.requested,
            created = summary.created,
            calls = summary.provider_calls,
            splits = summary.splits,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Enrichment complete"
        );
        Ok(summary)
    }

    /// Regenerate the card for one (word, source) pair and replace it
    ///
    /// Returns `None` when the provider produced no usable draft.
    pub async fn reenrich(
        &self,
        word: &str,
        source_title: &str,
    ) -> EnrichmentResult<Option<EnrichedCard>> {
        let words = vec![word.to_string()];
        let drafts = match self.call_provider(&words, source_title).await {
            Err(EnrichmentError::Provider { error, .. }) if error.is_truncation() => {
                return Err(EnrichmentError::Truncated {
                    word: word.to_string(),
                    source_title: source_title.to_string(),
                })
            }
            other => other?,
        };

        let Some(card) = requested_cards(drafts, &words, source_title).into_iter().next() else {
            warn!(word, source = source_title, "Provider returned no usable card");
            return Ok(None);
        };

        self.cards.upsert(&card).await?;
        info!(word, source = source_title, "Card regenerated");
        Ok(Some(card))
    }

    async fn plan(&self, groups: Vec<(String, Vec<String>)>) -> EnrichmentResult<Vec<SourcePlan>> {
        let mut plans = Vec::new();
        for (source_title, words) in groups {
            let mut missing = Vec::new();
            for word in words {
                if !self.cards.exists(&word, &source_title).await? {
                    missing.push(word);
                }
            }
            if missing.is_empty() {
                debug!(source = %source_title, "No missing cards");
                continue;
            }
            plans.push(SourcePlan {
                source_title,
                missing,
            });
        }
        Ok(plans)
    }

    async fn enrich_source(&self, plan: &SourcePlan) -> EnrichmentResult<SourceOutcome> {
        let mut outcome = SourceOutcome::default();
        let batches = partition(&plan.missing, self.config.batch_size);
        debug!(
            source = %plan.source_title,
            words = plan.missing.len(),
            batches = batches.len(),
            "Enriching source"
        );

        for batch in batches {
            let mut queue = SplitQueue::new(batch);

            while let Some(words) = queue.next_batch() {
                outcome.provider_calls += 1;
                match self.call_provider(&words, &plan.source_title).await {
                    Ok(drafts) => {
                        outcome.created += self.persist(drafts, &words, &plan.source_title).await?;
                    }
                    Err(EnrichmentError::Provider { error, .. }) if error.is_truncation() => {
                        if !queue.split(&words) {
                            return Err(EnrichmentError::Truncated {
                                word: words.first().cloned().unwrap_or_default(),
                                source_title: plan.source_title.clone(),
                            });
                        }
                        warn!(
                            source = %plan.source_title,
                            batch = words.len(),
                            "Provider output truncated, splitting batch"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }

            outcome.splits += queue.splits();
        }

        Ok(outcome)
    }

    async fn call_provider(
        &self,
        words: &[String],
        source_title: &str,
    ) -> EnrichmentResult<Vec<CardDraft>> {
        let timeout = self.config.provider_timeout;
        match tokio::time::timeout(timeout, self.provider.enrich(words, source_title)).await {
            Ok(Ok(drafts)) => Ok(drafts),
            Ok(Err(ProviderError::Timeout { seconds })) => Err(EnrichmentError::ProviderTimeout {
                source_title: source_title.to_string(),
                seconds,
            }),
            Ok(Err(error)) => Err(EnrichmentError::Provider {
                source_title: source_title.to_string(),
                error,
            }),
            Err(_) => Err(EnrichmentError::ProviderTimeout {
                source_title: source_title.to_string(),
                seconds: timeout.as_secs(),
            }),
        }
    }

    async fn persist(
        &self,
        drafts: Vec<CardDraft>,
        words: &[String],
        source_title: &str,
    ) -> EnrichmentResult<usize> {
        let cards = requested_cards(drafts, words, source_title);
        if cards.len() < words.len() {
            debug!(
                source = source_title,
                requested = words.len(),
                returned = cards.len(),
                "Provider returned fewer cards than requested"
            );
        }
        Ok(self.cards.insert_many_if_absent(&cards).await?)
    }
}

/// Cards for drafts that answer a requested word, first draft per word wins
fn requested_cards(drafts: Vec<CardDraft>, words: &[String], source_title: &str) -> Vec<EnrichedCard> {
    let now = Utc::now();
    let mut seen: HashSet<String> = HashSet::new();
    drafts
        .into_iter()
        .filter_map(|draft| {
            let word = draft.word.trim();
            if !words.iter().any(|w| w == word) {
                debug!(word, source = source_title, "Dropping unrequested draft");
                return None;
            }
            if !seen.insert(word.to_string()) {
                return None;
            }
            Some(EnrichedCard::from_draft(draft, source_title, now))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use lexicard_core::InMemoryCardStore;

    fn entries(pairs: &[(&str, &str)]) -> Vec<DigestEntry> {
        pairs
            .iter()
            .map(|(word, book)| DigestEntry::new(word, book, "digest.txt", Utc::now()))
            .collect()
    }

    fn numbered(n: usize, book: &str) -> Vec<DigestEntry> {
        (0..n)
            .map(|i| DigestEntry::new(format!("word{i:02}"), book, "digest.txt", Utc::now()))
            .collect()
    }

    fn orchestrator(
        provider: &ScriptedProvider,
        cards: &InMemoryCardStore,
        config: OrchestratorConfig,
    ) -> EnrichmentOrchestrator {
        EnrichmentOrchestrator::new(Arc::new(provider.clone()), Arc::new(cards.clone()), config)
    }

    #[tokio::test]
    async fn test_single_batch_creates_all_cards() {
        let provider = ScriptedProvider::new();
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());

        let summary = orch
            .execute_for_entries(&entries(&[("swoon", "Book"), ("languid", "Book")]))
            .await
            .unwrap();

        assert_eq!(summary.requested, 2);
        assert_eq!(summary.created, 2);
        assert_eq!(provider.call_sizes(), vec![2]);
        assert!(cards.exists("swoon", "Book").await.unwrap());
    }

    #[tokio::test]
    async fn test_batches_are_fixed_size_and_in_order() {
        let provider = ScriptedProvider::new();
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());

        let summary = orch.execute_for_entries(&numbered(45, "Book")).await.unwrap();

        assert_eq!(provider.call_sizes(), vec![20, 20, 5]);
        assert_eq!(provider.calls()[0].words[0], "word00");
        assert_eq!(provider.calls()[2].words[0], "word40");
        assert_eq!(summary.created, 45);
    }

    #[tokio::test]
    async fn test_every_multiword_batch_truncating_ends_in_single_calls() {
        let provider = ScriptedProvider::new().truncate_above(1);
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());

        let summary = orch.execute_for_entries(&numbered(7, "Book")).await.unwrap();

        let singles = provider.call_sizes().into_iter().filter(|s| *s == 1).count();
        assert_eq!(singles, 7);
        assert_eq!(summary.created, 7);
        assert_eq!(cards.len().await, 7);
        // every split produces exactly one extra call
        assert_eq!(summary.provider_calls, 1 + 2 * summary.splits);
    }

    #[tokio::test]
    async fn test_odd_batch_splits_ceil_then_floor() {
        let provider = ScriptedProvider::new().truncate_size(3);
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());

        let summary = orch
            .execute_for_entries(&entries(&[("a", "B"), ("b", "B"), ("c", "B")]))
            .await
            .unwrap();

        let calls = provider.calls();
        assert_eq!(provider.call_sizes(), vec![3, 2, 1]);
        assert_eq!(calls[1].words, vec!["a", "b"]);
        assert_eq!(calls[2].words, vec!["c"]);
        assert_eq!(summary.created, 3);
        assert_eq!(summary.splits, 1);
    }

    #[tokio::test]
    async fn test_single_word_truncation_is_fatal() {
        let provider = ScriptedProvider::new().truncate_above(0);
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());

        let err = orch
            .execute_for_entries(&entries(&[("sesquipedalian", "B")]))
            .await
            .unwrap_err();

        match err {
            EnrichmentError::Truncated { word, source_title } => {
                assert_eq!(word, "sesquipedalian");
                assert_eq!(source_title, "B");
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_hard_error_aborts_but_keeps_committed_batches() {
        let provider = ScriptedProvider::new()
            .fail_on("word25", ProviderError::RateLimited("quota".into()));
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());

        let err = orch.execute_for_entries(&numbered(45, "Book")).await.unwrap_err();

        assert!(matches!(
            err,
            EnrichmentError::Provider { error: ProviderError::RateLimited(_), .. }
        ));
        // first batch committed, second failed, third never attempted
        assert_eq!(cards.len().await, 20);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let provider = ScriptedProvider::new().with_delay(Duration::from_secs(120));
        let cards = InMemoryCardStore::new();
        let config = OrchestratorConfig {
            provider_timeout: Duration::from_secs(60),
            ..OrchestratorConfig::default()
        };
        let orch = orchestrator(&provider, &cards, config);

        let err = orch
            .execute_for_entries(&entries(&[("swoon", "Book")]))
            .await
            .unwrap_err();

        assert!(matches!(err, EnrichmentError::ProviderTimeout { seconds: 60, .. }));
        assert!(cards.is_empty().await);
    }

    #[tokio::test]
    async fn test_nothing_missing_skips_provider() {
        let provider = ScriptedProvider::new();
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());
        let input = entries(&[("swoon", "Book")]);

        orch.execute_for_entries(&input).await.unwrap();
        let summary = orch.execute_for_entries(&input).await.unwrap();

        assert_eq!(summary, EnrichmentSummary::default());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_short_and_unrequested_results_are_tolerated() {
        let provider = ScriptedProvider::new().omit("b").with_unrequested("zzz");
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());

        let summary = orch
            .execute_for_entries(&entries(&[("a", "B"), ("b", "B")]))
            .await
            .unwrap();

        assert_eq!(summary.requested, 2);
        assert_eq!(summary.created, 1);
        assert!(!cards.exists("zzz", "B").await.unwrap());
    }

    #[tokio::test]
    async fn test_same_word_in_two_sources_gets_two_cards() {
        let provider = ScriptedProvider::new();
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());

        let summary = orch
            .execute_for_entries(&entries(&[("swoon", "A"), ("swoon", "B"), ("swoon", "A")]))
            .await
            .unwrap();

        assert_eq!(summary.sources, 2);
        assert_eq!(summary.created, 2);
        let sources: Vec<String> = provider.calls().into_iter().map(|c| c.source_title).collect();
        assert_eq!(sources, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_parallel_sources_produce_same_cards() {
        let provider = ScriptedProvider::new().truncate_above(3);
        let cards = InMemoryCardStore::new();
        let config = OrchestratorConfig {
            max_parallel_sources: 2,
            ..OrchestratorConfig::default()
        };
        let orch = orchestrator(&provider, &cards, config);

        let mut input = numbered(5, "A");
        input.extend(
            (0..4).map(|i| DigestEntry::new(format!("other{i}"), "B", "digest.txt", Utc::now())),
        );
        input.extend(numbered(2, "C").into_iter().map(|mut e| {
            e.word = format!("c-{}", e.word);
            e
        }));

        let summary = orch.execute_for_entries(&input).await.unwrap();

        assert_eq!(summary.requested, 11);
        assert_eq!(summary.created, 11);
        assert_eq!(cards.len().await, 11);
    }

    #[tokio::test]
    async fn test_reenrich_replaces_existing_card() {
        let provider = ScriptedProvider::new();
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());
        orch.execute_for_entries(&entries(&[("swoon", "Book")]))
            .await
            .unwrap();
        let before = cards.find("swoon", "Book").await.unwrap().unwrap();

        let card = orch.reenrich("swoon", "Book").await.unwrap().unwrap();

        let after = cards.find("swoon", "Book").await.unwrap().unwrap();
        assert_eq!(after.canonical_answer, card.canonical_answer);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_reenrich_without_result_changes_nothing() {
        let provider = ScriptedProvider::new().omit("swoon");
        let cards = InMemoryCardStore::new();
        let orch = orchestrator(&provider, &cards, OrchestratorConfig::default());

        assert!(orch.reenrich("swoon", "Book").await.unwrap().is_none());
        assert!(cards.is_empty().await);
    }
}
