//! Batch planning
//!
//! Pure helpers over immutable word lists. The orchestrator drives
//! [`SplitQueue`] with provider outcomes; nothing here performs I/O.

/// Group `(word, source)` pairs per source, deduplicating words within each
///
/// Sources and words keep first-seen order.
pub fn group_by_source<'a, I>(pairs: I) -> Vec<(String, Vec<String>)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for (word, source) in pairs {
        let index = match groups.iter().position(|(s, _)| s == source) {
            Some(index) => index,
            None => {
                groups.push((source.to_string(), Vec::new()));
                groups.len() - 1
            }
        };
        let words = &mut groups[index].1;
        if !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    groups
}

/// Fixed-size batches; the last one may be shorter
pub fn partition(words: &[String], batch_size: usize) -> Vec<Vec<String>> {
    words
        .chunks(batch_size.max(1))
        .map(<[String]>::to_vec)
        .collect()
}

/// Halves of a batch: the first takes the extra word when the length is odd
pub fn split_half(words: &[String]) -> (&[String], &[String]) {
    words.split_at(words.len().div_ceil(2))
}

/// Explicit work stack for one top-level batch
///
/// Sub-batches come out in word order: after [`SplitQueue::split`] the first
/// half is attempted before the second.
#[derive(Debug)]
pub struct SplitQueue {
    stack: Vec<Vec<String>>,
    splits: usize,
}

impl SplitQueue {
    pub fn new(batch: Vec<String>) -> Self {
        Self {
            stack: vec![batch],
            splits: 0,
        }
    }

    /// Next sub-batch to attempt
    pub fn next_batch(&mut self) -> Option<Vec<String>> {
        self.stack.pop()
    }

    /// Re-queue `words` as two halves. Returns `false` for a batch of one,
    /// which cannot be split further.
    pub fn split(&mut self, words: &[String]) -> bool {
        if words.len() < 2 {
            return false;
        }
        let (first, second) = split_half(words);
        self.stack.push(second.to_vec());
        self.stack.push(first.to_vec());
        self.splits += 1;
        true
    }

    /// Number of splits performed so far
    pub fn splits(&self) -> usize {
        self.splits
    }
}
