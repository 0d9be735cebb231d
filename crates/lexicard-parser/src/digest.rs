//! Digest text parser
//!
//! A digest alternates bare headword lines with link-style reference lines:
//!
//! ```text
//! swoon
//! [Book.epub](Document/Book.epub)
//! ```
//!
//! A reference line is recognised by a substring heuristic: it contains `[`,
//! then `](`, then `)`, in that order. Anything that does not fit the
//! headword/reference pairing is skipped; parsing never fails.

use chrono::{DateTime, Utc};
use lexicard_core::DigestEntry;
use tracing::debug;

/// Counters describing how a digest was read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Non-blank lines seen
    pub lines: usize,
    /// Headword/reference pairs that produced an entry
    pub pairs: usize,
    /// Headword lines not followed by a reference line
    pub unpaired_headwords: usize,
    /// Reference lines with no headword before them
    pub orphan_references: usize,
}

/// Parse `text`, stamping entries with the current time
pub fn parse(text: &str, source_label: &str) -> Vec<DigestEntry> {
    parse_at(text, source_label, Utc::now())
}

/// Parse `text` with an explicit creation timestamp
pub fn parse_at(text: &str, source_label: &str, created_at: DateTime<Utc>) -> Vec<DigestEntry> {
    parse_with_stats(text, source_label, created_at).0
}

/// Parse `text` and report what was skipped
pub fn parse_with_stats(
    text: &str,
    source_label: &str,
    created_at: DateTime<Utc>,
) -> (Vec<DigestEntry>, ParseStats) {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut stats = ParseStats {
        lines: lines.len(),
        ..ParseStats::default()
    };
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if reference_display_text(line).is_some() {
            stats.orphan_references += 1;
            i += 1;
            continue;
        }

        match lines.get(i + 1).and_then(|next| reference_display_text(next)) {
            Some(book) => {
                if book.is_empty() {
                    debug!(word = line, source = source_label, "Reference line has no display text");
                }
                entries.push(DigestEntry::new(line, book, source_label, created_at));
                stats.pairs += 1;
                i += 2;
            }
            None => {
                stats.unpaired_headwords += 1;
                i += 1;
            }
        }
    }

    debug!(
        source = source_label,
        lines = stats.lines,
        pairs = stats.pairs,
        unpaired = stats.unpaired_headwords,
        orphans = stats.orphan_references,
        "Parsed digest"
    );

    (entries, stats)
}

/// Whether `line` looks like a `[display](target)` reference
pub fn is_reference_line(line: &str) -> bool {
    reference_display_text(line).is_some()
}

/// Trimmed display text of a reference line, or `None` for any other line
fn reference_display_text(line: &str) -> Option<&str> {
    let open = line.find('[')?;
    let after_open = open + 1;
    let close = after_open + line[after_open..].find("](")?;
    let after_pair = close + 2;
    line[after_pair..].find(')')?;
    Some(line[after_open..close].trim())
}
