//! Deck names, tags and search queries

/// Fallback title when a source title sanitizes to nothing
pub const UNTITLED_SOURCE: &str = "Untitled";

/// Make a source title safe to use as one deck level
///
/// Path separators become spaces, whitespace runs collapse to one space and
/// runs of `:` collapse to a single `:`, so the title never adds a `::`
/// hierarchy level of its own.
pub fn sanitize_title(title: &str) -> String {
    let spaced: String = title
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let mut out = String::with_capacity(spaced.len());
    for c in spaced.split_whitespace().collect::<Vec<_>>().join(" ").chars() {
        if c == ':' && out.ends_with(':') {
            continue;
        }
        out.push(c);
    }

    let out = out.trim().to_string();
    if out.is_empty() {
        UNTITLED_SOURCE.to_string()
    } else {
        out
    }
}

/// `prefix::title`, or the sanitized title alone when the prefix is blank
pub fn deck_name(prefix: &str, source_title: &str) -> String {
    let title = sanitize_title(source_title);
    let prefix = prefix.trim().trim_end_matches(':');
    if prefix.is_empty() {
        title
    } else {
        format!("{prefix}::{title}")
    }
}

/// A tag cannot contain whitespace
pub fn tag(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Escape text for use inside a double-quoted search term
///
/// `*` and `_` are wildcards and `\` / `"` delimit the term.
pub fn escape_search(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '*' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Exact-match query for one headword in one deck and note type
pub fn note_query(deck: &str, note_type: &str, field: &str, value: &str) -> String {
    format!(
        r#"deck:"{}" note:"{}" "{}:{}""#,
        escape_search(deck),
        escape_search(note_type),
        escape_search(field),
        escape_search(value)
    )
}
