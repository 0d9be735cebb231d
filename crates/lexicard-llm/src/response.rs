//! Decoding model output into card drafts
//!
//! Items are validated one by one. An item with a missing or blank required
//! field, or a part of speech outside the closed set, is dropped; the rest of
//! the batch is kept.

use lexicard_core::{CardDraft, PartOfSpeech, ProviderError, ProviderResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    word: Option<String>,
    canonical_answer: Option<String>,
    alternate_answer: Option<String>,
    part_of_speech: Option<String>,
    definition: Option<String>,
    example_sentence: Option<String>,
    source_title: Option<String>,
    hint: Option<String>,
}

/// Parse the assistant message content
///
/// Content that is not JSON is reported as truncation when it looks cut off,
/// otherwise as an invalid response.
pub fn parse_drafts(content: &str, source_title: &str) -> ProviderResult<Vec<CardDraft>> {
    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) if looks_truncated(content) => {
            return Err(ProviderError::Truncated(format!("incomplete JSON: {e}")))
        }
        Err(e) => return Err(ProviderError::InvalidResponse(format!("not JSON: {e}"))),
    };

    let items = match value {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ProviderError::InvalidResponse(
                    "response object has no \"items\" array".to_string(),
                ))
            }
        },
        Value::Array(items) => items,
        _ => {
            return Err(ProviderError::InvalidResponse(
                "response is neither an object nor an array".to_string(),
            ))
        }
    };

    let total = items.len();
    let drafts: Vec<CardDraft> = items
        .into_iter()
        .filter_map(|item| validate(item, source_title))
        .collect();

    if drafts.len() < total {
        debug!(
            kept = drafts.len(),
            dropped = total - drafts.len(),
            "Dropped malformed items"
        );
    }
    Ok(drafts)
}

fn validate(item: Value, source_title: &str) -> Option<CardDraft> {
    let raw: RawItem = serde_json::from_value(item).ok()?;

    let required = |field: Option<String>| field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let part_of_speech = raw.part_of_speech?.parse::<PartOfSpeech>().ok()?;

    Some(CardDraft {
        word: required(raw.word)?,
        canonical_answer: required(raw.canonical_answer)?,
        alternate_answer: required(raw.alternate_answer),
        part_of_speech,
        definition: required(raw.definition)?,
        example_sentence: required(raw.example_sentence)?,
        source_title: required(raw.source_title).unwrap_or_else(|| source_title.to_string()),
        hint: required(raw.hint)?,
    })
}

/// Whether `content` ends inside an open string, object or array
pub fn looks_truncated(content: &str) -> bool {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return false;
    }

    let mut depth: i64 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for c in trimmed.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            _ => {}
        }
    }

    in_string || depth > 0
}
