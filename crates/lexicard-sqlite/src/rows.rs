//! Column codecs shared by the stores

use chrono::{DateTime, Utc};
use lexicard_core::{DigestEntry, EnrichedCard, FileRecord, PartOfSpeech};
use rusqlite::types::Type;
use rusqlite::Row;

pub(crate) fn encode_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

fn decode_time(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// `path, fingerprint, last_seen`
pub(crate) fn file_record(row: &Row) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        path: row.get(0)?,
        fingerprint: row.get(1)?,
        last_seen: decode_time(row, 2)?,
    })
}

/// `word, book_filename, source_file, created_at`
pub(crate) fn digest_entry(row: &Row) -> rusqlite::Result<DigestEntry> {
    Ok(DigestEntry {
        word: row.get(0)?,
        book_filename: row.get(1)?,
        source_file: row.get(2)?,
        created_at: decode_time(row, 3)?,
    })
}

pub(crate) const CARD_COLUMNS: &str = "word, source_title, canonical_answer, alternate_answer, \
     part_of_speech, definition, example_sentence, hint, created_at, updated_at";

/// Row laid out as [`CARD_COLUMNS`]
pub(crate) fn enriched_card(row: &Row) -> rusqlite::Result<EnrichedCard> {
    let pos: String = row.get(4)?;
    let part_of_speech = pos
        .parse::<PartOfSpeech>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(EnrichedCard {
        word: row.get(0)?,
        source_title: row.get(1)?,
        canonical_answer: row.get(2)?,
        alternate_answer: row.get(3)?,
        part_of_speech,
        definition: row.get(5)?,
        example_sentence: row.get(6)?,
        hint: row.get(7)?,
        created_at: decode_time(row, 8)?,
        updated_at: decode_time(row, 9)?,
    })
}
