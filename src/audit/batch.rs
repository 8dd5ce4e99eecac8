use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::models::TransactionRecord;

/// `batch` フィルタが探す目印。抽出用の正規表現より緩い判定
pub const BATCH_MARKER: &str = "BATCH_";

/// 一括操作で書き込まれるノート: "Batch operation: BATCH_<digits>"
static RE_BATCH_OPERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Batch operation: (BATCH_[0-9]+)").unwrap());

/// 旧形式のノート: "Batch ID: BATCH_<digits>"
static RE_BATCH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Batch ID:\s*(BATCH_[0-9]+)").unwrap());

/// Where a batch id was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSource {
    /// The record's own `batch_id` field.
    Explicit,
    /// Notes matched `Batch operation: BATCH_<digits>`.
    Operation,
    /// Notes matched `Batch ID: BATCH_<digits>`.
    IdPattern,
}

/// Result of batch-id extraction. Consumers decide which sources they honor:
/// grouping takes any match, the unique-batch stat only `Operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchExtraction<'a> {
    Matched { source: BatchSource, batch_id: &'a str },
    Unmatched,
}

impl<'a> BatchExtraction<'a> {
    /// Explicit field first, then the notes patterns.
    pub fn from_record(record: &'a TransactionRecord) -> Self {
        if let Some(batch_id) = record.batch_id.as_deref().filter(|s| !s.is_empty()) {
            return BatchExtraction::Matched {
                source: BatchSource::Explicit,
                batch_id,
            };
        }
        match record.notes.as_deref() {
            Some(notes) => Self::from_notes(notes),
            None => BatchExtraction::Unmatched,
        }
    }

    /// "Batch operation" pattern first, then "Batch ID".
    pub fn from_notes(notes: &'a str) -> Self {
        let matched = |re: &Regex, source| {
            re.captures(notes)
                .and_then(|caps| caps.get(1))
                .map(|m| BatchExtraction::Matched {
                    source,
                    batch_id: m.as_str(),
                })
        };
        matched(&RE_BATCH_OPERATION, BatchSource::Operation)
            .or_else(|| matched(&RE_BATCH_ID, BatchSource::IdPattern))
            .unwrap_or(BatchExtraction::Unmatched)
    }

    pub fn batch_id(&self) -> Option<&'a str> {
        match self {
            BatchExtraction::Matched { batch_id, .. } => Some(batch_id),
            BatchExtraction::Unmatched => None,
        }
    }

    pub fn source(&self) -> Option<BatchSource> {
        match self {
            BatchExtraction::Matched { source, .. } => Some(*source),
            BatchExtraction::Unmatched => None,
        }
    }
}

/// Notes contain the batch marker. Does not require a well-formed id.
pub fn has_batch_marker(record: &TransactionRecord) -> bool {
    record
        .notes
        .as_deref()
        .is_some_and(|notes| notes.contains(BATCH_MARKER))
}

/// 新しいバッチID: "BATCH_<unix millis>"
pub fn new_batch_id(at: DateTime<Utc>) -> String {
    format!("{}{}", BATCH_MARKER, at.timestamp_millis())
}

/// Note written on every member of a batch checkout/check-in.
pub fn batch_operation_note(batch_id: &str) -> String {
    format!("Batch operation: {}", batch_id)
}
