use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::batch::BatchExtraction;
use crate::models::{ItemKind, TransactionAction, TransactionRecord};

pub const UNKNOWN: &str = "Unknown";

/// Transactions sharing one batch id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchGroup {
    pub batch_id: String,
    pub members: Vec<TransactionRecord>,
    pub representative_action: Option<TransactionAction>,
    pub representative_staff_name: String,
    pub representative_processed_by: String,
    /// Timestamp of the representative member, else the earliest known one.
    pub representative_timestamp: Option<DateTime<Utc>>,
}

impl BatchGroup {
    fn new(batch_id: String, members: Vec<TransactionRecord>) -> Self {
        // 工具を優先し、なければ消耗品。種別内では最も早いメンバー
        // （時刻不明は後回し、同時刻は出現順）
        let earliest = |kind: ItemKind| {
            members
                .iter()
                .filter(|t| t.kind == Some(kind))
                .min_by_key(|t| (t.timestamp.is_none(), t.timestamp))
        };
        let lead = earliest(ItemKind::Tool).or_else(|| earliest(ItemKind::Consumable));

        let representative_staff_name = lead
            .and_then(|t| t.metadata.staff_name.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let representative_processed_by = lead
            .and_then(|t| t.metadata.processed_by.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let representative_timestamp = lead
            .and_then(|t| t.timestamp)
            .or_else(|| members.iter().filter_map(|t| t.timestamp).min());

        Self {
            representative_action: lead.map(|t| t.action),
            representative_staff_name,
            representative_processed_by,
            representative_timestamp,
            batch_id,
            members,
        }
    }

    pub fn tool_count(&self) -> usize {
        self.members
            .iter()
            .filter(|t| t.kind == Some(ItemKind::Tool))
            .count()
    }

    pub fn consumable_count(&self) -> usize {
        self.members
            .iter()
            .filter(|t| t.kind == Some(ItemKind::Consumable))
            .count()
    }
}

/// One row of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupedItem {
    Batch(BatchGroup),
    Individual { transaction: TransactionRecord },
}

impl GroupedItem {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            GroupedItem::Batch(group) => group.representative_timestamp,
            GroupedItem::Individual { transaction } => transaction.timestamp,
        }
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        match self {
            GroupedItem::Batch(group) => &group.members,
            GroupedItem::Individual { transaction } => std::slice::from_ref(transaction),
        }
    }
}

/// Clusters transactions by batch id and orders the result newest first.
///
/// Batch groups (in first-encounter order) precede individual items before the
/// stable sort, so equal timestamps keep that relative order. Items with an
/// unknown timestamp sort last.
pub fn group_transactions(records: &[TransactionRecord]) -> Vec<GroupedItem> {
    let mut batches: Vec<(String, Vec<TransactionRecord>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut individuals = Vec::new();

    for record in records {
        match BatchExtraction::from_record(record).batch_id() {
            Some(batch_id) => match index.get(batch_id) {
                Some(&i) => batches[i].1.push(record.clone()),
                None => {
                    index.insert(batch_id.to_string(), batches.len());
                    batches.push((batch_id.to_string(), vec![record.clone()]));
                }
            },
            None => individuals.push(GroupedItem::Individual {
                transaction: record.clone(),
            }),
        }
    }

    let mut items: Vec<GroupedItem> = batches
        .into_iter()
        .map(|(batch_id, members)| GroupedItem::Batch(BatchGroup::new(batch_id, members)))
        .chain(individuals)
        .collect();

    // Option順序ではNoneが最小なので、降順ソートで不明な時刻は末尾に並ぶ
    items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    items
}
