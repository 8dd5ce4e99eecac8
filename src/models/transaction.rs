use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::{AppError, AppResult};

/// 在庫に影響する操作の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionAction {
    Checkout,
    Checkin,
    Usage,
    Restock,
    Adjustment,
}

impl TransactionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionAction::Checkout => "checkout",
            TransactionAction::Checkin => "checkin",
            TransactionAction::Usage => "usage",
            TransactionAction::Restock => "restock",
            TransactionAction::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checkout" => Ok(TransactionAction::Checkout),
            "checkin" => Ok(TransactionAction::Checkin),
            "usage" => Ok(TransactionAction::Usage),
            "restock" => Ok(TransactionAction::Restock),
            "adjustment" => Ok(TransactionAction::Adjustment),
            other => Err(AppError::InvalidInput(format!("unknown action '{}'", other))),
        }
    }
}

/// 工具 / 消耗品の区別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Tool,
    Consumable,
}

impl ItemKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tool" => Some(ItemKind::Tool),
            "consumable" => Some(ItemKind::Consumable),
            _ => None,
        }
    }
}

/// 表示用フィールド（集計ロジックからは不透明）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    pub item_name: Option<String>,
    pub staff_name: Option<String>,
    pub processed_by: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
}

impl TransactionMetadata {
    /// Reads each field on its own. A key holding a non-string value is
    /// dropped without affecting the other fields.
    pub fn from_json(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        let text = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| map.get(*key))
                .filter_map(Value::as_str)
                .find(|s| !s.trim().is_empty())
                .map(str::to_string)
        };

        Self {
            item_name: text(&[
                "itemName",
                "toolName",
                "consumableName",
                "item_name",
                "tool_name",
                "consumable_name",
            ]),
            staff_name: text(&["staffName", "staff_name"]),
            processed_by: text(&[
                "processedBy",
                "processedByName",
                "processed_by",
                "processed_by_name",
            ]),
            brand: text(&["brand"]),
            model: text(&["model"]),
        }
    }
}

/// Validated transaction record. Built once at the store boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub id: String,
    pub action: TransactionAction,
    /// `None` when the source record carried no timestamp.
    pub timestamp: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub batch_id: Option<String>,
    pub metadata: TransactionMetadata,
    pub kind: Option<ItemKind>,
}

impl TransactionRecord {
    pub fn new(id: impl Into<String>, action: TransactionAction) -> Self {
        Self {
            id: id.into(),
            action,
            timestamp: None,
            notes: None,
            batch_id: None,
            metadata: TransactionMetadata::default(),
            kind: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_metadata(mut self, metadata: TransactionMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// transactionsテーブルの行（未検証）
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: String,
    pub action: String,
    pub occurred_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub batch_id: Option<String>,
    /// JSON text
    pub metadata: Option<String>,
    #[sqlx(rename = "type")]
    pub item_type: Option<String>,
}

/// スナップショットJSON上のトランザクション（ドキュメントストアのエクスポート形式）
///
/// Optional fields stay untyped until conversion so one malformed value only
/// drops that field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDocument {
    pub id: String,
    pub action: String,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub notes: Option<Value>,
    #[serde(default)]
    pub batch_id: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, rename = "type")]
    pub item_type: Option<Value>,
}

/// 文字列以外の値は警告してNoneにする
fn text_value(id: &str, field: &str, value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            tracing::warn!("transaction {}: {} is not a string ({}), ignoring", id, field, other);
            None
        }
    }
}

fn timestamp_value(id: &str, value: Option<Value>) -> Option<DateTime<Utc>> {
    let text = text_value(id, "timestamp", value)?;
    match DateTime::parse_from_rfc3339(text.trim()) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!("transaction {}: invalid timestamp '{}' ({}), ignoring", id, text, e);
            None
        }
    }
}

impl From<TransactionDocument> for TransactionRow {
    fn from(doc: TransactionDocument) -> Self {
        let id = doc.id;
        Self {
            action: doc.action,
            occurred_at: timestamp_value(&id, doc.timestamp),
            notes: text_value(&id, "notes", doc.notes),
            batch_id: text_value(&id, "batchId", doc.batch_id),
            metadata: doc.metadata.filter(|v| !v.is_null()).map(|v| v.to_string()),
            item_type: text_value(&id, "type", doc.item_type),
            id,
        }
    }
}

/// 空文字列はNoneとして扱う
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl TryFrom<TransactionRow> for TransactionRecord {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> AppResult<Self> {
        if row.id.trim().is_empty() {
            return Err(AppError::InvalidRecord("transaction without id".to_string()));
        }

        let action: TransactionAction = row.action.parse().map_err(|_| {
            AppError::InvalidRecord(format!(
                "transaction {}: unknown action '{}'",
                row.id, row.action
            ))
        })?;

        let kind = match non_blank(row.item_type) {
            Some(t) => {
                let kind = ItemKind::parse(&t);
                if kind.is_none() {
                    tracing::warn!("transaction {}: unknown type '{}', ignoring", row.id, t);
                }
                kind
            }
            None => None,
        };

        let metadata = match non_blank(row.metadata) {
            Some(json) => match serde_json::from_str::<Value>(&json) {
                Ok(value) => TransactionMetadata::from_json(&value),
                Err(e) => {
                    tracing::warn!("transaction {}: malformed metadata ({}), ignoring", row.id, e);
                    TransactionMetadata::default()
                }
            },
            None => TransactionMetadata::default(),
        };

        Ok(Self {
            id: row.id,
            action,
            timestamp: row.occurred_at,
            notes: non_blank(row.notes),
            batch_id: non_blank(row.batch_id),
            metadata,
            kind,
        })
    }
}
