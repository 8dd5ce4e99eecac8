use std::path::Path;

use serde::Deserialize;

use super::{records_from_rows, InventoryStore, TransactionQuery};
use crate::error::AppResult;
use crate::models::{
    ConsumableModel, ToolModel, TransactionDocument, TransactionRecord, TransactionRow,
};

/// ドキュメントストアからエクスポートしたJSON
///
/// Transactions are kept as raw values so a malformed entry is skipped on its
/// own instead of failing the whole file.
#[derive(Debug, Default, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub transactions: Vec<serde_json::Value>,
    #[serde(default)]
    pub consumables: Vec<ConsumableModel>,
    #[serde(default)]
    pub tools: Vec<ToolModel>,
}

/// In-memory backend over a snapshot. Records are validated once on load.
pub struct SnapshotStore {
    transactions: Vec<TransactionRecord>,
    consumables: Vec<ConsumableModel>,
    tools: Vec<ToolModel>,
}

impl SnapshotStore {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        let rows = snapshot.transactions.into_iter().enumerate().filter_map(|(i, value)| {
            match serde_json::from_value::<TransactionDocument>(value) {
                Ok(doc) => Some(TransactionRow::from(doc)),
                Err(e) => {
                    tracing::warn!("Skipping snapshot transaction #{}: {}", i, e);
                    None
                }
            }
        });
        let transactions = records_from_rows(rows);
        Self {
            transactions,
            consumables: snapshot.consumables,
            tools: snapshot.tools,
        }
    }

    pub fn from_records(
        transactions: Vec<TransactionRecord>,
        consumables: Vec<ConsumableModel>,
        tools: Vec<ToolModel>,
    ) -> Self {
        Self {
            transactions,
            consumables,
            tools,
        }
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        let snapshot: InventorySnapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let store = Self::from_json(&json)?;
        tracing::info!(
            "Loaded snapshot {}: transactions={}, consumables={}, tools={}",
            path.display(),
            store.transactions.len(),
            store.consumables.len(),
            store.tools.len()
        );
        Ok(store)
    }
}

impl InventoryStore for SnapshotStore {
    async fn fetch_transactions(
        &self,
        query: &TransactionQuery,
    ) -> AppResult<Vec<TransactionRecord>> {
        Ok(self
            .transactions
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }

    async fn fetch_consumables(&self) -> AppResult<Vec<ConsumableModel>> {
        Ok(self.consumables.clone())
    }

    async fn fetch_tools(&self) -> AppResult<Vec<ToolModel>> {
        Ok(self.tools.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::TransactionAction;

    const SNAPSHOT: &str = r#"{
        "transactions": [
            {"id": "t1", "action": "checkout", "timestamp": "2024-04-02T09:00:00Z",
             "notes": "Batch operation: BATCH_1712048400000", "type": "tool",
             "metadata": {"toolName": "Drill", "staffName": "Aiko"}},
            {"id": "t2", "action": "checkin", "timestamp": "2024-04-03T09:00:00Z"},
            {"id": "t3", "action": "borrowed"}
        ],
        "consumables": [
            {"id": "c1", "name": "Gloves", "currentQuantity": 0,
             "minQuantity": 5, "maxQuantity": 50, "unit": "pairs"}
        ],
        "tools": [
            {"id": "d1", "name": "Drill", "status": "checked_out", "currentHolder": "Aiko"}
        ]
    }"#;

    #[tokio::test]
    async fn test_snapshot_skips_invalid_transactions() {
        let store = SnapshotStore::from_json(SNAPSHOT).unwrap();
        let all = store.fetch_transactions(&TransactionQuery::default()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(store.fetch_consumables().await.unwrap().len(), 1);
        let tools = store.fetch_tools().await.unwrap();
        assert_eq!(tools[0].current_holder.as_deref(), Some("Aiko"));
    }

    #[tokio::test]
    async fn test_snapshot_applies_query() {
        let store = SnapshotStore::from_json(SNAPSHOT).unwrap();
        let query = TransactionQuery {
            action: Some(TransactionAction::Checkin),
            ..Default::default()
        };
        let checkins = store.fetch_transactions(&query).await.unwrap();
        assert_eq!(checkins.len(), 1);
        assert_eq!(checkins[0].id, "t2");
    }

    #[tokio::test]
    async fn test_demo_snapshot() {
        use crate::audit::{compute_stats, group_transactions};

        let store = SnapshotStore::from_json(include_str!("../../demos/snapshot.json")).unwrap();
        let records = store.fetch_transactions(&TransactionQuery::default()).await.unwrap();
        assert_eq!(records.len(), 5);

        // 一括操作(2件) + "Batch ID:" 形式 1件 + 個別 2件
        assert_eq!(group_transactions(&records).len(), 4);
        assert_eq!(compute_stats(&records).unique_batch_count, 1);
    }

    #[tokio::test]
    async fn test_malformed_entry_does_not_fail_load() {
        let json = r#"{
            "transactions": [
                {"id": "ok", "action": "checkout", "timestamp": "2024-07-01T09:00:00Z"},
                {"id": "bad-ts", "action": "checkin", "timestamp": "2024-07-01 09:00"},
                {"id": 7, "action": "usage"},
                {"action": "restock"}
            ]
        }"#;
        let store = SnapshotStore::from_json(json).unwrap();
        let all = store.fetch_transactions(&TransactionQuery::default()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["ok", "bad-ts"]);
        assert!(all[0].timestamp.is_some());
        assert_eq!(all[1].timestamp, None);
    }

    #[test]
    fn test_malformed_snapshot() {
        assert!(matches!(SnapshotStore::from_json("[1, 2"), Err(AppError::Snapshot(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = SnapshotStore::load("/nonexistent/toolcrib-snapshot.json").await;
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
