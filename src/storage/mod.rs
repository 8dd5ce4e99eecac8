// Inventory data sources: Postgres and JSON snapshot backends

pub mod postgres;
pub mod snapshot;

pub use postgres::PgInventoryStore;
pub use snapshot::{InventorySnapshot, SnapshotStore};

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::audit::{ActionFilter, AuditFilter};
use crate::error::AppResult;
use crate::models::{
    ConsumableModel, ToolModel, TransactionAction, TransactionRecord, TransactionRow,
};

/// Constraints a backend may apply while fetching transactions.
/// Callers still run the full [`AuditFilter`] afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub action: Option<TransactionAction>,
}

impl TransactionQuery {
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        if let Some(action) = self.action {
            if record.action != action {
                return false;
            }
        }
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        match record.timestamp {
            Some(ts) => {
                self.start.map_or(true, |start| ts >= start)
                    && self.end.map_or(true, |end| ts <= end)
            }
            None => false,
        }
    }
}

impl From<&AuditFilter> for TransactionQuery {
    fn from(filter: &AuditFilter) -> Self {
        let action = match filter.action {
            ActionFilter::Action(action) => Some(action),
            ActionFilter::All | ActionFilter::Batch => None,
        };
        Self {
            start: filter.start,
            end: filter.end,
            action,
        }
    }
}

/// 在庫データの取得元（Postgres / スナップショット共通インタフェース）
pub trait InventoryStore: Send + Sync {
    /// トランザクションを取得
    fn fetch_transactions(
        &self,
        query: &TransactionQuery,
    ) -> impl Future<Output = AppResult<Vec<TransactionRecord>>> + Send;

    /// 消耗品一覧を取得
    fn fetch_consumables(&self) -> impl Future<Output = AppResult<Vec<ConsumableModel>>> + Send;

    /// 工具一覧を取得
    fn fetch_tools(&self) -> impl Future<Output = AppResult<Vec<ToolModel>>> + Send;
}

/// Validates raw rows. Invalid rows are logged and skipped.
pub fn records_from_rows(rows: impl IntoIterator<Item = TransactionRow>) -> Vec<TransactionRecord> {
    rows.into_iter()
        .filter_map(|row| match TransactionRecord::try_from(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping transaction: {}", e);
                None
            }
        })
        .collect()
}
