use serde::Serialize;

use crate::audit::{
    compute_stats, filter_transactions, group_transactions, AuditFilter, AuditStats, GroupedItem,
};
use crate::error::AppResult;
use crate::inventory::{summarize_dashboard, DashboardSummary};
use crate::storage::{InventoryStore, TransactionQuery};

/// 監査ログ画面の表示データ
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub stats: AuditStats,
    pub items: Vec<GroupedItem>,
}

/// ダッシュボード画面の表示データ
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub summary: DashboardSummary,
    pub recent_activity: Vec<GroupedItem>,
}

pub struct AuditService<S> {
    store: S,
}

impl<S: InventoryStore> AuditService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch, filter, then group. Stats cover the filtered set.
    pub async fn audit_log(&self, filter: &AuditFilter) -> AppResult<AuditReport> {
        tracing::info!(
            "AuditLog called: start={:?}, end={:?}, action={:?}, search={:?}",
            filter.start,
            filter.end,
            filter.action,
            filter.search
        );

        let records = self
            .store
            .fetch_transactions(&TransactionQuery::from(filter))
            .await?;
        let filtered = filter_transactions(&records, filter);
        let stats = compute_stats(&filtered);
        let items = group_transactions(&filtered);

        tracing::info!(
            "AuditLog result: fetched={}, matched={}, rows={}, batches={}",
            records.len(),
            stats.total,
            items.len(),
            stats.unique_batch_count
        );

        Ok(AuditReport { stats, items })
    }

    /// Inventory summary plus the newest `recent_limit` audit rows.
    pub async fn dashboard(&self, recent_limit: usize) -> AppResult<DashboardReport> {
        let tools = self.store.fetch_tools().await?;
        let consumables = self.store.fetch_consumables().await?;
        let transactions = self
            .store
            .fetch_transactions(&TransactionQuery::default())
            .await?;

        let summary = summarize_dashboard(&tools, &consumables);
        let mut recent_activity = group_transactions(&transactions);
        recent_activity.truncate(recent_limit);

        tracing::info!(
            "Dashboard: tools={}, checked_out={}, restock={}",
            summary.tools.total,
            summary.tools.checked_out,
            summary.stock.needs_attention()
        );

        Ok(DashboardReport {
            summary,
            recent_activity,
        })
    }
}
