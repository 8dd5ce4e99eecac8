use sqlx::PgPool;

use super::{records_from_rows, InventoryStore, TransactionQuery};
use crate::error::AppResult;
use crate::models::{ConsumableModel, ToolModel, TransactionRecord, TransactionRow};

/// Postgresバックエンド
#[derive(Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Placeholders are numbered in bind order: start, end, action.
fn where_clause(query: &TransactionQuery) -> String {
    let mut conditions = Vec::new();
    let mut param_idx = 1u32;

    if query.start.is_some() {
        conditions.push(format!("occurred_at >= ${}", param_idx));
        param_idx += 1;
    }
    if query.end.is_some() {
        conditions.push(format!("occurred_at <= ${}", param_idx));
        param_idx += 1;
    }
    if query.action.is_some() {
        // 境界でのパースと同じく大文字小文字・前後空白を無視
        conditions.push(format!("lower(trim(action)) = ${}", param_idx));
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

impl InventoryStore for PgInventoryStore {
    async fn fetch_transactions(
        &self,
        query: &TransactionQuery,
    ) -> AppResult<Vec<TransactionRecord>> {
        let sql = format!(
            "SELECT id::text, action, occurred_at, notes, batch_id, \
             metadata::text AS metadata, type \
             FROM transactions {} ORDER BY occurred_at DESC NULLS LAST",
            where_clause(query)
        );

        let mut q = sqlx::query_as::<_, TransactionRow>(&sql);
        if let Some(start) = query.start {
            q = q.bind(start);
        }
        if let Some(end) = query.end {
            q = q.bind(end);
        }
        if let Some(action) = query.action {
            q = q.bind(action.as_str());
        }

        let rows = q.fetch_all(&self.pool).await?;
        let fetched = rows.len();
        let records = records_from_rows(rows);

        tracing::debug!(
            "Fetched transactions: rows={}, valid={}, query={:?}",
            fetched,
            records.len(),
            query
        );
        Ok(records)
    }

    async fn fetch_consumables(&self) -> AppResult<Vec<ConsumableModel>> {
        let consumables = sqlx::query_as::<_, ConsumableModel>(
            "SELECT id::text, name, current_quantity::float8, min_quantity::float8, \
             max_quantity::float8, unit \
             FROM consumables ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!("Fetched consumables: {}", consumables.len());
        Ok(consumables)
    }

    async fn fetch_tools(&self) -> AppResult<Vec<ToolModel>> {
        let tools = sqlx::query_as::<_, ToolModel>(
            "SELECT id::text, name, brand, model, status, current_holder \
             FROM tools ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!("Fetched tools: {}", tools.len());
        Ok(tools)
    }
}
