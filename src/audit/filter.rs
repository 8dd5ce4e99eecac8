use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::batch::has_batch_marker;
use crate::error::AppError;
use crate::models::{TransactionAction, TransactionRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionFilter {
    #[default]
    All,
    /// Notes carry the batch marker.
    Batch,
    Action(TransactionAction),
}

impl ActionFilter {
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        match self {
            ActionFilter::All => true,
            ActionFilter::Batch => has_batch_marker(record),
            ActionFilter::Action(action) => record.action == *action,
        }
    }
}

impl FromStr for ActionFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(ActionFilter::All),
            "batch" => Ok(ActionFilter::Batch),
            other => other.parse().map(ActionFilter::Action),
        }
    }
}

/// Filter state of the audit view. Every criterion must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub action: ActionFilter,
    pub search: String,
}

impl AuditFilter {
    pub fn with_range(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Date-only bounds cover whole days: 00:00:00 through 23:59:59.
    pub fn with_dates(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.with_range(start.map(start_of_day), end.map(end_of_day))
    }

    pub fn with_action(mut self, action: ActionFilter) -> Self {
        self.action = action;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.matches_date_range(record)
            && self.action.matches(record)
            && self.matches_search(record)
    }

    /// Inclusive on both ends. A record without a timestamp fails any bound.
    pub fn matches_date_range(&self, record: &TransactionRecord) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(ts) = record.timestamp else {
            return false;
        };
        self.start.map_or(true, |start| ts >= start) && self.end.map_or(true, |end| ts <= end)
    }

    /// Case-insensitive substring over item name, staff name and notes.
    pub fn matches_search(&self, record: &TransactionRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            record.metadata.item_name.as_deref(),
            record.metadata.staff_name.as_deref(),
            record.notes.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
        .and_utc()
}

pub fn filter_transactions(
    records: &[TransactionRecord],
    filter: &AuditFilter,
) -> Vec<TransactionRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}
