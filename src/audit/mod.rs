//! Audit log reconciliation: batch grouping, filtering and counts over
//! transactions that have already been fetched.

pub mod batch;
pub mod filter;
pub mod grouping;
pub mod stats;

pub use batch::{
    batch_operation_note, has_batch_marker, new_batch_id, BatchExtraction, BatchSource,
    BATCH_MARKER,
};
pub use filter::{end_of_day, filter_transactions, start_of_day, ActionFilter, AuditFilter};
pub use grouping::{group_transactions, BatchGroup, GroupedItem};
pub use stats::{compute_stats, AuditStats};
