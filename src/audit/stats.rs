use std::collections::HashSet;

use serde::Serialize;

use super::batch::{BatchExtraction, BatchSource};
use crate::models::{TransactionAction, TransactionRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditStats {
    pub total: usize,
    pub checkout_count: usize,
    pub checkin_count: usize,
    pub unique_batch_count: usize,
}

/// Counts for the audit header.
///
/// `unique_batch_count` only honors the "Batch operation: BATCH_<digits>" note
/// pattern. Explicit `batch_id` fields and "Batch ID:" notes are grouped by
/// [`super::group_transactions`] but never counted here.
pub fn compute_stats(records: &[TransactionRecord]) -> AuditStats {
    let mut batch_ids = HashSet::new();
    let mut stats = AuditStats {
        total: records.len(),
        ..Default::default()
    };

    for record in records {
        match record.action {
            TransactionAction::Checkout => stats.checkout_count += 1,
            TransactionAction::Checkin => stats.checkin_count += 1,
            _ => {}
        }

        if let Some(notes) = record.notes.as_deref() {
            if let BatchExtraction::Matched {
                source: BatchSource::Operation,
                batch_id,
            } = BatchExtraction::from_notes(notes)
            {
                batch_ids.insert(batch_id);
            }
        }
    }

    stats.unique_batch_count = batch_ids.len();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{batch_operation_note, filter_transactions, group_transactions};
    use crate::audit::{ActionFilter, AuditFilter, GroupedItem};

    #[test]
    fn test_counts() {
        let records = vec![
            TransactionRecord::new("1", TransactionAction::Checkout),
            TransactionRecord::new("2", TransactionAction::Checkout),
            TransactionRecord::new("3", TransactionAction::Checkin),
            TransactionRecord::new("4", TransactionAction::Usage),
            TransactionRecord::new("5", TransactionAction::Restock),
        ];
        assert_eq!(
            compute_stats(&records),
            AuditStats {
                total: 5,
                checkout_count: 2,
                checkin_count: 1,
                unique_batch_count: 0,
            }
        );
    }

    #[test]
    fn test_unique_batches_count_distinct_operation_ids() {
        let records = vec![
            TransactionRecord::new("1", TransactionAction::Checkout)
                .with_notes("Batch operation: BATCH_1"),
            TransactionRecord::new("2", TransactionAction::Checkout)
                .with_notes("Batch operation: BATCH_1"),
            TransactionRecord::new("3", TransactionAction::Checkin)
                .with_notes("Batch operation: BATCH_2"),
            TransactionRecord::new("4", TransactionAction::Checkin)
                .with_notes("Batch operation: BATCH_x"),
        ];
        assert_eq!(compute_stats(&records).unique_batch_count, 2);
    }

    #[test]
    fn test_id_pattern_is_excluded_from_unique_batches() {
        let records = vec![
            TransactionRecord::new("7", TransactionAction::Usage).with_notes("Batch ID: BATCH_007")
        ];

        assert_eq!(compute_stats(&records).unique_batch_count, 0);

        // グルーピングとbatchフィルタには含まれる
        let items = group_transactions(&records);
        assert!(matches!(&items[0], GroupedItem::Batch(g) if g.batch_id == "BATCH_007"));
        let batch_only = AuditFilter::default().with_action(ActionFilter::Batch);
        assert_eq!(filter_transactions(&records, &batch_only).len(), 1);
    }

    #[test]
    fn test_explicit_batch_id_is_excluded_from_unique_batches() {
        let records =
            vec![TransactionRecord::new("1", TransactionAction::Checkout).with_batch_id("BATCH_5")];
        assert_eq!(compute_stats(&records).unique_batch_count, 0);
    }

    #[test]
    fn test_scenario_written_by_batch_checkout() {
        let note = batch_operation_note("BATCH_100");
        let records = vec![
            TransactionRecord::new("A", TransactionAction::Checkout)
                .with_batch_id("BATCH_100")
                .with_notes(note.clone()),
            TransactionRecord::new("B", TransactionAction::Checkout)
                .with_batch_id("BATCH_100")
                .with_notes(note),
            TransactionRecord::new("C", TransactionAction::Checkin),
        ];

        assert_eq!(group_transactions(&records).len(), 2);

        let checkouts =
            AuditFilter::default().with_action(ActionFilter::Action(TransactionAction::Checkout));
        let ids: Vec<String> = filter_transactions(&records, &checkouts)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["A", "B"]);

        assert_eq!(compute_stats(&records).unique_batch_count, 1);
    }
}
