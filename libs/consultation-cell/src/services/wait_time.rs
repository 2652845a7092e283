// libs/consultation-cell/src/services/wait_time.rs
//! Read-only wait-time queries. Nothing here mutates a record.
use chrono::{DateTime, Utc};

use crate::models::{ConsultationRecord, StatusHistoryEntry};
use crate::services::ledger;

pub fn current_wait_minutes(record: &ConsultationRecord, now: DateTime<Utc>) -> i64 {
    (now - record.updated_at).num_minutes().max(0)
}

/// Wait measured from the ledger entry into the current state, falling back to
/// creation time for records that never left `requested`.
pub fn current_wait_minutes_from_history(
    record: &ConsultationRecord,
    history: &[StatusHistoryEntry],
    now: DateTime<Utc>,
) -> i64 {
    let since = ledger::entered_at(history, record.status).unwrap_or(record.created_at);
    (now - since).num_minutes().max(0)
}

pub fn max_wait_minutes(record: &ConsultationRecord) -> i64 {
    record.classification().max_wait_minutes()
}

pub fn is_overdue(record: &ConsultationRecord, now: DateTime<Utc>) -> bool {
    !record.status.is_terminal() && current_wait_minutes(record, now) >= max_wait_minutes(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsultationKind, ConsultationStatus, TriageData, UrgencyClassification};
    use chrono::Duration;
    use uuid::Uuid;

    fn waiting_since(kind: ConsultationKind, minutes: i64) -> (ConsultationRecord, DateTime<Utc>) {
        let now = Utc::now();
        let mut record = ConsultationRecord::new(Uuid::new_v4(), kind);
        record.created_at = now - Duration::minutes(minutes);
        record.updated_at = record.created_at;
        (record, now)
    }

    #[test]
    fn unclassified_urgent_is_overdue_after_two_hours() {
        let (record, now) = waiting_since(ConsultationKind::Urgent, 119);
        assert_eq!(current_wait_minutes(&record, now), 119);
        assert!(!is_overdue(&record, now));

        let (record, now) = waiting_since(ConsultationKind::Urgent, 120);
        assert!(is_overdue(&record, now));
    }

    #[test]
    fn red_is_overdue_immediately() {
        let (mut record, now) = waiting_since(ConsultationKind::Scheduled, 0);
        record.triage_data = Some(TriageData {
            classification: Some(UrgencyClassification::Red),
            ..TriageData::default()
        });
        assert!(is_overdue(&record, now));
    }

    #[test]
    fn terminal_records_never_overdue() {
        let (mut record, now) = waiting_since(ConsultationKind::Urgent, 500);
        record.status = ConsultationStatus::Cancelled;
        assert!(!is_overdue(&record, now));
    }

    #[test]
    fn queries_are_repeatable() {
        let (record, now) = waiting_since(ConsultationKind::Scheduled, 30);
        let snapshot = record.clone();
        for _ in 0..3 {
            assert_eq!(current_wait_minutes(&record, now), 30);
            assert!(!is_overdue(&record, now));
        }
        assert_eq!(record, snapshot);
        assert_eq!(current_wait_minutes_from_history(&record, &[], now), current_wait_minutes(&record, now));
    }
}
