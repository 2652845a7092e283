use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use consultation_cell::{current_wait_minutes, is_overdue, max_wait_minutes, ConsultationRecord};

use crate::models::{EscalationBoard, EscalationEntry};

/// Rank open consultations: overdue first, then most severe, then longest wait.
pub fn build_board(records: &[ConsultationRecord], now: DateTime<Utc>) -> EscalationBoard {
    let mut entries: Vec<EscalationEntry> = records
        .iter()
        .filter(|record| !record.status.is_terminal())
        .map(|record| EscalationEntry {
            consultation_id: record.id,
            patient_id: record.patient_id,
            kind: record.kind,
            status: record.status,
            classification: record.classification(),
            wait_minutes: current_wait_minutes(record, now),
            max_wait_minutes: max_wait_minutes(record),
            overdue: is_overdue(record, now),
            assigned_nurse_id: record.assigned_nurse_id,
            assigned_doctor_id: record.assigned_doctor_id,
        })
        .collect();

    entries.sort_by_key(|e| (Reverse(e.overdue), Reverse(e.classification), Reverse(e.wait_minutes)));

    EscalationBoard {
        generated_at: now,
        total: entries.len(),
        overdue: entries.iter().filter(|e| e.overdue).count(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use consultation_cell::{ConsultationKind, ConsultationStatus, TriageData, UrgencyClassification};
    use uuid::Uuid;

    fn waiting(kind: ConsultationKind, minutes: i64, now: DateTime<Utc>) -> ConsultationRecord {
        let mut record = ConsultationRecord::new(Uuid::new_v4(), kind);
        record.updated_at = now - Duration::minutes(minutes);
        record
    }

    #[test]
    fn orders_by_overdue_then_severity_then_wait() {
        let now = Utc::now();

        let overdue_scheduled = waiting(ConsultationKind::Scheduled, 300, now);
        let fresh_urgent = waiting(ConsultationKind::Urgent, 10, now);
        let older_urgent = waiting(ConsultationKind::Urgent, 40, now);
        let mut orange = waiting(ConsultationKind::Scheduled, 5, now);
        orange.triage_data = Some(TriageData {
            classification: Some(UrgencyClassification::Orange),
            ..TriageData::default()
        });
        let mut finished = waiting(ConsultationKind::Urgent, 999, now);
        finished.status = ConsultationStatus::Finalized;

        let board = build_board(
            &[fresh_urgent.clone(), finished, orange.clone(), older_urgent.clone(), overdue_scheduled.clone()],
            now,
        );

        let order: Vec<Uuid> = board.entries.iter().map(|e| e.consultation_id).collect();
        assert_eq!(order, vec![overdue_scheduled.id, orange.id, older_urgent.id, fresh_urgent.id]);
        assert_eq!(board.total, 4);
        assert_eq!(board.overdue, 1);
        assert_eq!(board.entries[2].max_wait_minutes, 120);
    }
}
