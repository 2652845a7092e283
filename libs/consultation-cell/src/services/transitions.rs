// libs/consultation-cell/src/services/transitions.rs
use shared_models::auth::{Actor, Role};

use crate::error::ConsultationError;
use crate::models::{ConsultationRecord, ConsultationStatus};

/// Side effect the engine applies when an edge is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    None,
    /// Pre-assign the best nurse if one is free, otherwise queue unassigned.
    QueueForNurse,
    ClaimForNurse,
    /// Validate triage and route to a doctor, honouring an optional specialty.
    HandOffToDoctor,
    ClaimForDoctor,
    Finalize,
    Cancel,
}

#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
    pub from: ConsultationStatus,
    pub to: ConsultationStatus,
    pub allowed: &'static [Role],
    pub effect: TransitionEffect,
}

impl TransitionRule {
    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

const FORWARD_EDGES: [TransitionRule; 6] = [
    TransitionRule {
        from: ConsultationStatus::Requested,
        to: ConsultationStatus::Triage,
        allowed: &[Role::Attendant, Role::System],
        effect: TransitionEffect::None,
    },
    TransitionRule {
        from: ConsultationStatus::Triage,
        to: ConsultationStatus::AwaitingNurse,
        allowed: &[Role::Attendant, Role::System],
        effect: TransitionEffect::QueueForNurse,
    },
    TransitionRule {
        from: ConsultationStatus::AwaitingNurse,
        to: ConsultationStatus::InNursingAttendance,
        allowed: &[Role::Nurse],
        effect: TransitionEffect::ClaimForNurse,
    },
    TransitionRule {
        from: ConsultationStatus::InNursingAttendance,
        to: ConsultationStatus::AwaitingDoctor,
        allowed: &[Role::Nurse],
        effect: TransitionEffect::HandOffToDoctor,
    },
    TransitionRule {
        from: ConsultationStatus::AwaitingDoctor,
        to: ConsultationStatus::InMedicalAttendance,
        allowed: &[Role::Doctor],
        effect: TransitionEffect::ClaimForDoctor,
    },
    TransitionRule {
        from: ConsultationStatus::InMedicalAttendance,
        to: ConsultationStatus::Finalized,
        allowed: &[Role::Doctor],
        effect: TransitionEffect::Finalize,
    },
];

const CANCEL_ROLES: &[Role] = &[Role::Patient, Role::Attendant, Role::Admin];

/// Look up the edge `from -> to`. Cancellation is reachable from every
/// non-terminal state.
pub fn rule_for(from: ConsultationStatus, to: ConsultationStatus) -> Option<TransitionRule> {
    if to == ConsultationStatus::Cancelled && !from.is_terminal() {
        return Some(TransitionRule {
            from,
            to,
            allowed: CANCEL_ROLES,
            effect: TransitionEffect::Cancel,
        });
    }

    FORWARD_EDGES
        .iter()
        .find(|rule| rule.from == from && rule.to == to)
        .copied()
}

pub fn valid_targets(from: ConsultationStatus) -> Vec<ConsultationStatus> {
    ConsultationStatus::ALL
        .into_iter()
        .filter(|to| rule_for(from, *to).is_some())
        .collect()
}

/// The single authorization check for transitions.
pub fn authorize(
    rule: &TransitionRule,
    actor: &Actor,
    record: &ConsultationRecord,
) -> Result<(), ConsultationError> {
    if !rule.permits(actor.role) {
        return Err(ConsultationError::Forbidden(format!(
            "Role {} cannot move a consultation from {} to {}",
            actor.role, rule.from, rule.to
        )));
    }

    if rule.effect == TransitionEffect::Cancel
        && actor.role == Role::Patient
        && record.patient_id != actor.id
    {
        return Err(ConsultationError::Forbidden(
            "Patients can only cancel their own consultations".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConsultationKind;
    use uuid::Uuid;

    #[test]
    fn forward_path_is_linear() {
        let path = [
            ConsultationStatus::Requested,
            ConsultationStatus::Triage,
            ConsultationStatus::AwaitingNurse,
            ConsultationStatus::InNursingAttendance,
            ConsultationStatus::AwaitingDoctor,
            ConsultationStatus::InMedicalAttendance,
            ConsultationStatus::Finalized,
        ];

        for pair in path.windows(2) {
            let targets = valid_targets(pair[0]);
            assert_eq!(targets, vec![pair[1], ConsultationStatus::Cancelled]);
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(valid_targets(ConsultationStatus::Finalized).is_empty());
        assert!(valid_targets(ConsultationStatus::Cancelled).is_empty());
    }

    #[test]
    fn no_skipping_ahead() {
        assert!(rule_for(ConsultationStatus::Requested, ConsultationStatus::AwaitingDoctor).is_none());
        assert!(rule_for(ConsultationStatus::AwaitingDoctor, ConsultationStatus::AwaitingNurse).is_none());
    }

    #[test]
    fn patient_cancels_only_own_record() {
        let owner = Uuid::new_v4();
        let record = ConsultationRecord::new(owner, ConsultationKind::Urgent);
        let rule = rule_for(record.status, ConsultationStatus::Cancelled).unwrap();

        assert!(authorize(&rule, &Actor::new(owner, Role::Patient), &record).is_ok());
        assert!(matches!(
            authorize(&rule, &Actor::new(Uuid::new_v4(), Role::Patient), &record),
            Err(ConsultationError::Forbidden(_))
        ));
        assert!(authorize(&rule, &Actor::new(Uuid::new_v4(), Role::Attendant), &record).is_ok());
        assert!(authorize(&rule, &Actor::new(Uuid::new_v4(), Role::Nurse), &record).is_err());
    }
}
