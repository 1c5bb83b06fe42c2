use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of an OD request. `pending` is the only non-terminal state
/// besides `forwarded_to_hod`; the tutor-side approve/reject outcomes do
/// NOT continue to the HOD stage.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OdStatus {
    Pending,
    ApprovedByTutor,
    RejectedByTutor,
    ForwardedToHod,
    ApprovedByHod,
    RejectedByHod,
}

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OdAction {
    Approve,
    Reject,
    Forward,
}

impl OdStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OdStatus::Pending | OdStatus::ForwardedToHod)
    }
}

/// The transition table. Identity checks (email match for faculty,
/// department match for the HOD) happen in the engine; this answers only
/// whether the (state, role, action) triple is defined at all.
pub fn next_status(current: OdStatus, role: Role, action: OdAction) -> Option<OdStatus> {
    match (current, role, action) {
        (OdStatus::Pending, Role::Faculty, OdAction::Approve) => Some(OdStatus::ApprovedByTutor),
        (OdStatus::Pending, Role::Faculty, OdAction::Reject) => Some(OdStatus::RejectedByTutor),
        (OdStatus::Pending, Role::Faculty, OdAction::Forward) => Some(OdStatus::ForwardedToHod),
        (OdStatus::ForwardedToHod, Role::Hod, OdAction::Approve) => Some(OdStatus::ApprovedByHod),
        (OdStatus::ForwardedToHod, Role::Hod, OdAction::Reject) => Some(OdStatus::RejectedByHod),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [OdStatus; 6] = [
        OdStatus::Pending,
        OdStatus::ApprovedByTutor,
        OdStatus::RejectedByTutor,
        OdStatus::ForwardedToHod,
        OdStatus::ApprovedByHod,
        OdStatus::RejectedByHod,
    ];
    const ALL_ACTIONS: [OdAction; 3] = [OdAction::Approve, OdAction::Reject, OdAction::Forward];
    const ALL_ROLES: [Role; 3] = [Role::Student, Role::Faculty, Role::Hod];

    #[test]
    fn wire_form_is_snake_case() {
        assert_eq!(OdStatus::ApprovedByTutor.to_string(), "approved_by_tutor");
        assert_eq!(OdStatus::ForwardedToHod.to_string(), "forwarded_to_hod");
        assert_eq!(
            "rejected_by_hod".parse::<OdStatus>().unwrap(),
            OdStatus::RejectedByHod
        );
    }

    #[test]
    fn faculty_owns_the_pending_stage() {
        assert_eq!(
            next_status(OdStatus::Pending, Role::Faculty, OdAction::Approve),
            Some(OdStatus::ApprovedByTutor)
        );
        assert_eq!(
            next_status(OdStatus::Pending, Role::Faculty, OdAction::Reject),
            Some(OdStatus::RejectedByTutor)
        );
        assert_eq!(
            next_status(OdStatus::Pending, Role::Faculty, OdAction::Forward),
            Some(OdStatus::ForwardedToHod)
        );
    }

    #[test]
    fn hod_decides_forwarded_requests_only() {
        assert_eq!(
            next_status(OdStatus::ForwardedToHod, Role::Hod, OdAction::Approve),
            Some(OdStatus::ApprovedByHod)
        );
        assert_eq!(
            next_status(OdStatus::ForwardedToHod, Role::Hod, OdAction::Reject),
            Some(OdStatus::RejectedByHod)
        );
        // forward never cascades
        assert_eq!(
            next_status(OdStatus::ForwardedToHod, Role::Hod, OdAction::Forward),
            None
        );
    }

    #[test]
    fn students_never_transition() {
        for status in ALL_STATUSES {
            for action in ALL_ACTIONS {
                assert_eq!(next_status(status, Role::Student, action), None);
            }
        }
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for status in ALL_STATUSES.into_iter().filter(|s| s.is_terminal()) {
            for role in ALL_ROLES {
                for action in ALL_ACTIONS {
                    assert_eq!(next_status(status, role, action), None);
                }
            }
        }
    }

    #[test]
    fn tutor_outcomes_are_dead_ends() {
        // approved/rejected by tutor deliberately do not feed the HOD stage
        assert!(OdStatus::ApprovedByTutor.is_terminal());
        assert!(OdStatus::RejectedByTutor.is_terminal());
        assert_eq!(
            next_status(OdStatus::ApprovedByTutor, Role::Hod, OdAction::Approve),
            None
        );
    }

    #[test]
    fn hod_cannot_touch_pending() {
        for action in ALL_ACTIONS {
            assert_eq!(next_status(OdStatus::Pending, Role::Hod, action), None);
        }
    }
}
