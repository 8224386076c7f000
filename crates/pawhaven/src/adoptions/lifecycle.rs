//! Transition table for adoption applications.
//!
//! ```text
//! pending ──approve──▶ approved ──complete──▶ completed
//!    │                    │
//!    ├──reject──▶ rejected│
//!    └──cancel──▶ cancelled ◀──cancel──┘
//! ```
//!
//! The table is pure: it says which status an action leads to and which [`PetEffect`] the write
//! carries with it. Authorization lives in the service; the store resolves the pet effect.

use serde::Serialize;

use super::domain::ApplicationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Approve,
    Reject,
    Complete,
    Cancel,
}

impl LifecycleAction {
    pub const fn label(self) -> &'static str {
        match self {
            LifecycleAction::Approve => "approve",
            LifecycleAction::Reject => "reject",
            LifecycleAction::Complete => "complete",
            LifecycleAction::Cancel => "cancel",
        }
    }

    /// Maps the generic status endpoint's target status onto an action.
    pub fn from_target_status(status: &str) -> Option<Self> {
        match status.trim() {
            "approved" => Some(LifecycleAction::Approve),
            "rejected" => Some(LifecycleAction::Reject),
            "completed" => Some(LifecycleAction::Complete),
            _ => None,
        }
    }
}

/// Rule violation: `action` is not defined from `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {} an application that is {from}", .action.label())]
pub struct InvalidTransition {
    pub from: ApplicationStatus,
    pub action: LifecycleAction,
}

/// What a transition does to the pet it concerns.
///
/// The store applies the effect while it holds the write lock, so the checks it implies see the
/// pet and its other applications as they are at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetEffect {
    Unchanged,
    /// Pet becomes `pending`; refused once it is adopted.
    Hold,
    /// Pet becomes `adopted`; refused once it is adopted or another adoption completed.
    Adopt,
    /// Pet returns to `available` unless another approved application still holds it.
    ReleaseIfUnheld,
}

/// A validated step through the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub action: LifecycleAction,
}

impl Transition {
    pub fn plan(
        from: ApplicationStatus,
        action: LifecycleAction,
    ) -> Result<Transition, InvalidTransition> {
        use ApplicationStatus::*;

        let to = match (from, action) {
            (Pending, LifecycleAction::Approve) => Approved,
            (Pending, LifecycleAction::Reject) => Rejected,
            (Approved, LifecycleAction::Complete) => Completed,
            (Pending | Approved, LifecycleAction::Cancel) => Cancelled,
            _ => return Err(InvalidTransition { from, action }),
        };

        Ok(Transition { from, to, action })
    }

    /// Effect on the pet, resolved by the store inside the same write.
    pub fn pet_effect(&self) -> PetEffect {
        match (self.action, self.from) {
            (LifecycleAction::Approve, _) => PetEffect::Hold,
            (LifecycleAction::Complete, _) => PetEffect::Adopt,
            (LifecycleAction::Cancel, ApplicationStatus::Approved) => PetEffect::ReleaseIfUnheld,
            _ => PetEffect::Unchanged,
        }
    }

    pub fn sets_reviewed_at(&self) -> bool {
        matches!(self.action, LifecycleAction::Approve | LifecycleAction::Reject)
    }

    pub fn sets_completed_at(&self) -> bool {
        self.action == LifecycleAction::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::*;

    const ALL: [ApplicationStatus; 5] = [Pending, Approved, Rejected, Completed, Cancelled];

    #[test]
    fn approve_and_reject_only_leave_pending() {
        for status in ALL {
            let approve = Transition::plan(status, LifecycleAction::Approve);
            let reject = Transition::plan(status, LifecycleAction::Reject);
            if status == Pending {
                assert_eq!(approve.expect("pending approves").to, Approved);
                assert_eq!(reject.expect("pending rejects").to, Rejected);
            } else {
                assert_eq!(
                    approve,
                    Err(InvalidTransition {
                        from: status,
                        action: LifecycleAction::Approve
                    })
                );
                assert!(reject.is_err());
            }
        }
    }

    #[test]
    fn complete_requires_approval() {
        for status in ALL {
            let result = Transition::plan(status, LifecycleAction::Complete);
            assert_eq!(result.is_ok(), status == Approved, "from {status}");
        }
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for status in ALL.into_iter().filter(|status| status.is_terminal()) {
            for action in [
                LifecycleAction::Approve,
                LifecycleAction::Reject,
                LifecycleAction::Complete,
                LifecycleAction::Cancel,
            ] {
                assert!(Transition::plan(status, action).is_err());
            }
        }
    }

    #[test]
    fn pet_effect_follows_the_action() {
        let plan = |from, action| Transition::plan(from, action).expect("valid");

        assert_eq!(plan(Pending, LifecycleAction::Approve).pet_effect(), PetEffect::Hold);
        assert_eq!(plan(Approved, LifecycleAction::Complete).pet_effect(), PetEffect::Adopt);
        assert_eq!(plan(Pending, LifecycleAction::Reject).pet_effect(), PetEffect::Unchanged);
        assert_eq!(plan(Pending, LifecycleAction::Cancel).pet_effect(), PetEffect::Unchanged);
        assert_eq!(
            plan(Approved, LifecycleAction::Cancel).pet_effect(),
            PetEffect::ReleaseIfUnheld
        );
    }

    #[test]
    fn generic_status_endpoint_accepts_review_targets_only() {
        assert_eq!(
            LifecycleAction::from_target_status("approved"),
            Some(LifecycleAction::Approve)
        );
        assert_eq!(
            LifecycleAction::from_target_status("completed"),
            Some(LifecycleAction::Complete)
        );
        assert_eq!(LifecycleAction::from_target_status("cancelled"), None);
        assert_eq!(LifecycleAction::from_target_status("pending"), None);
    }

    #[test]
    fn invalid_transition_message_names_both_sides() {
        let err = Transition::plan(Completed, LifecycleAction::Approve).expect_err("terminal");
        assert_eq!(err.to_string(), "cannot approve an application that is completed");
    }
}
