//! Capability checks gating who may read or mutate which record.
//!
//! Services describe the action they are about to perform as a [`Capability`] and ask it for a
//! [`PermissionDecision`] against the calling [`Actor`]. Keeping every rule in one `match` means
//! endpoints never branch on roles themselves.

use serde::Serialize;

use crate::accounts::{Role, User, UserId};

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
    pub is_staff: bool,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            is_staff: false,
        }
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Admin role or the staff flag.
    pub fn is_administrator(&self) -> bool {
        self.role == Role::Admin || self.is_staff
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            is_staff: user.is_staff,
        }
    }
}

/// Actions that need an explicit permission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CreatePet,
    MutatePet { owner: UserId },
    SubmitApplication,
    ViewApplication { applicant: UserId, shelter: UserId },
    ReviewApplication { shelter: UserId },
    CancelApplication { applicant: UserId },
    AttachToApplication { applicant: UserId, shelter: UserId },
    ToggleFavorite,
    ListOwnPets,
    SetupProfile { required: Role },
    ViewPlatformTotals,
}

/// Why a capability was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum DenialReason {
    RoleRequired { required: Role, actual: Role },
    NotOwner,
    NotParticipant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Allow,
    Deny(DenialReason),
}

impl PermissionDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, PermissionDecision::Allow)
    }

    pub fn into_result(self) -> Result<(), PermissionError> {
        match self {
            PermissionDecision::Allow => Ok(()),
            PermissionDecision::Deny(DenialReason::RoleRequired { required, actual }) => {
                Err(PermissionError::Role { required, actual })
            }
            PermissionDecision::Deny(reason) => Err(PermissionError::Denied(reason)),
        }
    }

    fn require(condition: bool, reason: DenialReason) -> Self {
        if condition {
            PermissionDecision::Allow
        } else {
            PermissionDecision::Deny(reason)
        }
    }

    fn require_role(actor: &Actor, required: Role) -> Self {
        Self::require(
            actor.role == required,
            DenialReason::RoleRequired {
                required,
                actual: actor.role,
            },
        )
    }
}

/// Refusal surfaced as a 403-equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    #[error("only {} accounts may perform this action (caller is {})", .required.label(), .actual.label())]
    Role { required: Role, actual: Role },
    #[error("permission denied: {0:?}")]
    Denied(DenialReason),
}

impl Capability {
    pub fn decide(self, actor: &Actor) -> PermissionDecision {
        match self {
            Capability::CreatePet | Capability::ListOwnPets => {
                PermissionDecision::require_role(actor, Role::Shelter)
            }
            Capability::MutatePet { owner } => {
                PermissionDecision::require(actor.id == owner, DenialReason::NotOwner)
            }
            Capability::SubmitApplication | Capability::ToggleFavorite => {
                PermissionDecision::require_role(actor, Role::Adopter)
            }
            Capability::ViewApplication { applicant, shelter } => PermissionDecision::require(
                actor.id == applicant || actor.id == shelter || actor.is_administrator(),
                DenialReason::NotParticipant,
            ),
            Capability::ReviewApplication { shelter } => {
                PermissionDecision::require(actor.id == shelter, DenialReason::NotOwner)
            }
            Capability::CancelApplication { applicant } => PermissionDecision::require(
                actor.id == applicant || actor.is_administrator(),
                DenialReason::NotParticipant,
            ),
            Capability::AttachToApplication { applicant, shelter } => PermissionDecision::require(
                actor.id == applicant || actor.id == shelter,
                DenialReason::NotParticipant,
            ),
            Capability::SetupProfile { required } => {
                PermissionDecision::require_role(actor, required)
            }
            Capability::ViewPlatformTotals => PermissionDecision::require(
                actor.is_administrator(),
                DenialReason::RoleRequired {
                    required: Role::Admin,
                    actual: actor.role,
                },
            ),
        }
    }

    /// Shorthand for `decide(actor).into_result()`.
    pub fn check(self, actor: &Actor) -> Result<(), PermissionError> {
        self.decide(actor).into_result()
    }
}
