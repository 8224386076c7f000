//! Record store shared by every domain module.
//!
//! Each domain owns a repository trait (`UserRepository`, `PetRepository`,
//! `ApplicationRepository`, `NotificationRepository`); [`RecordStore`] implements all of them
//! over one set of in-memory tables so foreign keys, uniqueness and cascades are checked in a
//! single critical section.

mod memory;

pub use memory::RecordStore;

use crate::accounts::UserRepository;
use crate::adoptions::{ApplicationRepository, ApplicationStatus};
use crate::notifications::NotificationRepository;
use crate::pets::{PetRepository, PetStatus};

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists ({constraint})")]
    Conflict { constraint: &'static str },
    #[error("record not found")]
    NotFound,
    #[error("referenced {entity} does not exist")]
    MissingReference { entity: &'static str },
    #[error("status changed concurrently (expected {expected}, found {actual})")]
    StatusMismatch {
        expected: ApplicationStatus,
        actual: ApplicationStatus,
    },
    #[error("pet is no longer available (currently {})", .status.label())]
    PetUnavailable { status: PetStatus },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Every repository the platform services need, implemented by one backing store.
pub trait PlatformStore:
    UserRepository + PetRepository + ApplicationRepository + NotificationRepository
{
}

impl<T> PlatformStore for T where
    T: UserRepository + PetRepository + ApplicationRepository + NotificationRepository
{
}
