use chrono::{DateTime, Utc};

use super::domain::{
    AdoptionApplication, AdoptionDocument, AdoptionInterview, ApplicationId, ApplicationKind,
    ApplicationStatus,
};
use super::lifecycle::PetEffect;
use crate::accounts::UserId;
use crate::pets::{Pet, PetId};
use crate::store::RepositoryError;

/// Which applications a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationScope {
    Applicant(UserId),
    /// Applications for pets owned by this shelter.
    Shelter(UserId),
    All,
}

/// A lifecycle write: applied only when the stored status still equals `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionWrite {
    pub application_id: ApplicationId,
    pub expected: ApplicationStatus,
    pub next: ApplicationStatus,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reviewer_notes: Option<String>,
    pub pet_effect: PetEffect,
}

/// Records as they stand after a transition write.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionReceipt {
    pub application: AdoptionApplication,
    pub pet: Pet,
}

/// Storage abstraction for applications and their interviews and documents.
pub trait ApplicationRepository: Send + Sync {
    /// Fails with `Conflict` when (applicant, pet, kind) already exists.
    fn insert_application(
        &self,
        application: AdoptionApplication,
    ) -> Result<AdoptionApplication, RepositoryError>;
    fn application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError>;
    fn find_application(
        &self,
        applicant_id: UserId,
        pet_id: PetId,
        kind: ApplicationKind,
    ) -> Result<Option<AdoptionApplication>, RepositoryError>;
    /// Newest submission first.
    fn applications(
        &self,
        scope: ApplicationScope,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError>;
    fn applications_for_pet(
        &self,
        pet_id: PetId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError>;

    /// Compare-and-swap of the application status plus the pet effect, as one write.
    /// Fails with `StatusMismatch` when the stored status is no longer `write.expected`, and with
    /// `PetUnavailable` when the effect would hold or adopt a pet that is already adopted.
    fn apply_transition(&self, write: TransitionWrite)
        -> Result<TransitionReceipt, RepositoryError>;

    fn insert_interview(
        &self,
        interview: AdoptionInterview,
    ) -> Result<AdoptionInterview, RepositoryError>;
    fn interviews(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<AdoptionInterview>, RepositoryError>;
    fn insert_document(
        &self,
        document: AdoptionDocument,
    ) -> Result<AdoptionDocument, RepositoryError>;
    fn documents(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<AdoptionDocument>, RepositoryError>;
}
