//! Adoption applications and quick requests, their review lifecycle, interviews and documents.

pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AdoptionApplication, AdoptionDocument, AdoptionInterview, ApplicationDetailView,
    ApplicationDetails, ApplicationForm, ApplicationId, ApplicationKind, ApplicationStatus,
    ApplicationSubmission, ApplicationView, DocumentId, DocumentType, DocumentUpload, InterviewId,
    InterviewRequest, InterviewStatus, InterviewType, QuickRequestForm, ReviewNotes, StatusUpdate,
};
pub use lifecycle::{InvalidTransition, LifecycleAction, PetEffect, Transition};
pub use repository::{ApplicationRepository, ApplicationScope, TransitionReceipt, TransitionWrite};
pub use router::adoption_router;
pub use service::{AdoptionError, AdoptionService};
