use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::{UserId, UserProfileView};
use crate::pets::{PetId, PetSummary};
use crate::validation::{is_blank, is_valid_phone_number, ValidationErrors};

/// Identifier wrapper for adoption applications and quick requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterviewId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

/// Lifecycle state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Completed | ApplicationStatus::Cancelled
        )
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Full applications and quick requests share one record; the kind is part of the uniqueness key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKind {
    Full,
    Quick,
}

impl ApplicationKind {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationKind::Full => "application",
            ApplicationKind::Quick => "request",
        }
    }
}

/// Questionnaire submitted with a full application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationForm {
    pub reason_for_adoption: String,
    pub experience_with_pets: String,
    pub living_situation: String,
    pub work_schedule: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub emergency_contact_relationship: String,
    #[serde(default)]
    pub veterinarian_name: String,
    #[serde(default)]
    pub veterinarian_phone: String,
    #[serde(default)]
    pub veterinarian_address: String,
    #[serde(default)]
    pub additional_notes: String,
}

impl ApplicationForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let required = [
            ("reason_for_adoption", &self.reason_for_adoption),
            ("experience_with_pets", &self.experience_with_pets),
            ("living_situation", &self.living_situation),
            ("work_schedule", &self.work_schedule),
            ("emergency_contact_name", &self.emergency_contact_name),
            ("emergency_contact_relationship", &self.emergency_contact_relationship),
        ];
        for (field, value) in required {
            errors.check(!is_blank(value), field, "this field is required");
        }
        errors.check(
            is_valid_phone_number(&self.emergency_contact_phone),
            "emergency_contact_phone",
            "enter a phone number like +999999999",
        );
        if !is_blank(&self.veterinarian_phone) {
            errors.check(
                is_valid_phone_number(&self.veterinarian_phone),
                "veterinarian_phone",
                "enter a phone number like +999999999",
            );
        }
        errors.into_result()
    }
}

/// Short form used by quick adoption requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickRequestForm {
    pub message: String,
    pub phone_number: String,
    #[serde(default)]
    pub preferred_contact_time: String,
}

impl QuickRequestForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(!is_blank(&self.message), "message", "this field is required");
        errors.check(
            is_valid_phone_number(&self.phone_number),
            "phone_number",
            "enter a phone number like +999999999",
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApplicationDetails {
    Full(ApplicationForm),
    Quick(QuickRequestForm),
}

impl ApplicationDetails {
    pub fn kind(&self) -> ApplicationKind {
        match self {
            ApplicationDetails::Full(_) => ApplicationKind::Full,
            ApplicationDetails::Quick(_) => ApplicationKind::Quick,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            ApplicationDetails::Full(form) => form.validate(),
            ApplicationDetails::Quick(form) => form.validate(),
        }
    }
}

/// Stored application or quick request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionApplication {
    pub id: ApplicationId,
    pub applicant_id: UserId,
    pub pet_id: PetId,
    pub status: ApplicationStatus,
    pub details: ApplicationDetails,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reviewer_notes: String,
}

impl AdoptionApplication {
    pub fn kind(&self) -> ApplicationKind {
        self.details.kind()
    }

    pub fn can_be_approved(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }

    pub fn can_be_rejected(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }

    pub fn can_be_completed(&self) -> bool {
        self.status == ApplicationStatus::Approved
    }
}

/// Submission payload accepted by the API for full applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub pet_id: PetId,
    #[serde(flatten)]
    pub form: ApplicationForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    Phone,
    Video,
    InPerson,
    HomeVisit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionInterview {
    pub id: InterviewId,
    pub application_id: ApplicationId,
    pub interview_type: InterviewType,
    pub scheduled_date: DateTime<Utc>,
    pub status: InterviewStatus,
    pub notes: String,
    pub interviewer_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewRequest {
    pub interview_type: InterviewType,
    pub scheduled_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Contract,
    MedicalRecords,
    VaccinationRecords,
    Identification,
    ProofOfResidence,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionDocument {
    pub id: DocumentId,
    pub application_id: ApplicationId,
    pub document_type: DocumentType,
    pub title: String,
    pub file: String,
    pub content_type: String,
    pub uploaded_by: UserId,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub document_type: DocumentType,
    pub title: String,
    pub file: String,
}

/// Shelter decision payload for the generic status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
    #[serde(default)]
    pub reviewer_notes: String,
}

/// Optional notes attached to an approve/reject/complete call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewNotes {
    pub reviewer_notes: Option<String>,
}

/// Application as returned to participants.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: AdoptionApplication,
    pub kind: ApplicationKind,
    pub pet: PetSummary,
    pub applicant: UserProfileView,
    pub can_be_approved: bool,
    pub can_be_rejected: bool,
    pub can_be_completed: bool,
}

/// Detail view including the children owned by the application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetailView {
    #[serde(flatten)]
    pub summary: ApplicationView,
    pub interviews: Vec<AdoptionInterview>,
    pub documents: Vec<AdoptionDocument>,
}
