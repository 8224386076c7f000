use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    AdoptionApplication, AdoptionDocument, AdoptionInterview, ApplicationDetailView,
    ApplicationDetails, ApplicationId, ApplicationKind, ApplicationStatus, ApplicationSubmission,
    ApplicationView, DocumentId, DocumentUpload, InterviewId, InterviewRequest, InterviewStatus,
    QuickRequestForm, StatusUpdate,
};
use super::lifecycle::{InvalidTransition, LifecycleAction, Transition};
use super::repository::{ApplicationScope, TransitionReceipt, TransitionWrite};
use crate::access::{Actor, Capability, PermissionError};
use crate::accounts::{Role, User};
use crate::http::{Page, PageLimits, PageOutOfRange, PageRequest};
use crate::notifications::{
    EmailContext, EmailTemplate, Mailer, NewNotification, NotificationDispatcher,
    NotificationKind,
};
use crate::pets::service::pet_summary;
use crate::pets::{Pet, PetId, PetStatus};
use crate::store::{PlatformStore, RepositoryError};
use crate::validation::{is_blank, ValidationErrors};

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static INTERVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DOCUMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    ApplicationId(APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_interview_id() -> InterviewId {
    InterviewId(INTERVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_document_id() -> DocumentId {
    DocumentId(DOCUMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Everything a side effect needs to describe an application to its participants.
struct Participants {
    applicant: User,
    shelter: User,
    shelter_name: String,
    pet: Pet,
}

/// Service driving adoption applications through their lifecycle.
///
/// Every status change is a single compare-and-swap in the store covering the application and
/// the pet. Notifications and emails run after the write commits and never undo it.
pub struct AdoptionService<S, M> {
    store: Arc<S>,
    dispatcher: Arc<NotificationDispatcher<S, M>>,
    limits: PageLimits,
}

impl<S, M> AdoptionService<S, M>
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    pub fn new(
        store: Arc<S>,
        dispatcher: Arc<NotificationDispatcher<S, M>>,
        limits: PageLimits,
    ) -> Self {
        Self {
            store,
            dispatcher,
            limits,
        }
    }

    /// Submit a full adoption application.
    pub fn submit_application(
        &self,
        actor: &Actor,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationView, AdoptionError> {
        let application = self.submit(
            actor,
            submission.pet_id,
            ApplicationDetails::Full(submission.form),
        )?;
        self.view(application, actor)
    }

    /// Submit a quick adoption request for `pet_id`.
    pub fn submit_request(
        &self,
        actor: &Actor,
        pet_id: PetId,
        form: QuickRequestForm,
    ) -> Result<ApplicationView, AdoptionError> {
        let application = self.submit(actor, pet_id, ApplicationDetails::Quick(form))?;
        self.view(application, actor)
    }

    fn submit(
        &self,
        actor: &Actor,
        pet_id: PetId,
        details: ApplicationDetails,
    ) -> Result<AdoptionApplication, AdoptionError> {
        Capability::SubmitApplication.check(actor)?;
        let pet = self.pet(pet_id)?;
        let kind = details.kind();

        if self
            .store
            .find_application(actor.id, pet_id, kind)?
            .is_some()
        {
            return Err(AdoptionError::Duplicate {
                kind,
                pet_name: pet.name().to_string(),
            });
        }
        if pet.status != PetStatus::Available {
            return Err(AdoptionError::PetUnavailable { status: pet.status });
        }
        details.validate()?;

        let application = AdoptionApplication {
            id: next_application_id(),
            applicant_id: actor.id,
            pet_id,
            status: ApplicationStatus::Pending,
            details,
            submitted_at: Utc::now(),
            reviewed_at: None,
            completed_at: None,
            reviewer_notes: String::new(),
        };
        let application = match self.store.insert_application(application) {
            Ok(application) => application,
            Err(RepositoryError::Conflict { .. }) => {
                return Err(AdoptionError::Duplicate {
                    kind,
                    pet_name: pet.name().to_string(),
                })
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            application_id = application.id.0,
            pet_id = pet_id.0,
            applicant_id = actor.id.0,
            kind = kind.label(),
            "adoption {} submitted",
            kind.label()
        );
        if let Some(participants) = self.participants(&application)? {
            self.announce_submission(&application, &participants);
        }
        Ok(application)
    }

    pub fn approve(
        &self,
        actor: &Actor,
        id: ApplicationId,
        notes: Option<String>,
    ) -> Result<ApplicationView, AdoptionError> {
        self.run_transition(actor, id, LifecycleAction::Approve, notes)
    }

    pub fn reject(
        &self,
        actor: &Actor,
        id: ApplicationId,
        notes: Option<String>,
    ) -> Result<ApplicationView, AdoptionError> {
        self.run_transition(actor, id, LifecycleAction::Reject, notes)
    }

    pub fn complete(
        &self,
        actor: &Actor,
        id: ApplicationId,
        notes: Option<String>,
    ) -> Result<ApplicationView, AdoptionError> {
        self.run_transition(actor, id, LifecycleAction::Complete, notes)
    }

    /// Withdraw by the applicant, or cancellation by an administrator.
    pub fn cancel(&self, actor: &Actor, id: ApplicationId) -> Result<ApplicationView, AdoptionError> {
        self.run_transition(actor, id, LifecycleAction::Cancel, None)
    }

    /// Generic status endpoint: only review targets are accepted.
    pub fn update_status(
        &self,
        actor: &Actor,
        id: ApplicationId,
        update: StatusUpdate,
    ) -> Result<ApplicationView, AdoptionError> {
        let action = LifecycleAction::from_target_status(&update.status).ok_or_else(|| {
            ValidationErrors::single("status", "status must be approved, rejected or completed")
        })?;
        let notes = Some(update.reviewer_notes).filter(|notes| !is_blank(notes));
        self.run_transition(actor, id, action, notes)
    }

    fn run_transition(
        &self,
        actor: &Actor,
        id: ApplicationId,
        action: LifecycleAction,
        notes: Option<String>,
    ) -> Result<ApplicationView, AdoptionError> {
        let application = self.application_record(id)?;
        let pet = self.pet(application.pet_id)?;
        match action {
            LifecycleAction::Cancel => Capability::CancelApplication {
                applicant: application.applicant_id,
            }
            .check(actor)?,
            _ => Capability::ReviewApplication {
                shelter: pet.shelter_id,
            }
            .check(actor)?,
        }

        let transition = Transition::plan(application.status, action)?;
        let now = Utc::now();
        let write = TransitionWrite {
            application_id: id,
            expected: transition.from,
            next: transition.to,
            reviewed_at: transition.sets_reviewed_at().then_some(now),
            completed_at: transition.sets_completed_at().then_some(now),
            reviewer_notes: notes,
            pet_effect: transition.pet_effect(),
        };

        let receipt = match self.store.apply_transition(write) {
            Ok(receipt) => receipt,
            Err(RepositoryError::StatusMismatch { actual, .. }) => {
                return Err(InvalidTransition {
                    from: actual,
                    action,
                }
                .into())
            }
            Err(RepositoryError::PetUnavailable { status }) => {
                return Err(AdoptionError::PetUnavailable { status })
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            application_id = id.0,
            pet_id = receipt.pet.id.0,
            from = transition.from.label(),
            to = transition.to.label(),
            pet_status = receipt.pet.status.label(),
            actor_id = actor.id.0,
            "application {}",
            action.label()
        );
        if let Some(participants) = self.participants(&receipt.application)? {
            self.announce_transition(actor, transition, &receipt, &participants);
        }
        self.view(receipt.application, actor)
    }

    /// Detail view including interviews and documents.
    pub fn application(
        &self,
        actor: &Actor,
        id: ApplicationId,
    ) -> Result<ApplicationDetailView, AdoptionError> {
        let application = self.application_record(id)?;
        self.authorize_view(actor, &application)?;

        let interviews = self.store.interviews(id)?;
        let documents = self.store.documents(id)?;
        debug!(application_id = id.0, actor_id = actor.id.0, "application read");
        Ok(ApplicationDetailView {
            summary: self.view(application, actor)?,
            interviews,
            documents,
        })
    }

    /// Applications visible to the caller: their own, their shelter's, or all for admins.
    pub fn list(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<Page<ApplicationView>, AdoptionError> {
        let scope = if actor.is_administrator() {
            ApplicationScope::All
        } else {
            match actor.role {
                Role::Shelter => ApplicationScope::Shelter(actor.id),
                Role::Adopter | Role::Admin => ApplicationScope::Applicant(actor.id),
            }
        };

        let page = self
            .limits
            .paginate(self.store.applications(scope)?, page)?;
        let results = page
            .results
            .into_iter()
            .map(|application| self.view(application, actor))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            count: page.count,
            page: page.page,
            next: page.next,
            previous: page.previous,
            results,
        })
    }

    pub fn schedule_interview(
        &self,
        actor: &Actor,
        id: ApplicationId,
        request: InterviewRequest,
    ) -> Result<AdoptionInterview, AdoptionError> {
        let application = self.application_record(id)?;
        let pet = self.pet(application.pet_id)?;
        Capability::AttachToApplication {
            applicant: application.applicant_id,
            shelter: pet.shelter_id,
        }
        .check(actor)?;

        if application.status.is_terminal() {
            return Err(ValidationErrors::single(
                "application",
                format!("cannot schedule an interview for a {} application", application.status),
            )
            .into());
        }
        if request.scheduled_date <= Utc::now() {
            return Err(ValidationErrors::single(
                "scheduled_date",
                "interviews must be scheduled in the future",
            )
            .into());
        }

        let now = Utc::now();
        let interview = self.store.insert_interview(AdoptionInterview {
            id: next_interview_id(),
            application_id: id,
            interview_type: request.interview_type,
            scheduled_date: request.scheduled_date,
            status: InterviewStatus::Scheduled,
            notes: request.notes,
            interviewer_id: actor.id,
            created_at: now,
            updated_at: now,
        })?;

        info!(
            application_id = id.0,
            interview_id = interview.id.0,
            "adoption interview scheduled"
        );
        let counterpart = if actor.id == application.applicant_id {
            pet.shelter_id
        } else {
            application.applicant_id
        };
        self.dispatcher.notify(
            NewNotification::new(
                counterpart,
                NotificationKind::InterviewScheduled,
                format!("Interview scheduled for {}", pet.name()),
                format!(
                    "An interview about {} is scheduled for {}.",
                    pet.name(),
                    interview.scheduled_date.format("%Y-%m-%d %H:%M UTC")
                ),
            )
            .from_sender(actor.id)
            .about_pet(pet.id)
            .about_application(id)
            .important(),
        );
        Ok(interview)
    }

    pub fn upload_document(
        &self,
        actor: &Actor,
        id: ApplicationId,
        upload: DocumentUpload,
    ) -> Result<AdoptionDocument, AdoptionError> {
        let application = self.application_record(id)?;
        let pet = self.pet(application.pet_id)?;
        Capability::AttachToApplication {
            applicant: application.applicant_id,
            shelter: pet.shelter_id,
        }
        .check(actor)?;

        let mut errors = ValidationErrors::new();
        errors.check(!is_blank(&upload.title), "title", "this field is required");
        errors.check(!is_blank(&upload.file), "file", "this field is required");
        errors.into_result()?;

        let content_type = mime_guess::from_path(&upload.file)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let document = self.store.insert_document(AdoptionDocument {
            id: next_document_id(),
            application_id: id,
            document_type: upload.document_type,
            title: upload.title,
            file: upload.file,
            content_type,
            uploaded_by: actor.id,
            uploaded_at: Utc::now(),
        })?;

        info!(
            application_id = id.0,
            document_id = document.id.0,
            "adoption document stored"
        );
        Ok(document)
    }

    fn authorize_view(
        &self,
        actor: &Actor,
        application: &AdoptionApplication,
    ) -> Result<(), AdoptionError> {
        let pet = self.pet(application.pet_id)?;
        Capability::ViewApplication {
            applicant: application.applicant_id,
            shelter: pet.shelter_id,
        }
        .check(actor)?;
        Ok(())
    }

    fn application_record(&self, id: ApplicationId) -> Result<AdoptionApplication, AdoptionError> {
        self.store
            .application(id)?
            .ok_or(AdoptionError::ApplicationNotFound)
    }

    fn pet(&self, id: PetId) -> Result<Pet, AdoptionError> {
        self.store.pet(id)?.ok_or(AdoptionError::PetNotFound)
    }

    fn view(
        &self,
        application: AdoptionApplication,
        viewer: &Actor,
    ) -> Result<ApplicationView, AdoptionError> {
        let pet = self.pet(application.pet_id)?;
        let applicant = self
            .store
            .user(application.applicant_id)?
            .ok_or(RepositoryError::MissingReference { entity: "user" })?;

        Ok(ApplicationView {
            kind: application.kind(),
            pet: pet_summary(self.store.as_ref(), &pet, Some(viewer.id))?,
            applicant: applicant.profile_view(),
            can_be_approved: application.can_be_approved(),
            can_be_rejected: application.can_be_rejected(),
            can_be_completed: application.can_be_completed(),
            application,
        })
    }

    /// `None` when a participant account vanished; side effects are skipped then.
    fn participants(
        &self,
        application: &AdoptionApplication,
    ) -> Result<Option<Participants>, AdoptionError> {
        let Some(pet) = self.store.pet(application.pet_id)? else {
            return Ok(None);
        };
        let applicant = self.store.user(application.applicant_id)?;
        let shelter = self.store.user(pet.shelter_id)?;
        let (Some(applicant), Some(shelter)) = (applicant, shelter) else {
            return Ok(None);
        };
        let shelter_name = match self.store.shelter_profile(shelter.id)? {
            Some(profile) => profile.organization_name,
            None => shelter.display_name(),
        };

        Ok(Some(Participants {
            applicant,
            shelter,
            shelter_name,
            pet,
        }))
    }

    fn email_context(
        &self,
        application: &AdoptionApplication,
        participants: &Participants,
    ) -> EmailContext {
        EmailContext {
            pet_name: participants.pet.name().to_string(),
            applicant_name: participants.applicant.display_name(),
            shelter_name: participants.shelter_name.clone(),
            status: application.status.label().to_string(),
            reviewer_notes: application.reviewer_notes.clone(),
        }
    }

    fn announce_submission(&self, application: &AdoptionApplication, participants: &Participants) {
        let Participants {
            applicant,
            shelter,
            pet,
            ..
        } = participants;
        let noun = application.kind().label();
        let pet_name = pet.name();

        self.dispatcher.notify(
            NewNotification::new(
                shelter.id,
                NotificationKind::AdoptionRequest,
                format!("New Adoption {} for {pet_name}", capitalized(noun)),
                format!(
                    "{} has submitted an adoption {noun} for {pet_name}.",
                    applicant.display_name()
                ),
            )
            .from_sender(applicant.id)
            .about_pet(pet.id)
            .about_application(application.id)
            .important(),
        );
        self.dispatcher.notify(
            NewNotification::new(
                applicant.id,
                NotificationKind::AdoptionRequest,
                format!("Adoption {} Submitted for {pet_name}", capitalized(noun)),
                format!(
                    "Your adoption {noun} for {pet_name} has been submitted successfully. \
                     The shelter will contact you soon."
                ),
            )
            .about_pet(pet.id)
            .about_application(application.id),
        );

        let context = self.email_context(application, participants);
        self.dispatcher
            .send_email(EmailTemplate::NewApplication, shelter, &context);
        self.dispatcher
            .send_email(EmailTemplate::ApplicationConfirmation, applicant, &context);
    }

    fn announce_transition(
        &self,
        actor: &Actor,
        transition: Transition,
        receipt: &TransitionReceipt,
        participants: &Participants,
    ) {
        let application = &receipt.application;
        let Participants {
            applicant,
            shelter,
            pet,
            ..
        } = participants;
        let pet_name = pet.name();
        let noun = application.kind().label();
        let shelter_message = if is_blank(&application.reviewer_notes) {
            String::new()
        } else {
            format!("\n\nShelter message: {}", application.reviewer_notes)
        };
        let context = self.email_context(application, participants);

        match transition.action {
            LifecycleAction::Approve => {
                self.dispatcher.notify(
                    NewNotification::new(
                        applicant.id,
                        NotificationKind::ApplicationApproved,
                        format!("Your adoption {noun} for {pet_name} has been approved!"),
                        format!(
                            "Great news! Your {noun} to adopt {pet_name} has been approved. The \
                             shelter will contact you soon to proceed with the adoption process.\
                             {shelter_message}"
                        ),
                    )
                    .from_sender(actor.id)
                    .about_pet(pet.id)
                    .about_application(application.id)
                    .important(),
                );
                self.dispatcher
                    .send_email(EmailTemplate::StatusUpdate, applicant, &context);
            }
            LifecycleAction::Reject => {
                self.dispatcher.notify(
                    NewNotification::new(
                        applicant.id,
                        NotificationKind::ApplicationRejected,
                        format!("Update on your adoption {noun} for {pet_name}"),
                        format!(
                            "Thank you for your interest in {pet_name}. Unfortunately, we cannot \
                             proceed with your {noun} at this time.{shelter_message}"
                        ),
                    )
                    .from_sender(actor.id)
                    .about_pet(pet.id)
                    .about_application(application.id)
                    .important(),
                );
                self.dispatcher
                    .send_email(EmailTemplate::StatusUpdate, applicant, &context);
            }
            LifecycleAction::Complete => {
                self.dispatcher.notify(
                    NewNotification::new(
                        applicant.id,
                        NotificationKind::AdoptionCompleted,
                        format!("Congratulations! {pet_name} is now yours!"),
                        format!("The adoption of {pet_name} is complete."),
                    )
                    .from_sender(actor.id)
                    .about_pet(pet.id)
                    .about_application(application.id)
                    .important(),
                );
                self.dispatcher.notify(
                    NewNotification::new(
                        shelter.id,
                        NotificationKind::AdoptionCompleted,
                        format!("Adoption completed: {pet_name}"),
                        format!(
                            "{pet_name} has been adopted by {}.",
                            applicant.display_name()
                        ),
                    )
                    .about_pet(pet.id)
                    .about_application(application.id),
                );
                self.notify_favoriters(receipt, applicant);
                self.dispatcher
                    .send_email(EmailTemplate::AdoptionCompleted, applicant, &context);
                self.dispatcher
                    .send_email(EmailTemplate::AdoptionCompletedShelter, shelter, &context);
            }
            LifecycleAction::Cancel => {
                let released = if transition.from == ApplicationStatus::Approved
                    && receipt.pet.status == PetStatus::Available
                {
                    format!(" {pet_name} is available again.")
                } else {
                    String::new()
                };
                self.dispatcher.notify(
                    NewNotification::new(
                        shelter.id,
                        NotificationKind::AdoptionRequest,
                        format!("Adoption {noun} withdrawn for {pet_name}"),
                        format!(
                            "The adoption {noun} from {} for {pet_name} was cancelled.{released}",
                            applicant.display_name()
                        ),
                    )
                    .from_sender(actor.id)
                    .about_pet(pet.id)
                    .about_application(application.id),
                );
            }
        }
    }

    fn notify_favoriters(&self, receipt: &TransitionReceipt, adopter: &User) {
        let pet = &receipt.pet;
        let favorited_by = match self.store.favorited_by(pet.id) {
            Ok(users) => users,
            Err(error) => {
                warn!(pet_id = pet.id.0, %error, "favorites unavailable for notification");
                return;
            }
        };

        for user_id in favorited_by.into_iter().filter(|user_id| *user_id != adopter.id) {
            self.dispatcher.notify(
                NewNotification::new(
                    user_id,
                    NotificationKind::FavoritePetAdopted,
                    format!("{} has been adopted", pet.name()),
                    format!(
                        "{} from your favorites has found a home. Browse other pets waiting for \
                         adoption.",
                        pet.name()
                    ),
                )
                .about_pet(pet.id),
            );
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Error raised by the adoption service.
#[derive(Debug, thiserror::Error)]
pub enum AdoptionError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error("application not found")]
    ApplicationNotFound,
    #[error("pet not found")]
    PetNotFound,
    #[error("you already have an adoption {} for {pet_name}", .kind.label())]
    Duplicate {
        kind: ApplicationKind,
        pet_name: String,
    },
    #[error("pet is not available for adoption (currently {})", .status.label())]
    PetUnavailable { status: PetStatus },
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error(transparent)]
    Page(#[from] PageOutOfRange),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
