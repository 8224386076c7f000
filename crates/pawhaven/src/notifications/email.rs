//! Outbound email: plain-text templates and the transport seam.

use tracing::info;

/// A rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Transport seam for outbound mail.
pub trait Mailer: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("recipient has no email address")]
    MissingRecipient,
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Writes each message to the log instead of a network transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMailer;

impl Mailer for TracingMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "email dispatched"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    /// To the shelter when an application arrives.
    NewApplication,
    /// To the applicant after submitting.
    ApplicationConfirmation,
    /// To the applicant after approve or reject.
    StatusUpdate,
    /// To the adopter once the adoption completes.
    AdoptionCompleted,
    /// To the shelter once the adoption completes.
    AdoptionCompletedShelter,
}

/// Values interpolated into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContext {
    pub pet_name: String,
    pub applicant_name: String,
    pub shelter_name: String,
    pub status: String,
    pub reviewer_notes: String,
}

impl EmailTemplate {
    pub fn subject(self, context: &EmailContext) -> String {
        let pet = &context.pet_name;
        match self {
            EmailTemplate::NewApplication => format!("New Adoption Application for {pet}"),
            EmailTemplate::ApplicationConfirmation => format!("Application Submitted for {pet}"),
            EmailTemplate::StatusUpdate => format!("Update on Your Application for {pet}"),
            EmailTemplate::AdoptionCompleted => format!("Congratulations! {pet} is Now Yours!"),
            EmailTemplate::AdoptionCompletedShelter => format!("Adoption Completed: {pet}"),
        }
    }

    pub fn body(self, context: &EmailContext) -> String {
        let EmailContext {
            pet_name,
            applicant_name,
            shelter_name,
            status,
            reviewer_notes,
        } = context;

        let mut body = match self {
            EmailTemplate::NewApplication => format!(
                "Hello {shelter_name},\n\n{applicant_name} has submitted an adoption application \
                 for {pet_name}. Review it from your applications dashboard."
            ),
            EmailTemplate::ApplicationConfirmation => format!(
                "Hello {applicant_name},\n\nThank you for applying to adopt {pet_name}. \
                 {shelter_name} will review your application and get back to you soon."
            ),
            EmailTemplate::StatusUpdate => format!(
                "Hello {applicant_name},\n\nYour application for {pet_name} is now {status}."
            ),
            EmailTemplate::AdoptionCompleted => format!(
                "Hello {applicant_name},\n\nCongratulations! The adoption of {pet_name} from \
                 {shelter_name} is complete. Enjoy your new companion."
            ),
            EmailTemplate::AdoptionCompletedShelter => format!(
                "Hello {shelter_name},\n\nThe adoption of {pet_name} by {applicant_name} has been \
                 marked as completed."
            ),
        };

        if self == EmailTemplate::StatusUpdate && !reviewer_notes.trim().is_empty() {
            body.push_str(&format!("\n\nNotes from the shelter: {reviewer_notes}"));
        }
        body.push_str("\n\nThe PawHaven team");
        body
    }

    pub fn render(self, from: &str, to: &str, context: &EmailContext) -> EmailMessage {
        EmailMessage {
            from: from.to_string(),
            to: to.to_string(),
            subject: self.subject(context),
            body: self.body(context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> EmailContext {
        EmailContext {
            pet_name: "Biscuit".to_string(),
            applicant_name: "Jane Smith".to_string(),
            shelter_name: "Happy Paws Animal Shelter".to_string(),
            status: "approved".to_string(),
            reviewer_notes: "Please bring a carrier.".to_string(),
        }
    }

    #[test]
    fn subjects_name_the_pet() {
        let context = context();
        assert_eq!(
            EmailTemplate::NewApplication.subject(&context),
            "New Adoption Application for Biscuit"
        );
        assert_eq!(
            EmailTemplate::AdoptionCompleted.subject(&context),
            "Congratulations! Biscuit is Now Yours!"
        );
        assert_eq!(
            EmailTemplate::AdoptionCompletedShelter.subject(&context),
            "Adoption Completed: Biscuit"
        );
    }

    #[test]
    fn status_update_carries_reviewer_notes() {
        let message = EmailTemplate::StatusUpdate.render(
            "noreply@pawhaven.local",
            "jane@example.com",
            &context(),
        );
        assert_eq!(message.subject, "Update on Your Application for Biscuit");
        assert!(message.body.contains("now approved"));
        assert!(message.body.contains("Please bring a carrier."));
    }
}
