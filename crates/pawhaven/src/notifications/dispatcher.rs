use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::domain::{NewNotification, Notification, NotificationId};
use super::email::{EmailContext, EmailError, EmailTemplate, Mailer};
use super::repository::NotificationRepository;
use crate::accounts::User;
use crate::config::EmailConfig;
use crate::store::RepositoryError;

static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_notification_id() -> NotificationId {
    NotificationId(NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Creates in-app notifications and sends the matching emails.
///
/// `create_notification` reports store failures to the caller. `notify` and `send_email` are
/// best-effort: failures are logged and dropped so they can follow a committed transition.
pub struct NotificationDispatcher<S, M> {
    store: Arc<S>,
    mailer: Arc<M>,
    email: EmailConfig,
}

impl<S, M> NotificationDispatcher<S, M>
where
    S: NotificationRepository + 'static,
    M: Mailer + 'static,
{
    pub fn new(store: Arc<S>, mailer: Arc<M>, email: EmailConfig) -> Self {
        Self {
            store,
            mailer,
            email,
        }
    }

    pub fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let NewNotification {
            recipient_id,
            kind,
            title,
            message,
            sender_id,
            pet_id,
            application_id,
            is_important,
        } = notification;

        self.store.insert_notification(Notification {
            id: next_notification_id(),
            recipient_id,
            sender_id,
            notification_type: kind,
            title,
            message,
            pet_id,
            application_id,
            is_read: false,
            is_important,
            created_at: Utc::now(),
            read_at: None,
        })
    }

    /// Inserts the notification, logging instead of failing.
    pub fn notify(&self, notification: NewNotification) {
        let recipient = notification.recipient_id;
        let kind = notification.kind;
        match self.create_notification(notification) {
            Ok(stored) => debug!(
                notification_id = stored.id.0,
                recipient_id = recipient.0,
                ?kind,
                "notification created"
            ),
            Err(error) => warn!(
                recipient_id = recipient.0,
                ?kind,
                %error,
                "notification could not be stored"
            ),
        }
    }

    /// Renders `template` for `recipient` and hands it to the mailer, logging any failure.
    pub fn send_email(&self, template: EmailTemplate, recipient: &User, context: &EmailContext) {
        if !self.email.enabled {
            debug!(?template, "email delivery disabled");
            return;
        }

        let result = if recipient.email.trim().is_empty() {
            Err(EmailError::MissingRecipient)
        } else {
            let message = template.render(&self.email.from_address, &recipient.email, context);
            self.mailer.send(&message)
        };

        if let Err(error) = result {
            warn!(
                ?template,
                recipient_id = recipient.id.0,
                %error,
                "email delivery failed"
            );
        }
    }
}
