use std::sync::Arc;

use chrono::Utc;

use super::domain::{InboxView, Notification, NotificationId, UnreadCount};
use super::repository::NotificationRepository;
use crate::access::Actor;
use crate::store::RepositoryError;

/// How many notifications the inbox shows.
pub const INBOX_LIMIT: usize = 20;

/// Per-user inbox over stored notifications.
pub struct NotificationService<S> {
    store: Arc<S>,
}

impl<S> NotificationService<S>
where
    S: NotificationRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn inbox(&self, actor: &Actor) -> Result<InboxView, NotificationError> {
        Ok(InboxView {
            notifications: self.store.notifications_for(actor.id, Some(INBOX_LIMIT))?,
            unread_count: self.store.unread_count(actor.id)?,
        })
    }

    pub fn unread_count(&self, actor: &Actor) -> Result<UnreadCount, NotificationError> {
        Ok(UnreadCount {
            unread_count: self.store.unread_count(actor.id)?,
        })
    }

    /// Idempotent; `read_at` keeps the first read time.
    pub fn mark_read(
        &self,
        actor: &Actor,
        id: NotificationId,
    ) -> Result<Notification, NotificationError> {
        match self.store.mark_read(actor.id, id, Utc::now()) {
            Ok(notification) => Ok(notification),
            Err(RepositoryError::NotFound) => Err(NotificationError::NotFound),
            Err(other) => Err(other.into()),
        }
    }

    pub fn mark_all_read(&self, actor: &Actor) -> Result<usize, NotificationError> {
        Ok(self.store.mark_all_read(actor.id, Utc::now())?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
