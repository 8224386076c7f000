use chrono::{DateTime, Utc};

use super::domain::{Notification, NotificationId};
use crate::accounts::UserId;
use crate::store::RepositoryError;

/// Storage abstraction for in-app notifications.
pub trait NotificationRepository: Send + Sync {
    fn insert_notification(
        &self,
        notification: Notification,
    ) -> Result<Notification, RepositoryError>;
    /// Newest first, truncated to `limit` when given.
    fn notifications_for(
        &self,
        recipient_id: UserId,
        limit: Option<usize>,
    ) -> Result<Vec<Notification>, RepositoryError>;
    fn unread_count(&self, recipient_id: UserId) -> Result<usize, RepositoryError>;
    /// Scoped to the recipient: another user's notification is `NotFound`.
    fn mark_read(
        &self,
        recipient_id: UserId,
        id: NotificationId,
        at: DateTime<Utc>,
    ) -> Result<Notification, RepositoryError>;
    /// Returns how many notifications flipped to read.
    fn mark_all_read(&self, recipient_id: UserId, at: DateTime<Utc>)
        -> Result<usize, RepositoryError>;
}
