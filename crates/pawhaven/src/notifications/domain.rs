use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::UserId;
use crate::adoptions::ApplicationId;
use crate::pets::PetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AdoptionRequest,
    ApplicationApproved,
    ApplicationRejected,
    NewPetAdded,
    AdoptionCompleted,
    InterviewScheduled,
    FavoritePetAdopted,
    SystemAnnouncement,
}

/// In-app event record. Only the read flag changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub sender_id: Option<UserId>,
    pub notification_type: NotificationKind,
    pub title: String,
    pub message: String,
    pub pet_id: Option<PetId>,
    pub application_id: Option<ApplicationId>,
    pub is_read: bool,
    pub is_important: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Insert payload for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub sender_id: Option<UserId>,
    pub pet_id: Option<PetId>,
    pub application_id: Option<ApplicationId>,
    pub is_important: bool,
}

impl NewNotification {
    pub fn new(
        recipient_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id,
            kind,
            title: title.into(),
            message: message.into(),
            sender_id: None,
            pet_id: None,
            application_id: None,
            is_important: false,
        }
    }

    pub fn from_sender(mut self, sender_id: UserId) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    pub fn about_pet(mut self, pet_id: PetId) -> Self {
        self.pet_id = Some(pet_id);
        self
    }

    pub fn about_application(mut self, application_id: ApplicationId) -> Self {
        self.application_id = Some(application_id);
        self
    }

    pub fn important(mut self) -> Self {
        self.is_important = true;
        self
    }
}

/// Inbox payload: newest notifications first plus the unread total.
#[derive(Debug, Clone, Serialize)]
pub struct InboxView {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UnreadCount {
    pub unread_count: usize,
}
