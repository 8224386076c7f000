//! In-app notifications, outbound email and the per-user inbox.

pub mod dispatcher;
pub mod domain;
pub mod email;
pub mod repository;
pub mod router;
pub mod service;


pub use dispatcher::NotificationDispatcher;
pub use domain::{
    InboxView, NewNotification, Notification, NotificationId, NotificationKind, UnreadCount,
};
pub use email::{EmailContext, EmailError, EmailMessage, EmailTemplate, Mailer, TracingMailer};
pub use repository::NotificationRepository;
pub use router::notification_router;
pub use service::{NotificationError, NotificationService, INBOX_LIMIT};
