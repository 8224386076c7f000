use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::NotificationId;
use super::repository::NotificationRepository;
use super::service::{NotificationError, NotificationService};
use crate::access::Actor;
use crate::http::{error_response, repository_response};

/// Router builder exposing the caller's notification inbox.
pub fn notification_router<S>(service: Arc<NotificationService<S>>) -> Router
where
    S: NotificationRepository + 'static,
{
    Router::new()
        .route("/api/v1/notifications", get(inbox_handler::<S>))
        .route(
            "/api/v1/notifications/unread-count",
            get(unread_count_handler::<S>),
        )
        .route(
            "/api/v1/notifications/:notification_id/read",
            post(mark_read_handler::<S>),
        )
        .route(
            "/api/v1/notifications/read-all",
            post(mark_all_read_handler::<S>),
        )
        .with_state(service)
}

fn notification_error_response(error: NotificationError) -> Response {
    match error {
        NotificationError::NotFound => {
            error_response(StatusCode::NOT_FOUND, "notification not found")
        }
        NotificationError::Repository(error) => repository_response(&error),
    }
}

pub(crate) async fn inbox_handler<S>(
    State(service): State<Arc<NotificationService<S>>>,
    actor: Actor,
) -> Response
where
    S: NotificationRepository + 'static,
{
    match service.inbox(&actor) {
        Ok(inbox) => (StatusCode::OK, Json(inbox)).into_response(),
        Err(error) => notification_error_response(error),
    }
}

pub(crate) async fn unread_count_handler<S>(
    State(service): State<Arc<NotificationService<S>>>,
    actor: Actor,
) -> Response
where
    S: NotificationRepository + 'static,
{
    match service.unread_count(&actor) {
        Ok(count) => (StatusCode::OK, Json(count)).into_response(),
        Err(error) => notification_error_response(error),
    }
}

pub(crate) async fn mark_read_handler<S>(
    State(service): State<Arc<NotificationService<S>>>,
    actor: Actor,
    Path(notification_id): Path<u64>,
) -> Response
where
    S: NotificationRepository + 'static,
{
    match service.mark_read(&actor, NotificationId(notification_id)) {
        Ok(notification) => (StatusCode::OK, Json(notification)).into_response(),
        Err(error) => notification_error_response(error),
    }
}

pub(crate) async fn mark_all_read_handler<S>(
    State(service): State<Arc<NotificationService<S>>>,
    actor: Actor,
) -> Response
where
    S: NotificationRepository + 'static,
{
    match service.mark_all_read(&actor) {
        Ok(marked) => (StatusCode::OK, Json(json!({ "marked_read": marked }))).into_response(),
        Err(error) => notification_error_response(error),
    }
}
