use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{
    ApplicationId, ApplicationSubmission, DocumentUpload, InterviewRequest, QuickRequestForm,
    ReviewNotes, StatusUpdate,
};
use super::lifecycle::LifecycleAction;
use super::service::{AdoptionError, AdoptionService};
use crate::access::Actor;
use crate::http::{
    error_response, permission_response, repository_response, validation_response, PageRequest,
};
use crate::notifications::Mailer;
use crate::pets::PetId;
use crate::store::PlatformStore;

/// Router builder exposing submission, review and attachment endpoints for applications.
pub fn adoption_router<S, M>(service: Arc<AdoptionService<S, M>>) -> Router
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            get(list_handler::<S, M>).post(submit_handler::<S, M>),
        )
        .route(
            "/api/v1/pets/:pet_id/requests",
            post(request_handler::<S, M>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(detail_handler::<S, M>),
        )
        .route(
            "/api/v1/applications/:application_id/approve",
            post(approve_handler::<S, M>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_handler::<S, M>),
        )
        .route(
            "/api/v1/applications/:application_id/complete",
            post(complete_handler::<S, M>),
        )
        .route(
            "/api/v1/applications/:application_id/cancel",
            post(cancel_handler::<S, M>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(status_handler::<S, M>),
        )
        .route(
            "/api/v1/applications/:application_id/interviews",
            post(interview_handler::<S, M>),
        )
        .route(
            "/api/v1/applications/:application_id/documents",
            post(document_handler::<S, M>),
        )
        .with_state(service)
}

pub(crate) fn adoption_error_response(error: AdoptionError) -> Response {
    match error {
        AdoptionError::Validation(errors) => validation_response(&errors),
        AdoptionError::Permission(error) => permission_response(&error),
        AdoptionError::ApplicationNotFound => {
            error_response(StatusCode::NOT_FOUND, "application not found")
        }
        AdoptionError::PetNotFound => error_response(StatusCode::NOT_FOUND, "pet not found"),
        AdoptionError::InvalidTransition(transition) => {
            let payload = json!({
                "error": transition.to_string(),
                "status": transition.from,
                "action": transition.action,
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        error @ (AdoptionError::Duplicate { .. } | AdoptionError::PetUnavailable { .. }) => {
            error_response(StatusCode::CONFLICT, error.to_string())
        }
        AdoptionError::Page(error) => error_response(StatusCode::NOT_FOUND, error.to_string()),
        AdoptionError::Repository(error) => repository_response(&error),
    }
}

pub(crate) async fn list_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Query(page): Query<PageRequest>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    match service.list(&actor, page) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => adoption_error_response(error),
    }
}

pub(crate) async fn submit_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Json(submission): Json<ApplicationSubmission>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    match service.submit_application(&actor, submission) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => adoption_error_response(error),
    }
}

pub(crate) async fn request_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Path(pet_id): Path<u64>,
    Json(form): Json<QuickRequestForm>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    match service.submit_request(&actor, PetId(pet_id), form) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => adoption_error_response(error),
    }
}

pub(crate) async fn detail_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Path(application_id): Path<u64>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    match service.application(&actor, ApplicationId(application_id)) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(error) => adoption_error_response(error),
    }
}

async fn review<S, M>(
    service: Arc<AdoptionService<S, M>>,
    actor: Actor,
    id: ApplicationId,
    action: LifecycleAction,
    notes: Option<String>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    let result = match action {
        LifecycleAction::Approve => service.approve(&actor, id, notes),
        LifecycleAction::Reject => service.reject(&actor, id, notes),
        LifecycleAction::Complete => service.complete(&actor, id, notes),
        LifecycleAction::Cancel => service.cancel(&actor, id),
    };
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => adoption_error_response(error),
    }
}

pub(crate) async fn approve_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Path(application_id): Path<u64>,
    notes: Option<Json<ReviewNotes>>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    let notes = notes.and_then(|Json(body)| body.reviewer_notes);
    review(
        service,
        actor,
        ApplicationId(application_id),
        LifecycleAction::Approve,
        notes,
    )
    .await
}

pub(crate) async fn reject_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Path(application_id): Path<u64>,
    notes: Option<Json<ReviewNotes>>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    let notes = notes.and_then(|Json(body)| body.reviewer_notes);
    review(
        service,
        actor,
        ApplicationId(application_id),
        LifecycleAction::Reject,
        notes,
    )
    .await
}

pub(crate) async fn complete_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Path(application_id): Path<u64>,
    notes: Option<Json<ReviewNotes>>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    let notes = notes.and_then(|Json(body)| body.reviewer_notes);
    review(
        service,
        actor,
        ApplicationId(application_id),
        LifecycleAction::Complete,
        notes,
    )
    .await
}

pub(crate) async fn cancel_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Path(application_id): Path<u64>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    review(
        service,
        actor,
        ApplicationId(application_id),
        LifecycleAction::Cancel,
        None,
    )
    .await
}

pub(crate) async fn status_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Path(application_id): Path<u64>,
    Json(update): Json<StatusUpdate>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    match service.update_status(&actor, ApplicationId(application_id), update) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => adoption_error_response(error),
    }
}

pub(crate) async fn interview_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Path(application_id): Path<u64>,
    Json(request): Json<InterviewRequest>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    match service.schedule_interview(&actor, ApplicationId(application_id), request) {
        Ok(interview) => (StatusCode::CREATED, Json(interview)).into_response(),
        Err(error) => adoption_error_response(error),
    }
}

pub(crate) async fn document_handler<S, M>(
    State(service): State<Arc<AdoptionService<S, M>>>,
    actor: Actor,
    Path(application_id): Path<u64>,
    Json(upload): Json<DocumentUpload>,
) -> Response
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    match service.upload_document(&actor, ApplicationId(application_id), upload) {
        Ok(document) => (StatusCode::CREATED, Json(document)).into_response(),
        Err(error) => adoption_error_response(error),
    }
}
