use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::domain::{PetAttributes, PetId, PetImageUpload, PetUpdate};
use super::search::{PetQuery, SearchFilters};
use super::service::{PetError, PetService};
use crate::access::Actor;
use crate::http::{
    error_response, permission_response, repository_response, validation_response, PageRequest,
};
use crate::store::PlatformStore;

/// Router builder exposing catalog, search and favorite endpoints.
pub fn pet_router<S>(service: Arc<PetService<S>>) -> Router
where
    S: PlatformStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/pets",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route("/api/v1/pets/mine", get(my_pets_handler::<S>))
        .route("/api/v1/pets/search", post(search_handler::<S>))
        .route(
            "/api/v1/pets/:pet_id",
            get(detail_handler::<S>)
                .patch(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route("/api/v1/pets/:pet_id/images", post(image_handler::<S>))
        .route("/api/v1/pets/:pet_id/favorite", post(favorite_handler::<S>))
        .route("/api/v1/favorites", get(favorites_handler::<S>))
        .with_state(service)
}

pub(crate) fn pet_error_response(error: PetError) -> Response {
    match error {
        PetError::Validation(errors) => validation_response(&errors),
        PetError::Permission(error) => permission_response(&error),
        PetError::NotFound => error_response(StatusCode::NOT_FOUND, "pet not found"),
        PetError::Page(error) => error_response(StatusCode::NOT_FOUND, error.to_string()),
        PetError::Repository(error) => repository_response(&error),
    }
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<PetService<S>>>,
    viewer: Option<Actor>,
    Query(query): Query<PetQuery>,
    Query(page): Query<PageRequest>,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.list(&query, page, viewer.as_ref()) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => pet_error_response(error),
    }
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<PetService<S>>>,
    actor: Actor,
    Json(payload): Json<PetAttributes>,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.create(&actor, payload) {
        Ok(pet) => (StatusCode::CREATED, Json(pet)).into_response(),
        Err(error) => pet_error_response(error),
    }
}

pub(crate) async fn my_pets_handler<S>(
    State(service): State<Arc<PetService<S>>>,
    actor: Actor,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.my_pets(&actor) {
        Ok(pets) => (StatusCode::OK, Json(pets)).into_response(),
        Err(error) => pet_error_response(error),
    }
}

pub(crate) async fn search_handler<S>(
    State(service): State<Arc<PetService<S>>>,
    viewer: Option<Actor>,
    Query(page): Query<PageRequest>,
    Json(filters): Json<SearchFilters>,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.search(&filters, page, viewer.as_ref()) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => pet_error_response(error),
    }
}

pub(crate) async fn detail_handler<S>(
    State(service): State<Arc<PetService<S>>>,
    viewer: Option<Actor>,
    Path(pet_id): Path<u64>,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.detail(PetId(pet_id), viewer.as_ref()) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(error) => pet_error_response(error),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<PetService<S>>>,
    actor: Actor,
    Path(pet_id): Path<u64>,
    Json(payload): Json<PetUpdate>,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.update(&actor, PetId(pet_id), payload) {
        Ok(pet) => (StatusCode::OK, Json(pet)).into_response(),
        Err(error) => pet_error_response(error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<PetService<S>>>,
    actor: Actor,
    Path(pet_id): Path<u64>,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.delete(&actor, PetId(pet_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => pet_error_response(error),
    }
}

pub(crate) async fn image_handler<S>(
    State(service): State<Arc<PetService<S>>>,
    actor: Actor,
    Path(pet_id): Path<u64>,
    Json(payload): Json<PetImageUpload>,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.add_image(&actor, PetId(pet_id), payload) {
        Ok(image) => (StatusCode::CREATED, Json(image)).into_response(),
        Err(error) => pet_error_response(error),
    }
}

pub(crate) async fn favorite_handler<S>(
    State(service): State<Arc<PetService<S>>>,
    actor: Actor,
    Path(pet_id): Path<u64>,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.toggle_favorite(&actor, PetId(pet_id)) {
        Ok(toggle) => (StatusCode::OK, Json(toggle)).into_response(),
        Err(error) => pet_error_response(error),
    }
}

pub(crate) async fn favorites_handler<S>(
    State(service): State<Arc<PetService<S>>>,
    actor: Actor,
    Query(page): Query<PageRequest>,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.favorites(&actor, page) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => pet_error_response(error),
    }
}
