use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::domain::{
    AdopterProfileInput, AuthToken, LoginRequest, ProfileUpdate, Registration,
    ShelterProfileInput,
};
use super::repository::UserRepository;
use super::service::{AccountError, AccountService};
use crate::access::Actor;
use crate::http::{
    error_response, permission_response, repository_response, validation_response,
};
use crate::store::RepositoryError;

/// Router builder exposing registration, login and profile endpoints.
pub fn account_router<S>(service: Arc<AccountService<S>>) -> Router
where
    S: UserRepository + 'static,
{
    Router::new()
        .route("/api/v1/auth/register", post(register_handler::<S>))
        .route("/api/v1/auth/login", post(login_handler::<S>))
        .route(
            "/api/v1/auth/profile",
            get(profile_handler::<S>).patch(update_profile_handler::<S>),
        )
        .route("/api/v1/profiles/shelter", post(shelter_profile_handler::<S>))
        .route("/api/v1/profiles/adopter", post(adopter_profile_handler::<S>))
        .with_state(service)
}

/// Wraps `router` so requests carrying an API token get their [`Actor`] resolved.
///
/// Requests without an `Authorization` header pass through anonymously; handlers that need a
/// caller reject them when extracting [`Actor`]. A header naming an unknown token is a 401.
pub fn authenticate<S>(router: Router, service: Arc<AccountService<S>>) -> Router
where
    S: UserRepository + 'static,
{
    router.layer(middleware::from_fn_with_state(service, resolve_actor::<S>))
}

async fn resolve_actor<S>(
    State(service): State<Arc<AccountService<S>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    S: UserRepository + 'static,
{
    let Some(token) = token_from_headers(request.headers()) else {
        return next.run(request).await;
    };

    match service.authenticate(&token) {
        Ok(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Err(error) => account_error_response(error),
    }
}

/// Accepts `Token <key>` and `Bearer <key>`.
pub(crate) fn token_from_headers(headers: &HeaderMap) -> Option<AuthToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, key) = value.trim().split_once(' ')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        Some(AuthToken(key.to_string()))
    } else {
        None
    }
}

#[async_trait]
impl<St> FromRequestParts<St> for Actor
where
    St: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Actor>().copied().ok_or_else(|| {
            error_response(
                StatusCode::UNAUTHORIZED,
                "authentication credentials were not provided",
            )
        })
    }
}

pub(crate) fn account_error_response(error: AccountError) -> Response {
    match error {
        AccountError::Validation(errors) => validation_response(&errors),
        AccountError::Unauthenticated => {
            error_response(StatusCode::UNAUTHORIZED, AccountError::Unauthenticated.to_string())
        }
        AccountError::Permission(error) => permission_response(&error),
        AccountError::NotFound => error_response(StatusCode::NOT_FOUND, "account not found"),
        AccountError::Repository(RepositoryError::Conflict { constraint }) => error_response(
            StatusCode::CONFLICT,
            format!("profile already exists ({constraint})"),
        ),
        AccountError::Repository(error) => repository_response(&error),
    }
}

pub(crate) async fn register_handler<S>(
    State(service): State<Arc<AccountService<S>>>,
    Json(payload): Json<Registration>,
) -> Response
where
    S: UserRepository + 'static,
{
    match service.register(payload) {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(error) => account_error_response(error),
    }
}

pub(crate) async fn login_handler<S>(
    State(service): State<Arc<AccountService<S>>>,
    Json(payload): Json<LoginRequest>,
) -> Response
where
    S: UserRepository + 'static,
{
    match service.login(payload) {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(error) => account_error_response(error),
    }
}

pub(crate) async fn profile_handler<S>(
    State(service): State<Arc<AccountService<S>>>,
    actor: Actor,
) -> Response
where
    S: UserRepository + 'static,
{
    match service.profile(&actor) {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(error) => account_error_response(error),
    }
}

pub(crate) async fn update_profile_handler<S>(
    State(service): State<Arc<AccountService<S>>>,
    actor: Actor,
    Json(payload): Json<ProfileUpdate>,
) -> Response
where
    S: UserRepository + 'static,
{
    match service.update_profile(&actor, payload) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => account_error_response(error),
    }
}

pub(crate) async fn shelter_profile_handler<S>(
    State(service): State<Arc<AccountService<S>>>,
    actor: Actor,
    Json(payload): Json<ShelterProfileInput>,
) -> Response
where
    S: UserRepository + 'static,
{
    match service.setup_shelter_profile(&actor, payload) {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(error) => account_error_response(error),
    }
}

pub(crate) async fn adopter_profile_handler<S>(
    State(service): State<Arc<AccountService<S>>>,
    actor: Actor,
    Json(payload): Json<AdopterProfileInput>,
) -> Response
where
    S: UserRepository + 'static,
{
    match service.setup_adopter_profile(&actor, payload) {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(error) => account_error_response(error),
    }
}
