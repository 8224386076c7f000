use super::common::*;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::Json;
use serde_json::json;
use tower::ServiceExt;

use crate::accounts::{Role, UserRepository};
use crate::adoptions::router::approve_handler;
use crate::adoptions::ReviewNotes;
use crate::store::RecordStore;

fn token_for(platform: &TestPlatform, username: &str, role: Role) -> String {
    platform
        .accounts
        .register(registration(username, role))
        .expect("registers")
        .token
        .0
}

fn post(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).expect("json")))
        .expect("request")
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn submit_route_requires_a_known_token() {
    let (platform, _) = platform();
    let shelter = shelter(&platform, "harbor");
    let pet = list_pet(&platform, &shelter, "Biscuit");
    let payload = serde_json::to_value(submission(pet.id)).expect("serializable");

    let anonymous = platform
        .router()
        .oneshot(post("/api/v1/applications", None, payload.clone()))
        .await
        .expect("route executes");
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let forged = platform
        .router()
        .oneshot(post(
            "/api/v1/applications",
            Some("not-a-real-token"),
            payload.clone(),
        ))
        .await
        .expect("route executes");
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    let token = token_for(&platform, "alex", Role::Adopter);
    let created = platform
        .router()
        .oneshot(post("/api/v1/applications", Some(&token), payload))
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = read_json_body(created).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["kind"], "full");
    assert_eq!(body["pet"]["name"], "Biscuit");
    assert_eq!(body["can_be_approved"], true);
}

#[tokio::test]
async fn duplicate_quick_requests_are_conflicts() {
    let (platform, _) = platform();
    let shelter = shelter(&platform, "harbor");
    let pet = list_pet(&platform, &shelter, "Biscuit");
    let token = token_for(&platform, "alex", Role::Adopter);
    let uri = format!("/api/v1/pets/{}/requests", pet.id.0);
    let payload = serde_json::to_value(quick_request()).expect("serializable");

    let first = platform
        .router()
        .oneshot(post(&uri, Some(&token), payload.clone()))
        .await
        .expect("route executes");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = platform
        .router()
        .oneshot(post(&uri, Some(&token), payload))
        .await
        .expect("route executes");
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = read_json_body(second).await;
    assert_eq!(
        body["error"],
        "you already have an adoption request for Biscuit"
    );
}

#[tokio::test]
async fn review_routes_map_errors_to_statuses() {
    let (platform, _) = platform();
    let Scenario {
        shelter,
        application,
        ..
    } = scenario(&platform);
    let owner_token = platform
        .store
        .token_for_user(shelter.id)
        .expect("store readable")
        .expect("token issued")
        .0;
    let rival_token = token_for(&platform, "rival", Role::Shelter);
    let approve = format!("/api/v1/applications/{}/approve", application.0);

    let forbidden = platform
        .router()
        .oneshot(post(&approve, Some(&rival_token), json!({})))
        .await
        .expect("route executes");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let approved = platform
        .router()
        .oneshot(post(
            &approve,
            Some(&owner_token),
            json!({ "reviewer_notes": "Welcome!" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(approved.status(), StatusCode::OK);
    let body = read_json_body(approved).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["reviewer_notes"], "Welcome!");

    let again = platform
        .router()
        .oneshot(post(&approve, Some(&owner_token), json!({})))
        .await
        .expect("route executes");
    assert_eq!(again.status(), StatusCode::CONFLICT);
    let body = read_json_body(again).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["action"], "approve");

    let missing = platform
        .router()
        .oneshot(get("/api/v1/applications/999999", &owner_token))
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn approve_handler_accepts_a_missing_body() {
    let (platform, _) = platform();
    let Scenario {
        shelter,
        application,
        ..
    } = scenario(&platform);

    let response = approve_handler::<RecordStore, RecordingMailer>(
        State(platform.adoptions.clone()),
        shelter,
        Path(application.0),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = approve_handler::<RecordStore, RecordingMailer>(
        State(platform.adoptions.clone()),
        shelter,
        Path(application.0),
        Some(Json(ReviewNotes::default())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn applicants_read_their_application_detail() {
    let (platform, _) = platform();
    let Scenario {
        adopter,
        application,
        ..
    } = scenario(&platform);
    let token = platform
        .store
        .token_for_user(adopter.id)
        .expect("store readable")
        .expect("token issued")
        .0;
    let stranger = token_for(&platform, "sam", Role::Adopter);
    let uri = format!("/api/v1/applications/{}", application.0);

    let response = platform
        .router()
        .oneshot(get(&uri, &token))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["id"], application.0);
    assert_eq!(body["interviews"], json!([]));
    assert_eq!(body["documents"], json!([]));

    let response = platform
        .router()
        .oneshot(get(&uri, &stranger))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn public_sign_up_refuses_the_admin_role() {
    let (platform, _) = platform();
    let mut payload = serde_json::to_value(registration("root", Role::Adopter)).expect("json");
    payload["user_type"] = json!("admin");

    let response = platform
        .router()
        .oneshot(post("/api/v1/auth/register", None, payload))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["fields"][0]["field"], "role");
    assert!(platform
        .store
        .user_by_username("root")
        .expect("store readable")
        .is_none());
}
