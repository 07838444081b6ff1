//! `Valid<T>` inside an axum router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use nebula_binding::{Binder, Valid, Validate};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateUser {
    #[validate(required, email)]
    email_address: String,

    #[validate(gte = 18, lt = 130)]
    age: u8,
}

async fn create_user(Valid(user): Valid<CreateUser>) -> Json<CreateUser> {
    Json(user)
}

fn app() -> Router {
    Router::new()
        .route("/users", post(create_user))
        .with_state(Arc::new(Binder::new()))
}

async fn send(body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn valid_request_reaches_handler() {
    let (status, body) = send(r#"{"emailAddress": "ada@example.com", "age": 36}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"emailAddress": "ada@example.com", "age": 36}));
}

#[tokio::test]
async fn invalid_request_is_unprocessable() {
    let (status, body) = send(r#"{"emailAddress": "ada", "age": 12}"#).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({"fields": {"emailAddress": "email", "age": "gte=18"}})
    );
}

#[tokio::test]
async fn malformed_request_is_bad_request() {
    let (status, body) = send(r#"{"emailAddress": "ada@example.com", "age": "old"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
