// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation and degraded-read tests.
//!
//! Run against an offline database: anything that needs a read must
//! degrade to an empty result or fail with a JSON error body.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
};
use serde_json::Value;
use tower::ServiceExt;

mod common;

async fn send(method: &str, uri: &str, body: Option<&str>) -> Response {
    let (app, _) = common::create_test_app();
    let token = common::create_test_jwt("ada@example.org");

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_leaderboard_metric() {
    let response = send("GET", "/api/leaderboard?metric=karma", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "bad_request");
    assert!(body["details"].as_str().unwrap().contains("karma"));
}

#[tokio::test]
async fn test_leaderboard_degrades_to_empty() {
    let response = send("GET", "/api/leaderboard?metric=points", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["metric"], "points");
    assert_eq!(body["entries"], serde_json::json!([]));
    assert_eq!(body["stats"]["active_users"], 0);
    assert_eq!(body["stats"]["schools"], 0);
}

#[tokio::test]
async fn test_leaderboard_defaults_to_hours() {
    let response = send("GET", "/api/leaderboard", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["metric"], "hours");
}

#[tokio::test]
async fn test_challenge_lists_degrade_to_empty() {
    for uri in ["/api/challenges", "/api/leaderboards"] {
        let response = send("GET", uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(json_body(response).await, serde_json::json!([]), "{}", uri);
    }
}

#[tokio::test]
async fn test_malformed_hours_body() {
    let response = send(
        "POST",
        "/api/activities/activity-1/hours",
        Some(r#"{"hours": "lots"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_content_type() {
    let (app, _) = common::create_test_app();
    let token = common::create_test_jwt("ada@example.org");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/projects")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::from(r#"{"title": "x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_database_failure_hides_details() {
    let response = send("GET", "/api/me", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let response = send("GET", "/api/leaderboard", None).await;
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");
}
