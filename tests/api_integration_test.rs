//! REST API integration tests for EcoProof.
//!
//! Runs the full router over in-memory stores and a scripted oracle; no
//! database required.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use ecoproof::server::app;

use common::*;

async fn send(
    state: ecoproof::server::AppState,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(json_body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };
    (status, value)
}

fn submit_body() -> Value {
    json!({
        "student_id": "stu-api",
        "classroom_id": "class-api",
        "action_type": "recycling",
        "description": "sorted a week of recycling",
        "images": [test_image_uri()],
    })
}

#[tokio::test]
async fn health_endpoint_responds() {
    let h = TestHarness::new(verdict(true, 0.95, 100));
    let (status, body) = send(h.app_state(), Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "ecoproof");
}

#[tokio::test]
async fn submit_returns_decided_status_and_award() {
    let h = TestHarness::new(verdict(true, 0.95, 150));
    let (status, body) = send(
        h.app_state(),
        Method::POST,
        "/api/v1/submissions",
        Some(submit_body()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["auto_approved"], true);
    assert_eq!(body["points_awarded"], true);
    assert_eq!(body["new_total"], 150);
}

#[tokio::test]
async fn submit_without_images_is_a_validation_error() {
    let h = TestHarness::new(verdict(true, 0.95, 150));
    let mut body = submit_body();
    body["images"] = json!([]);

    let (status, _) = send(h.app_state(), Method::POST, "/api/v1/submissions", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_with_blank_description_is_a_validation_error() {
    let h = TestHarness::new(verdict(true, 0.95, 150));
    let mut body = submit_body();
    body["description"] = json!("   ");

    let (status, _) = send(h.app_state(), Method::POST, "/api/v1/submissions", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_with_undecodable_image_is_a_validation_error() {
    let h = TestHarness::new(verdict(true, 0.95, 150));
    let mut body = submit_body();
    body["images"] = json!(["data:image/png;base64,@@not-base64@@"]);

    let (status, _) = send(h.app_state(), Method::POST, "/api/v1/submissions", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_round_trip_through_the_api() {
    let h = TestHarness::new(verdict(true, 0.8, 90));
    let (_, submitted) = send(
        h.app_state(),
        Method::POST,
        "/api/v1/submissions",
        Some(submit_body()),
    )
    .await;
    assert_eq!(submitted["status"], "pending_review");
    let id = submitted["submission_id"].as_str().unwrap().to_string();

    let (status, reviewed) = send(
        h.app_state(),
        Method::POST,
        &format!("/api/v1/submissions/{id}/review"),
        Some(json!({
            "action": "approve",
            "points": 85,
            "reviewer": "teacher-api",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["submission"]["status"], "approved");
    assert_eq!(reviewed["submission"]["final_points"], 85);
    assert_eq!(reviewed["submission"]["reviewed_by"], "teacher-api");
    assert_eq!(reviewed["points_awarded"], true);
    assert_eq!(reviewed["award_pending"], false);
    assert_eq!(reviewed["new_total"], 85);
}

#[tokio::test]
async fn submit_with_absent_required_fields_is_a_validation_error() {
    let h = TestHarness::new(verdict(true, 0.95, 150));

    // No student_id at all, not just a blank one.
    let (status, _) = send(
        h.app_state(),
        Method::POST,
        "/api/v1/submissions",
        Some(json!({
            "action_type": "recycling",
            "description": "sorted a week of recycling",
            "images": [test_image_uri()],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Same for a body that is missing everything.
    let (status, _) = send(h.app_state(), Method::POST, "/api/v1/submissions", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_with_absent_action_is_a_validation_error() {
    let h = TestHarness::new(verdict(true, 0.8, 90));
    let (_, submitted) = send(
        h.app_state(),
        Method::POST,
        "/api/v1/submissions",
        Some(submit_body()),
    )
    .await;
    let id = submitted["submission_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        h.app_state(),
        Method::POST,
        &format!("/api/v1/submissions/{id}/review"),
        Some(json!({ "reviewer": "teacher-api" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_points_above_the_cap_are_rejected() {
    let h = TestHarness::new(verdict(true, 0.8, 90));
    let (_, submitted) = send(
        h.app_state(),
        Method::POST,
        "/api/v1/submissions",
        Some(submit_body()),
    )
    .await;
    let id = submitted["submission_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        h.app_state(),
        Method::POST,
        &format!("/api/v1/submissions/{id}/review"),
        Some(json!({
            "action": "approve",
            "points": 3_000_000_000u32,
            "reviewer": "teacher-api",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_with_unknown_action_is_rejected() {
    let h = TestHarness::new(verdict(true, 0.8, 90));
    let (_, submitted) = send(
        h.app_state(),
        Method::POST,
        "/api/v1/submissions",
        Some(submit_body()),
    )
    .await;
    let id = submitted["submission_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        h.app_state(),
        Method::POST,
        &format!("/api/v1/submissions/{id}/review"),
        Some(json!({ "action": "escalate", "reviewer": "teacher-api" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_of_missing_submission_is_not_found() {
    let h = TestHarness::new(verdict(true, 0.8, 90));
    let (status, _) = send(
        h.app_state(),
        Method::POST,
        &format!("/api/v1/submissions/{}/review", Uuid::new_v4()),
        Some(json!({ "action": "reject", "reviewer": "teacher-api" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn double_review_is_a_conflict() {
    let h = TestHarness::new(verdict(true, 0.8, 90));
    let (_, submitted) = send(
        h.app_state(),
        Method::POST,
        "/api/v1/submissions",
        Some(submit_body()),
    )
    .await;
    let id = submitted["submission_id"].as_str().unwrap().to_string();
    let review = json!({ "action": "approve", "points": 50, "reviewer": "teacher-1" });

    let (first, _) = send(
        h.app_state(),
        Method::POST,
        &format!("/api/v1/submissions/{id}/review"),
        Some(review.clone()),
    )
    .await;
    assert_eq!(first, StatusCode::OK);

    let (second, _) = send(
        h.app_state(),
        Method::POST,
        &format!("/api/v1/submissions/{id}/review"),
        Some(review),
    )
    .await;
    assert_eq!(second, StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_endpoints_filter_by_status() {
    let h = TestHarness::new(verdict(true, 0.5, 20));
    send(
        h.app_state(),
        Method::POST,
        "/api/v1/submissions",
        Some(submit_body()),
    )
    .await;

    let (status, body) = send(
        h.app_state(),
        Method::GET,
        "/api/v1/submissions?classroom_id=class-api&status=ai_flagged",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["submissions"][0]["status"], "ai_flagged");
    // Image payloads are elided from views.
    assert_eq!(body["submissions"][0]["image_count"], 1);

    let (status, body) = send(
        h.app_state(),
        Method::GET,
        "/api/v1/submissions?status=approved",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (status, _) = send(
        h.app_state(),
        Method::GET,
        "/api/v1/submissions?status=bogus",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn student_listing_returns_their_submissions() {
    let h = TestHarness::new(verdict(true, 0.8, 20));
    send(
        h.app_state(),
        Method::POST,
        "/api/v1/submissions",
        Some(submit_body()),
    )
    .await;

    let (status, body) = send(
        h.app_state(),
        Method::GET,
        "/api/v1/students/stu-api/submissions",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["submissions"][0]["student_id"], "stu-api");
}
