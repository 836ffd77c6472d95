//! REST API endpoints for EcoProof.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::api::types::{
    ListQuery, ReviewBody, ReviewResponse, SubmissionListResponse, SubmissionView, SubmitBody,
};
use crate::domain::{
    ActionType, ClassroomId, EvidenceImage, ReviewAction, StudentId, SubmissionId,
    SubmissionStatus,
};
use crate::infra::EcoError;
use crate::server::AppState;
use crate::workflow::{ReviewRequest, SubmitOutcome, SubmitRequest};

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/submissions", post(submit_evidence))
        .route("/v1/submissions", get(list_submissions))
        .route("/v1/submissions/:id", get(get_submission))
        .route("/v1/submissions/:id/review", post(review_submission))
        .route(
            "/v1/students/:student_id/submissions",
            get(list_student_submissions),
        )
        .route("/v1/health", get(health))
}

fn error_response(e: EcoError) -> (StatusCode, String) {
    let status = match &e {
        EcoError::Validation(_) | EcoError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        EcoError::SubmissionNotFound(_) | EcoError::StudentNotFound(_) => StatusCode::NOT_FOUND,
        EcoError::NotReviewable { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// POST /api/v1/submissions - submit evidence for verification.
///
/// Always responds with the decided status; an oracle outage shows up as
/// `ai_flagged`, never a 5xx.
async fn submit_evidence(
    State(state): State<AppState>,
    Json(body): Json<SubmitBody>,
) -> Result<(StatusCode, Json<SubmitOutcome>), (StatusCode, String)> {
    let images = body
        .images
        .iter()
        .map(|uri| EvidenceImage::from_data_uri(uri))
        .collect::<Result<Vec<_>, _>>()
        .map_err(error_response)?;

    let request = SubmitRequest {
        student_id: StudentId::new(body.student_id.unwrap_or_default()),
        classroom_id: body.classroom_id.map(ClassroomId::new),
        action_type: ActionType::new(body.action_type.unwrap_or_default()),
        description: body.description.unwrap_or_default(),
        location: body.location,
        action_date: body.action_date,
        estimated_impact: body.estimated_impact,
        images,
    };

    let outcome = state
        .workflow
        .submit(request)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/v1/submissions/:id/review - apply a human review decision.
async fn review_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReviewBody>,
) -> Result<Json<ReviewResponse>, (StatusCode, String)> {
    let action =
        ReviewAction::parse(body.action.as_deref().unwrap_or_default()).map_err(error_response)?;

    let request = ReviewRequest {
        submission_id: SubmissionId::from_uuid(id),
        action,
        points: body.points,
        reviewer: body.reviewer.unwrap_or_default(),
        notes: body.notes,
    };

    let outcome = state
        .workflow
        .review(request)
        .await
        .map_err(error_response)?;

    Ok(Json(ReviewResponse {
        submission: outcome.submission.into(),
        points_awarded: outcome.points_awarded,
        award_pending: outcome.award_pending,
        new_total: outcome.new_total,
        new_rank: outcome.new_rank,
    }))
}

/// GET /api/v1/submissions/:id
async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionView>, (StatusCode, String)> {
    let submission = state
        .repository
        .get(SubmissionId::from_uuid(id))
        .await
        .map_err(error_response)?;
    Ok(Json(submission.into()))
}

/// GET /api/v1/submissions?classroom_id=a,b&status=pending_review
async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<SubmissionListResponse>, (StatusCode, String)> {
    let classrooms = query.classroom_id.map(|raw| {
        raw.split(',')
            .filter(|s| !s.is_empty())
            .map(ClassroomId::new)
            .collect::<Vec<_>>()
    });

    let status = query
        .status
        .as_deref()
        .map(SubmissionStatus::parse)
        .transpose()
        .map_err(error_response)?;

    let submissions = state
        .repository
        .list_by_filter(classrooms, status)
        .await
        .map_err(error_response)?;

    let views: Vec<SubmissionView> = submissions.into_iter().map(Into::into).collect();
    Ok(Json(SubmissionListResponse {
        count: views.len(),
        submissions: views,
    }))
}

/// GET /api/v1/students/:student_id/submissions
async fn list_student_submissions(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<SubmissionListResponse>, (StatusCode, String)> {
    let submissions = state
        .repository
        .list_by_student(&StudentId::new(student_id))
        .await
        .map_err(error_response)?;

    let views: Vec<SubmissionView> = submissions.into_iter().map(Into::into).collect();
    Ok(Json(SubmissionListResponse {
        count: views.len(),
        submissions: views,
    }))
}

/// GET /api/v1/health
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "ecoproof",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
