//! Request and response DTOs for the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Submission, VerificationResult};

/// Body for `POST /api/v1/submissions`.
///
/// Images arrive as data-URI strings (or bare base64); they are decoded at
/// this boundary. Required fields are optional here so that an absent
/// field reaches the workflow's validation and reports a 400, the same as
/// a blank one.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub classroom_id: Option<String>,
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub action_date: Option<String>,
    #[serde(default)]
    pub estimated_impact: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Body for `POST /api/v1/submissions/:id/review`.
#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    /// "approve" or "reject"; anything else is a 400.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub reviewer: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query parameters for `GET /api/v1/submissions`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Comma-separated classroom ids.
    #[serde(default)]
    pub classroom_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A submission as returned to clients. Image payloads are elided; only
/// the count survives.
#[derive(Debug, Serialize)]
pub struct SubmissionView {
    pub id: Uuid,
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom_id: Option<String>,
    pub action_type: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_impact: Option<String>,
    pub image_count: usize,
    pub status: String,
    pub auto_approved: bool,
    pub verification: VerificationResult,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    pub reviewer_notes: String,
    pub final_points: u32,
}

impl From<Submission> for SubmissionView {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id.0,
            student_id: s.student_id.0,
            classroom_id: s.classroom_id.map(|c| c.0),
            action_type: s.action_type.0,
            description: s.description,
            location: s.location,
            action_date: s.action_date,
            estimated_impact: s.estimated_impact,
            image_count: s.images.len(),
            status: s.status.as_str().to_string(),
            auto_approved: s.auto_approved,
            verification: s.verification,
            submitted_at: s.submitted_at,
            reviewed_at: s.reviewed_at,
            reviewed_by: s.reviewed_by,
            reviewer_notes: s.reviewer_notes,
            final_points: s.final_points,
        }
    }
}

/// Response for the review endpoint: the updated submission plus the
/// ledger side of an approval.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub submission: SubmissionView,
    pub points_awarded: bool,
    /// True when the approval committed but the ledger increment failed
    /// and awaits reconciliation.
    pub award_pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_rank: Option<u32>,
}

/// Response for list endpoints.
#[derive(Debug, Serialize)]
pub struct SubmissionListResponse {
    pub submissions: Vec<SubmissionView>,
    pub count: usize,
}
