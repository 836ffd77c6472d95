//! Submission record and its lifecycle.
//!
//! A submission is created exactly once with its initial status decided by
//! the decision engine, mutated at most once by a human review, and never
//! deleted. It is the source of truth for "what was decided" when the
//! ledger side of an award needs reconciling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActionType, ClassroomId, EvidenceImage, StudentId, SubmissionId};
use crate::infra::{EcoError, Result};

/// Reviewer sentinel recorded on auto-approved submissions.
pub const AUTOMATED_REVIEWER: &str = "ai_system";

/// Largest award a single submission can carry. Oracle verdicts and human
/// reviews above this are rejected at the boundary, which keeps every
/// downstream increment far from integer limits.
pub const MAX_AWARD_POINTS: u32 = 10_000;

/// Lifecycle status of a submission.
///
/// Initial status is one of the first three, chosen once at creation.
/// `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Verified but below the auto-approval bar; awaiting human review.
    PendingReview,
    /// The verifier rejected the evidence or had low confidence.
    AiFlagged,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::PendingReview => "pending_review",
            SubmissionStatus::AiFlagged => "ai_flagged",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    /// Parse a wire/storage string. Unknown values are rejected at the
    /// boundary rather than passed through.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending_review" => Ok(SubmissionStatus::PendingReview),
            "ai_flagged" => Ok(SubmissionStatus::AiFlagged),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            other => Err(EcoError::InvalidStatus(other.to_string())),
        }
    }

    /// Whether a human review action may still be applied.
    pub fn is_reviewable(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::PendingReview | SubmissionStatus::AiFlagged
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Approved | SubmissionStatus::Rejected
        )
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human review action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            other => Err(EcoError::Validation(format!(
                "invalid review action: {other}"
            ))),
        }
    }
}

/// Verdict returned by the verification oracle (or its fallback).
///
/// Immutable once attached to a submission; never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Whether the oracle believes the evidence shows the claimed action.
    pub verified: bool,
    /// Oracle confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Free-text explanation of the verdict.
    pub reasoning: String,
    /// Points the oracle suggests awarding on approval.
    pub suggested_points: u32,
    /// Specific problems found with the evidence, possibly empty.
    #[serde(default)]
    pub flagged_issues: Vec<String>,
}

/// One piece of evidence submitted for one eco-action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub student_id: StudentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom_id: Option<ClassroomId>,
    pub action_type: ActionType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_impact: Option<String>,
    /// Evidence images, non-empty at creation.
    pub images: Vec<EvidenceImage>,
    pub status: SubmissionStatus,
    pub auto_approved: bool,
    pub verification: VerificationResult,
    pub submitted_at: DateTime<Utc>,
    /// Set when the submission reaches a terminal status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Human reviewer identity, or [`AUTOMATED_REVIEWER`] when auto-approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub reviewer_notes: String,
    /// Awarded points; zero until approved.
    #[serde(default)]
    pub final_points: u32,
}

impl Submission {
    /// Check the record invariants. Called before persisting.
    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(EcoError::Validation(
                "submission must carry at least one image".to_string(),
            ));
        }
        if self.final_points > 0 && self.status != SubmissionStatus::Approved {
            return Err(EcoError::Validation(format!(
                "final_points set on non-approved submission {}",
                self.id
            )));
        }
        if self.status.is_terminal() != self.reviewed_at.is_some() {
            return Err(EcoError::Validation(format!(
                "reviewed_at must be set exactly when status is terminal ({})",
                self.status
            )));
        }
        let automated = self.reviewed_by.as_deref() == Some(AUTOMATED_REVIEWER);
        if automated != self.auto_approved {
            return Err(EcoError::Validation(
                "reviewed_by sentinel inconsistent with auto_approved flag".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EvidenceImage;

    fn base_submission() -> Submission {
        Submission {
            id: SubmissionId::new(),
            student_id: StudentId::new("stu-1"),
            classroom_id: None,
            action_type: ActionType::from("recycling"),
            description: "sorted bottles".to_string(),
            location: None,
            action_date: None,
            estimated_impact: None,
            images: vec![EvidenceImage::new(vec![0xff, 0xd8], "image/jpeg")],
            status: SubmissionStatus::PendingReview,
            auto_approved: false,
            verification: VerificationResult {
                verified: true,
                confidence: 0.8,
                reasoning: "looks plausible".to_string(),
                suggested_points: 50,
                flagged_issues: vec![],
            },
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
            reviewer_notes: String::new(),
            final_points: 0,
        }
    }

    #[test]
    fn status_parse_round_trips() {
        for s in ["pending_review", "ai_flagged", "approved", "rejected"] {
            assert_eq!(SubmissionStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(SubmissionStatus::parse("in_review").is_err());
    }

    #[test]
    fn reviewable_states() {
        assert!(SubmissionStatus::PendingReview.is_reviewable());
        assert!(SubmissionStatus::AiFlagged.is_reviewable());
        assert!(!SubmissionStatus::Approved.is_reviewable());
        assert!(!SubmissionStatus::Rejected.is_reviewable());
    }

    #[test]
    fn review_action_parse_rejects_unknown() {
        assert_eq!(ReviewAction::parse("approve").unwrap(), ReviewAction::Approve);
        assert_eq!(ReviewAction::parse("reject").unwrap(), ReviewAction::Reject);
        assert!(ReviewAction::parse("approved").is_err());
    }

    #[test]
    fn validate_accepts_well_formed_pending() {
        assert!(base_submission().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_images() {
        let mut s = base_submission();
        s.images.clear();
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_points_without_approval() {
        let mut s = base_submission();
        s.final_points = 10;
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_terminal_without_reviewed_at() {
        let mut s = base_submission();
        s.status = SubmissionStatus::Rejected;
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_ties_sentinel_to_auto_approved() {
        let mut s = base_submission();
        s.reviewed_by = Some(AUTOMATED_REVIEWER.to_string());
        // auto_approved still false
        assert!(s.validate().is_err());
    }
}
