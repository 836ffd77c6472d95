//! Submission workflow orchestrator.
//!
//! Composes the oracle, decision engine, submission repository, points
//! ledger, and notification sink into the end-to-end flow:
//! submit → verify → decide → persist → award → notify.
//!
//! Consistency protocol across the two stores: the submission record is
//! written first and is the source of truth for what was decided. The
//! ledger award is a derived side effect keyed by the submission id, so a
//! failed award leaves a reconcilable gap rather than a lost decision. No
//! distributed transaction exists or is attempted.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::decision::decide;
use crate::domain::{
    ActionType, ClassroomId, EvidenceBundle, EvidenceImage, Notification, NotificationKind,
    NotificationTarget, PointsAward, ReviewAction, StudentId, Submission, SubmissionId,
    SubmissionStatus, VerificationResult, AUTOMATED_REVIEWER, MAX_AWARD_POINTS,
};
use crate::infra::{EcoError, NotificationSink, PointsLedger, Result, SubmissionRepository};
use crate::oracle::VerificationOracle;

/// Activity tag the ledger records for eco-action awards.
pub const ACTIVITY_ECO_ACTION: &str = "eco_action";

/// A validated submit request.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub student_id: StudentId,
    pub classroom_id: Option<ClassroomId>,
    pub action_type: ActionType,
    pub description: String,
    pub location: Option<String>,
    pub action_date: Option<String>,
    pub estimated_impact: Option<String>,
    pub images: Vec<EvidenceImage>,
}

impl SubmitRequest {
    fn validate(&self) -> Result<()> {
        if self.student_id.as_str().trim().is_empty() {
            return Err(EcoError::Validation("student_id is required".to_string()));
        }
        if self.action_type.as_str().trim().is_empty() {
            return Err(EcoError::Validation("action_type is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(EcoError::Validation("description is required".to_string()));
        }
        if self.images.is_empty() {
            return Err(EcoError::Validation(
                "at least one image is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// A human review request.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub submission_id: SubmissionId,
    pub action: ReviewAction,
    /// Required when approving.
    pub points: Option<u32>,
    pub reviewer: String,
    pub notes: Option<String>,
}

/// What the caller learns from a submit: the decided status plus whether
/// points already landed in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
    pub auto_approved: bool,
    /// True when an auto-award reached the ledger. False either because no
    /// award was due, or because the ledger call failed (see
    /// `award_pending`).
    pub points_awarded: bool,
    /// An award was due but the ledger call failed; the submission id is
    /// the replay key for reconciliation.
    pub award_pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_rank: Option<u32>,
    pub verification: VerificationResult,
}

/// What the caller learns from a review: the updated submission plus, on
/// approval, whether the ledger increment landed or is pending
/// reconciliation.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub submission: Submission,
    pub points_awarded: bool,
    /// An award was due but the ledger call failed; the submission id is
    /// the replay key for reconciliation.
    pub award_pending: bool,
    pub new_total: Option<u32>,
    pub new_rank: Option<u32>,
}

/// Orchestrates the submission state machine over injected collaborators.
pub struct SubmissionWorkflow {
    oracle: Arc<dyn VerificationOracle>,
    repository: Arc<dyn SubmissionRepository>,
    ledger: Arc<dyn PointsLedger>,
    notifications: Arc<dyn NotificationSink>,
}

impl SubmissionWorkflow {
    pub fn new(
        oracle: Arc<dyn VerificationOracle>,
        repository: Arc<dyn SubmissionRepository>,
        ledger: Arc<dyn PointsLedger>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            oracle,
            repository,
            ledger,
            notifications,
        }
    }

    /// Handle one evidence submission end to end.
    ///
    /// Always returns a decided status; an oracle outage shows up as an
    /// `ai_flagged` submission, never an error.
    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmitOutcome> {
        request.validate()?;

        let evidence = EvidenceBundle {
            action_type: request.action_type.clone(),
            description: request.description.clone(),
            location: request.location.clone(),
            action_date: request.action_date.clone(),
            estimated_impact: request.estimated_impact.clone(),
            images: request.images.clone(),
        };

        let verification = self.oracle.verify(&evidence).await;
        let decision = decide(&verification);

        let now = Utc::now();
        let submission = Submission {
            id: SubmissionId::new(),
            student_id: request.student_id.clone(),
            classroom_id: request.classroom_id.clone(),
            action_type: request.action_type,
            description: request.description,
            location: request.location,
            action_date: request.action_date,
            estimated_impact: request.estimated_impact,
            images: request.images,
            status: decision.status,
            auto_approved: decision.auto_approved,
            verification: verification.clone(),
            submitted_at: now,
            reviewed_at: decision.auto_approved.then_some(now),
            reviewed_by: decision
                .auto_approved
                .then(|| AUTOMATED_REVIEWER.to_string()),
            reviewer_notes: String::new(),
            final_points: decision.award_points,
        };

        // The decision is durable once this write lands; everything after
        // is replayable from the record.
        let id = self.repository.create(&submission).await?;
        info!(
            submission_id = %id,
            status = %decision.status,
            auto_approved = decision.auto_approved,
            "submission decided"
        );

        let mut outcome = SubmitOutcome {
            submission_id: id,
            status: decision.status,
            auto_approved: decision.auto_approved,
            points_awarded: false,
            award_pending: false,
            new_total: None,
            new_rank: None,
            verification,
        };

        if decision.auto_approved {
            self.repository
                .append_history(&PointsAward::new(
                    submission.student_id.clone(),
                    id,
                    decision.award_points,
                ))
                .await?;

            match self
                .ledger
                .award_points(
                    &submission.student_id,
                    decision.award_points,
                    ACTIVITY_ECO_ACTION,
                    id,
                    serde_json::json!({ "action_type": submission.action_type.as_str() }),
                )
                .await
            {
                Ok((total, rank)) => {
                    outcome.points_awarded = true;
                    outcome.new_total = Some(total);
                    outcome.new_rank = Some(rank);
                }
                Err(e) => {
                    // Partial success: the approval is committed, the award
                    // is not. Reconcilable by submission id.
                    warn!(
                        submission_id = %id,
                        student_id = %submission.student_id,
                        error = %e,
                        "auto-award failed; ledger increment pending reconciliation"
                    );
                    outcome.award_pending = true;
                }
            }
        } else if decision.status == SubmissionStatus::AiFlagged {
            if let Some(classroom) = &submission.classroom_id {
                self.send(Notification::new(
                    NotificationKind::ReviewNeeded,
                    NotificationTarget::Classroom(classroom.clone()),
                    format!(
                        "A {} submission needs review",
                        submission.action_type.as_str()
                    ),
                    id,
                ))
                .await;
            }
        }

        Ok(outcome)
    }

    /// Apply a human review action. The repository's conditional update is
    /// the serialization point; a concurrent second review surfaces as a
    /// conflict.
    pub async fn review(&self, request: ReviewRequest) -> Result<ReviewOutcome> {
        if request.reviewer.trim().is_empty() {
            return Err(EcoError::Validation("reviewer is required".to_string()));
        }

        let notes = request.notes.unwrap_or_default();

        match request.action {
            ReviewAction::Approve => {
                let points = request.points.ok_or_else(|| {
                    EcoError::Validation("points are required when approving".to_string())
                })?;
                if points > MAX_AWARD_POINTS {
                    return Err(EcoError::Validation(format!(
                        "points must not exceed {MAX_AWARD_POINTS}"
                    )));
                }

                self.repository
                    .update_review(
                        request.submission_id,
                        SubmissionStatus::Approved,
                        &request.reviewer,
                        &notes,
                        points,
                    )
                    .await?;

                let submission = self.repository.get(request.submission_id).await?;

                self.repository
                    .append_history(&PointsAward::new(
                        submission.student_id.clone(),
                        submission.id,
                        points,
                    ))
                    .await?;

                let mut outcome = ReviewOutcome {
                    submission,
                    points_awarded: false,
                    award_pending: false,
                    new_total: None,
                    new_rank: None,
                };

                match self
                    .ledger
                    .award_points(
                        &outcome.submission.student_id,
                        points,
                        ACTIVITY_ECO_ACTION,
                        outcome.submission.id,
                        serde_json::json!({
                            "action_type": outcome.submission.action_type.as_str(),
                            "reviewer": request.reviewer,
                        }),
                    )
                    .await
                {
                    Ok((total, rank)) => {
                        outcome.points_awarded = true;
                        outcome.new_total = Some(total);
                        outcome.new_rank = Some(rank);
                    }
                    Err(e) => {
                        // Same partial-success contract as the auto-award
                        // path: the approval is committed, the increment is
                        // not, and the caller can see that.
                        warn!(
                            submission_id = %outcome.submission.id,
                            error = %e,
                            "review award failed; ledger increment pending reconciliation"
                        );
                        outcome.award_pending = true;
                    }
                }

                self.send(Notification::new(
                    NotificationKind::SubmissionApproved,
                    NotificationTarget::Student(outcome.submission.student_id.clone()),
                    format!("Your submission was approved for {points} points"),
                    outcome.submission.id,
                ))
                .await;

                Ok(outcome)
            }
            ReviewAction::Reject => {
                self.repository
                    .update_review(
                        request.submission_id,
                        SubmissionStatus::Rejected,
                        &request.reviewer,
                        &notes,
                        0,
                    )
                    .await?;

                let submission = self.repository.get(request.submission_id).await?;

                let reason = if notes.is_empty() {
                    "Your submission was not approved".to_string()
                } else {
                    format!("Your submission was not approved: {notes}")
                };
                self.send(Notification::new(
                    NotificationKind::SubmissionRejected,
                    NotificationTarget::Student(submission.student_id.clone()),
                    reason,
                    submission.id,
                ))
                .await;

                Ok(ReviewOutcome {
                    submission,
                    points_awarded: false,
                    award_pending: false,
                    new_total: None,
                    new_rank: None,
                })
            }
        }
    }

    /// Fire-and-forget: a dropped notification is logged, never an error.
    async fn send(&self, notification: Notification) {
        if let Err(e) = self.notifications.notify(notification).await {
            warn!(error = %e, "notification append failed");
        }
    }
}
