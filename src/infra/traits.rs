//! Trait definitions for the EcoProof stores.
//!
//! The orchestrator only ever talks to these traits; concrete Postgres and
//! in-memory implementations live beside them.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{
    ClassroomId, Notification, PointsAward, StudentId, Submission, SubmissionId, SubmissionStatus,
};

use super::Result;

/// Append/update interface over the document store for submissions and
/// award history.
///
/// Invariant: submission records are never deleted (audit trail), and a
/// review update succeeds at most once per submission.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Persist a freshly created submission.
    async fn create(&self, submission: &Submission) -> Result<SubmissionId>;

    /// Fetch a submission by id.
    async fn get(&self, id: SubmissionId) -> Result<Submission>;

    /// Apply a human review outcome.
    ///
    /// Conditional on the current status being reviewable; this check is the
    /// serialization point for concurrent double-review attempts. The loser
    /// observes [`super::EcoError::NotReviewable`], never a silent overwrite.
    async fn update_review(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
        reviewer: &str,
        notes: &str,
        final_points: u32,
    ) -> Result<()>;

    /// Append an immutable award history record.
    async fn append_history(&self, award: &PointsAward) -> Result<()>;

    /// All submissions by one student, newest first.
    async fn list_by_student(&self, student_id: &StudentId) -> Result<Vec<Submission>>;

    /// Submissions filtered by classroom membership and/or status,
    /// newest first.
    async fn list_by_filter(
        &self,
        classroom_ids: Option<Vec<ClassroomId>>,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Submission>>;
}

/// Interface over the relational store holding authoritative point totals.
///
/// The orchestrator never writes balances directly; it only issues
/// increments. `activity_id` (the submission id) is the natural
/// deduplication key for replay after a partial failure.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PointsLedger: Send + Sync {
    /// Atomically add `points` to the student's total.
    ///
    /// Two concurrent awards for the same student must both be reflected in
    /// the final total; lost updates are a ledger bug, not a caller concern.
    /// Returns the new total and the student's recomputed rank.
    async fn award_points(
        &self,
        student_id: &StudentId,
        points: u32,
        activity_type: &str,
        activity_id: SubmissionId,
        metadata: serde_json::Value,
    ) -> Result<(u32, u32)>;
}

/// Fire-and-forget notification append.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<()>;
}
