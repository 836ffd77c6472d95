//! In-memory store implementations.
//!
//! Used by the test suites and for local runs without a database. The
//! write-lock scope around each mutation gives the same serialization
//! guarantees the SQL implementations get from conditional updates.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    ClassroomId, Notification, PointsAward, StudentId, Submission, SubmissionId, SubmissionStatus,
};

use super::{EcoError, NotificationSink, PointsLedger, Result, SubmissionRepository};

/// In-memory document store for submissions and award history.
#[derive(Default)]
pub struct MemorySubmissionStore {
    submissions: RwLock<HashMap<SubmissionId, Submission>>,
    history: RwLock<Vec<PointsAward>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the award history, for assertions.
    pub async fn history(&self) -> Vec<PointsAward> {
        self.history.read().await.clone()
    }
}

#[async_trait]
impl SubmissionRepository for MemorySubmissionStore {
    async fn create(&self, submission: &Submission) -> Result<SubmissionId> {
        submission.validate()?;
        let mut store = self.submissions.write().await;
        store.insert(submission.id, submission.clone());
        Ok(submission.id)
    }

    async fn get(&self, id: SubmissionId) -> Result<Submission> {
        self.submissions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EcoError::SubmissionNotFound(id.0))
    }

    async fn update_review(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
        reviewer: &str,
        notes: &str,
        final_points: u32,
    ) -> Result<()> {
        // Status check and mutation under one write lock: the loser of a
        // concurrent double-review sees NotReviewable.
        let mut store = self.submissions.write().await;
        let submission = store
            .get_mut(&id)
            .ok_or(EcoError::SubmissionNotFound(id.0))?;

        if !submission.status.is_reviewable() {
            return Err(EcoError::NotReviewable {
                id: id.0,
                status: submission.status.as_str().to_string(),
            });
        }

        submission.status = status;
        submission.reviewed_at = Some(Utc::now());
        submission.reviewed_by = Some(reviewer.to_string());
        submission.reviewer_notes = notes.to_string();
        submission.final_points = final_points;
        Ok(())
    }

    async fn append_history(&self, award: &PointsAward) -> Result<()> {
        self.history.write().await.push(award.clone());
        Ok(())
    }

    async fn list_by_student(&self, student_id: &StudentId) -> Result<Vec<Submission>> {
        let store = self.submissions.read().await;
        let mut found: Vec<Submission> = store
            .values()
            .filter(|s| &s.student_id == student_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(found)
    }

    async fn list_by_filter(
        &self,
        classroom_ids: Option<Vec<ClassroomId>>,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Submission>> {
        let store = self.submissions.read().await;
        let mut found: Vec<Submission> = store
            .values()
            .filter(|s| match &classroom_ids {
                Some(ids) => s
                    .classroom_id
                    .as_ref()
                    .is_some_and(|c| ids.contains(c)),
                None => true,
            })
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(found)
    }
}

#[derive(Debug, Clone, Default)]
struct Balance {
    total_points: u32,
    tasks_completed: u32,
}

/// In-memory points ledger with the same atomicity contract as the SQL
/// implementation: the increment and rank read happen under one write lock.
#[derive(Default)]
pub struct MemoryPointsLedger {
    balances: RwLock<HashMap<StudentId, Balance>>,
}

impl MemoryPointsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a student balance.
    pub async fn put_balance(&self, student_id: StudentId, total_points: u32) {
        self.balances.write().await.insert(
            student_id,
            Balance {
                total_points,
                tasks_completed: 0,
            },
        );
    }

    pub async fn total_for(&self, student_id: &StudentId) -> Option<u32> {
        self.balances
            .read()
            .await
            .get(student_id)
            .map(|b| b.total_points)
    }
}

#[async_trait]
impl PointsLedger for MemoryPointsLedger {
    async fn award_points(
        &self,
        student_id: &StudentId,
        points: u32,
        _activity_type: &str,
        _activity_id: SubmissionId,
        _metadata: serde_json::Value,
    ) -> Result<(u32, u32)> {
        let mut balances = self.balances.write().await;
        let balance = balances.entry(student_id.clone()).or_default();
        balance.total_points += points;
        balance.tasks_completed += 1;
        let new_total = balance.total_points;

        let rank = balances
            .values()
            .filter(|b| b.total_points > new_total)
            .count() as u32
            + 1;
        Ok((new_total, rank))
    }
}

/// Collects notifications for inspection.
#[derive(Default)]
pub struct MemoryNotificationSink {
    sent: RwLock<Vec<Notification>>,
}

impl MemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl NotificationSink for MemoryNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<()> {
        self.sent.write().await.push(notification);
        Ok(())
    }
}

/// A ledger wrapper that fails every call, for exercising the
/// partial-success path.
pub struct FailingLedger;

#[async_trait]
impl PointsLedger for FailingLedger {
    async fn award_points(
        &self,
        student_id: &StudentId,
        _points: u32,
        _activity_type: &str,
        _activity_id: SubmissionId,
        _metadata: serde_json::Value,
    ) -> Result<(u32, u32)> {
        Err(EcoError::Ledger {
            student_id: student_id.to_string(),
            message: "ledger unavailable".to_string(),
        })
    }
}
