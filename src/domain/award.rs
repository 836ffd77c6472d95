//! Immutable history facts written alongside the submission record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClassroomId, StudentId, SubmissionId, SubmissionStatus};

/// One approval event: which student earned how many points for which
/// submission. Written once, never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsAward {
    pub student_id: StudentId,
    pub submission_id: SubmissionId,
    pub points: u32,
    pub status: SubmissionStatus,
    pub awarded_at: DateTime<Utc>,
}

impl PointsAward {
    pub fn new(student_id: StudentId, submission_id: SubmissionId, points: u32) -> Self {
        Self {
            student_id,
            submission_id,
            points,
            status: SubmissionStatus::Approved,
            awarded_at: Utc::now(),
        }
    }
}

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReviewNeeded,
    SubmissionApproved,
    SubmissionRejected,
}

/// Recipient of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "target_type", content = "target_id")]
pub enum NotificationTarget {
    Classroom(ClassroomId),
    Student(StudentId),
}

/// Fire-and-forget notification record appended to the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub target: NotificationTarget,
    pub message: String,
    pub submission_id: SubmissionId,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        target: NotificationTarget,
        message: impl Into<String>,
        submission_id: SubmissionId,
    ) -> Self {
        Self {
            kind,
            target,
            message: message.into(),
            submission_id,
            read: false,
            created_at: Utc::now(),
        }
    }
}
