//! PostgreSQL notification sink.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::domain::{Notification, NotificationKind, NotificationTarget};
use crate::infra::{NotificationSink, Result};

/// Appends notification rows; readers are out of scope here.
pub struct PgNotificationSink {
    pool: PgPool,
}

impl PgNotificationSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn kind_str(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::ReviewNeeded => "review_needed",
        NotificationKind::SubmissionApproved => "submission_approved",
        NotificationKind::SubmissionRejected => "submission_rejected",
    }
}

#[async_trait]
impl NotificationSink for PgNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<()> {
        let (target_type, target_id) = match &notification.target {
            NotificationTarget::Classroom(c) => ("classroom", c.as_str().to_string()),
            NotificationTarget::Student(s) => ("student", s.as_str().to_string()),
        };

        sqlx::query(
            r#"
            INSERT INTO notifications
                (kind, target_type, target_id, message, submission_id, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(kind_str(notification.kind))
        .bind(target_type)
        .bind(target_id)
        .bind(&notification.message)
        .bind(notification.submission_id.0)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
