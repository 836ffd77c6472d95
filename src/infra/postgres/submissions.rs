//! PostgreSQL submission repository.
//!
//! Submissions are stored as JSONB documents with the id, owner, and status
//! duplicated into indexed columns. The review update is a conditional
//! UPDATE guarded by the current status; that single statement is the
//! serialization point for concurrent double-review attempts.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::FromRow;

use crate::domain::{
    ClassroomId, PointsAward, StudentId, Submission, SubmissionId, SubmissionStatus,
};
use crate::infra::{EcoError, Result, SubmissionRepository};

/// PostgreSQL-backed submission repository.
pub struct PgSubmissionStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct SubmissionRow {
    doc: serde_json::Value,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create from connection string.
    pub async fn from_url(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn decode_row(row: SubmissionRow) -> Result<Submission> {
        serde_json::from_value(row.doc)
            .map_err(|e| EcoError::Internal(format!("invalid submission document: {e}")))
    }
}

#[async_trait]
impl SubmissionRepository for PgSubmissionStore {
    async fn create(&self, submission: &Submission) -> Result<SubmissionId> {
        submission.validate()?;

        let doc = serde_json::to_value(submission)
            .map_err(|e| EcoError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO submissions (id, student_id, classroom_id, status, submitted_at, doc)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(submission.id.0)
        .bind(submission.student_id.as_str())
        .bind(submission.classroom_id.as_ref().map(|c| c.as_str()))
        .bind(submission.status.as_str())
        .bind(submission.submitted_at)
        .bind(doc)
        .execute(&self.pool)
        .await?;

        Ok(submission.id)
    }

    async fn get(&self, id: SubmissionId) -> Result<Submission> {
        let row: Option<SubmissionRow> =
            sqlx::query_as("SELECT doc FROM submissions WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Self::decode_row(row),
            None => Err(EcoError::SubmissionNotFound(id.0)),
        }
    }

    async fn update_review(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
        reviewer: &str,
        notes: &str,
        final_points: u32,
    ) -> Result<()> {
        let patch = serde_json::json!({
            "status": status.as_str(),
            "reviewed_at": chrono::Utc::now(),
            "reviewed_by": reviewer,
            "reviewer_notes": notes,
            "final_points": final_points,
        });

        // Guarded update: only reviewable rows transition. Of two racing
        // reviews exactly one matches the WHERE clause.
        let updated = sqlx::query(
            r#"
            UPDATE submissions
            SET status = $2, doc = doc || $3
            WHERE id = $1 AND status IN ('pending_review', 'ai_flagged')
            "#,
        )
        .bind(id.0)
        .bind(status.as_str())
        .bind(patch)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 1 {
            return Ok(());
        }

        // Distinguish "gone" from "already reviewed".
        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM submissions WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;

        match current {
            Some((status,)) => Err(EcoError::NotReviewable { id: id.0, status }),
            None => Err(EcoError::SubmissionNotFound(id.0)),
        }
    }

    async fn append_history(&self, award: &PointsAward) -> Result<()> {
        // Unique on submission_id: replaying an award after a partial
        // failure must not duplicate the history fact.
        sqlx::query(
            r#"
            INSERT INTO points_history (submission_id, student_id, points, status, awarded_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (submission_id) DO NOTHING
            "#,
        )
        .bind(award.submission_id.0)
        .bind(award.student_id.as_str())
        .bind(award.points as i32)
        .bind(award.status.as_str())
        .bind(award.awarded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_by_student(&self, student_id: &StudentId) -> Result<Vec<Submission>> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(
            "SELECT doc FROM submissions WHERE student_id = $1 ORDER BY submitted_at DESC",
        )
        .bind(student_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::decode_row).collect()
    }

    async fn list_by_filter(
        &self,
        classroom_ids: Option<Vec<ClassroomId>>,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Submission>> {
        let classrooms: Option<Vec<String>> =
            classroom_ids.map(|ids| ids.iter().map(|c| c.as_str().to_string()).collect());

        let rows: Vec<SubmissionRow> = sqlx::query_as(
            r#"
            SELECT doc FROM submissions
            WHERE ($1::text[] IS NULL OR classroom_id = ANY($1))
              AND ($2::text IS NULL OR status = $2)
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(classrooms)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::decode_row).collect()
    }
}
