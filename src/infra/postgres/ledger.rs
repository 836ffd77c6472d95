//! PostgreSQL points ledger.
//!
//! The relational store owns student balances. The award is a single
//! upsert whose increment happens inside the database, so two concurrent
//! awards for the same student can never lose an update. The activity
//! record's unique key (the submission id) makes replays idempotent: a
//! reconciliation sweep can re-issue an award without double-counting.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::domain::{StudentId, SubmissionId};
use crate::infra::{PointsLedger, Result};

/// PostgreSQL-backed points ledger.
pub struct PgPointsLedger {
    pool: PgPool,
}

impl PgPointsLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create from connection string.
    pub async fn from_url(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl PointsLedger for PgPointsLedger {
    async fn award_points(
        &self,
        student_id: &StudentId,
        points: u32,
        activity_type: &str,
        activity_id: SubmissionId,
        metadata: serde_json::Value,
    ) -> Result<(u32, u32)> {
        let mut tx = self.pool.begin().await?;

        // Dedup gate. rows_affected == 0 means this activity was already
        // credited; skip the increment and report the current balance.
        let fresh = sqlx::query(
            r#"
            INSERT INTO point_awards (activity_id, student_id, points, activity_type, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (activity_id) DO NOTHING
            "#,
        )
        .bind(activity_id.0)
        .bind(student_id.as_str())
        .bind(points as i32)
        .bind(activity_type)
        .bind(metadata)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        let (total,): (i32,) = if fresh {
            sqlx::query_as(
                r#"
                INSERT INTO student_balances (student_id, total_points, tasks_completed)
                VALUES ($1, $2, 1)
                ON CONFLICT (student_id) DO UPDATE
                SET total_points = student_balances.total_points + EXCLUDED.total_points,
                    tasks_completed = student_balances.tasks_completed + 1
                RETURNING total_points
                "#,
            )
            .bind(student_id.as_str())
            .bind(points as i32)
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query_as("SELECT total_points FROM student_balances WHERE student_id = $1")
                .bind(student_id.as_str())
                .fetch_one(&mut *tx)
                .await?
        };

        let (ahead,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM student_balances WHERE total_points > $1")
                .bind(total)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok((total as u32, ahead as u32 + 1))
    }
}
