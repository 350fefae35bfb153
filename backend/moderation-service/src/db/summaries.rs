//! Database operations for report summaries
//!
//! The `moderation_status` column on a summary is a denormalized copy.
//! Every read path here re-joins against the live target tables so the
//! admin surface never acts on a stale value; the cached display fields
//! (title/image/slug) are hints only.

use crate::error::{AppError, Result};
use crate::models::{ReportSummary, SummaryStatus, TargetType};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Database operations for report summaries
pub struct SummariesDb {
    pool: Arc<PgPool>,
}

impl SummariesDb {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Get one summary with its moderation status refreshed from the live
    /// target.
    pub async fn get_summary(&self, summary_id: &str) -> Result<ReportSummary> {
        let summary = sqlx::query_as::<_, ReportSummary>(
            r#"
            SELECT s.id, s.target_type, s.target_id, s.report_count,
                   s.first_reported_at, s.last_reported_at, s.status,
                   s.target_title, s.target_image, s.target_slug, s.creator_id,
                   COALESCE(c.moderation_status, u.moderation_status, s.moderation_status)
                       AS moderation_status,
                   s.resolved_at, s.resolved_by, s.resolution_note
            FROM report_summaries s
            LEFT JOIN campaigns c
                   ON s.target_type = 'campaign' AND c.id = s.target_id
            LEFT JOIN user_accounts u
                   ON s.target_type = 'profile' AND u.id = s.target_id
            WHERE s.id = $1
            "#,
        )
        .bind(summary_id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Summary {} not found", summary_id)))?;

        Ok(summary)
    }

    /// Filtered listing with live-status refresh, most recently reported
    /// first.
    pub async fn list_summaries(
        &self,
        status: Option<SummaryStatus>,
        target_type: Option<TargetType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReportSummary>> {
        // One statement covers all filter combinations; NULL filters are
        // no-ops on their column.
        let summaries = sqlx::query_as::<_, ReportSummary>(
            r#"
            SELECT s.id, s.target_type, s.target_id, s.report_count,
                   s.first_reported_at, s.last_reported_at, s.status,
                   s.target_title, s.target_image, s.target_slug, s.creator_id,
                   COALESCE(c.moderation_status, u.moderation_status, s.moderation_status)
                       AS moderation_status,
                   s.resolved_at, s.resolved_by, s.resolution_note
            FROM report_summaries s
            LEFT JOIN campaigns c
                   ON s.target_type = 'campaign' AND c.id = s.target_id
            LEFT JOIN user_accounts u
                   ON s.target_type = 'profile' AND u.id = s.target_id
            WHERE ($1::summary_status IS NULL OR s.status = $1)
              AND ($2::target_type IS NULL OR s.target_type = $2)
            ORDER BY s.last_reported_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(status)
        .bind(target_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await?;

        Ok(summaries)
    }

    /// Resolve or dismiss a summary (admin action).
    pub async fn resolve_summary(
        &self,
        summary_id: &str,
        admin_id: Uuid,
        status: SummaryStatus,
        note: Option<&str>,
    ) -> Result<ReportSummary> {
        let summary = sqlx::query_as::<_, ReportSummary>(
            r#"
            UPDATE report_summaries
            SET status = $2, resolved_by = $3, resolved_at = NOW(),
                resolution_note = $4
            WHERE id = $1
            RETURNING id, target_type, target_id, report_count,
                      first_reported_at, last_reported_at, status,
                      target_title, target_image, target_slug, creator_id,
                      moderation_status, resolved_at, resolved_by,
                      resolution_note
            "#,
        )
        .bind(summary_id)
        .bind(status)
        .bind(admin_id)
        .bind(note)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Summary {} not found", summary_id)))?;

        tracing::info!(
            summary_id = %summary.id,
            admin_id = %admin_id,
            status = %summary.status.as_str(),
            "Summary resolved"
        );

        Ok(summary)
    }

    /// Count of open summaries, used by the analytics endpoint.
    pub async fn count_pending(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM report_summaries WHERE status = 'pending'")
                .fetch_one(&*self.pool)
                .await?;

        Ok(count)
    }
}
