//! Database operations for individual reports

use crate::error::{AppError, Result};
use crate::models::{Report, ReportStatus, TargetType};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Database operations for reports
pub struct ReportsDb {
    pool: Arc<PgPool>,
}

impl ReportsDb {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Get report by ID
    pub async fn get_report(&self, report_id: Uuid) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, target_type, target_id, reporter_id, reason, details,
                   status, created_at, reviewed_at, reviewed_by, action
            FROM reports
            WHERE id = $1
            "#,
        )
        .bind(report_id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        Ok(report)
    }

    /// All reports filed against one target, newest first.
    pub async fn list_for_target(
        &self,
        target_type: TargetType,
        target_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT id, target_type, target_id, reporter_id, reason, details,
                   status, created_at, reviewed_at, reviewed_by, action
            FROM reports
            WHERE target_type = $1 AND target_id = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(target_type)
        .bind(target_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&*self.pool)
        .await?;

        Ok(reports)
    }

    /// Filtered listing for the admin surface.
    pub async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        target_type: Option<TargetType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>> {
        let reports = match (status, target_type) {
            (Some(status), Some(target_type)) => {
                sqlx::query_as::<_, Report>(
                    r#"
                    SELECT id, target_type, target_id, reporter_id, reason, details,
                           status, created_at, reviewed_at, reviewed_by, action
                    FROM reports
                    WHERE status = $1 AND target_type = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(status)
                .bind(target_type)
                .bind(limit)
                .bind(offset)
                .fetch_all(&*self.pool)
                .await?
            }
            (Some(status), None) => {
                sqlx::query_as::<_, Report>(
                    r#"
                    SELECT id, target_type, target_id, reporter_id, reason, details,
                           status, created_at, reviewed_at, reviewed_by, action
                    FROM reports
                    WHERE status = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(&*self.pool)
                .await?
            }
            (None, Some(target_type)) => {
                sqlx::query_as::<_, Report>(
                    r#"
                    SELECT id, target_type, target_id, reporter_id, reason, details,
                           status, created_at, reviewed_at, reviewed_by, action
                    FROM reports
                    WHERE target_type = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(target_type)
                .bind(limit)
                .bind(offset)
                .fetch_all(&*self.pool)
                .await?
            }
            (None, None) => {
                sqlx::query_as::<_, Report>(
                    r#"
                    SELECT id, target_type, target_id, reporter_id, reason, details,
                           status, created_at, reviewed_at, reviewed_by, action
                    FROM reports
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&*self.pool)
                .await?
            }
        };

        Ok(reports)
    }

    /// Review a report (admin action): stamps reviewer, time, and outcome.
    pub async fn review_report(
        &self,
        report_id: Uuid,
        admin_id: Uuid,
        status: ReportStatus,
        action: Option<&str>,
    ) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports
            SET status = $2, reviewed_by = $3, reviewed_at = NOW(), action = $4
            WHERE id = $1
            RETURNING id, target_type, target_id, reporter_id, reason, details,
                      status, created_at, reviewed_at, reviewed_by, action
            "#,
        )
        .bind(report_id)
        .bind(status)
        .bind(admin_id)
        .bind(action)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        tracing::info!(
            report_id = %report.id,
            admin_id = %admin_id,
            status = %report.status.as_str(),
            "Report reviewed"
        );

        Ok(report)
    }
}
