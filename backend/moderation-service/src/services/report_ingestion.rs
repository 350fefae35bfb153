//! Report ingestion pipeline
//!
//! One transaction spans the whole write path: lock the target, read the
//! summary, insert the report, bump the denormalized counter, auto-hide on
//! threshold, upsert the summary. All reads happen before any write is
//! staged. Concurrent reports on the same target serialize on the target
//! row lock, so counters stay exact and auto-hide fires at most once.
//!
//! The threshold notification is fired only after commit and only on the
//! call that performed the hide; its failure never affects the request.

use crate::db::audit;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{
    is_valid_reason, summary_id, ModerationStatus, ReportOutcome, SubmitReportInput, SummaryStatus,
    TargetType, SYSTEM_ACTOR,
};
use crate::services::notifier::Notifier;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use uuid::Uuid;

/// Target fields read under the row lock, normalized across both kinds.
#[derive(Debug)]
struct LockedTarget {
    /// Who gets notified when the target is hidden
    owner_id: Uuid,
    reports_count: i32,
    moderation_status: ModerationStatus,
    // Cached display hints for the summary
    title: Option<String>,
    slug: Option<String>,
    image: Option<String>,
    /// Campaign creator; absent for profiles
    creator_id: Option<Uuid>,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    report_count: i32,
    status: SummaryStatus,
}

pub struct ReportIngestion {
    pool: Arc<PgPool>,
    notifier: Arc<Notifier>,
    campaign_threshold: i32,
    profile_threshold: i32,
}

impl ReportIngestion {
    pub fn new(
        pool: Arc<PgPool>,
        notifier: Arc<Notifier>,
        campaign_threshold: i32,
        profile_threshold: i32,
    ) -> Self {
        Self {
            pool,
            notifier,
            campaign_threshold,
            profile_threshold,
        }
    }

    /// Record one report. Fails with `NotFound` if the target is missing
    /// and `ValidationError` if the reason is not in the target type's
    /// allowed set; both are checked before any write.
    pub async fn submit_report(&self, input: SubmitReportInput) -> Result<ReportOutcome> {
        if !is_valid_reason(input.target_type, &input.reason) {
            return Err(AppError::ValidationError(format!(
                "Reason '{}' is not valid for {} reports",
                input.reason,
                input.target_type.as_str()
            )));
        }

        let mut tx = self.pool.begin().await?;

        // Reads first: target (locked) and existing summary.
        let target = self.lock_target(&mut tx, input.target_type, input.target_id).await?;
        let sid = summary_id(input.target_type, input.target_id);
        let existing_summary = sqlx::query_as::<_, SummaryRow>(
            "SELECT report_count, status FROM report_summaries WHERE id = $1 FOR UPDATE",
        )
        .bind(&sid)
        .fetch_optional(&mut *tx)
        .await?;

        let report_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO reports (id, target_type, target_id, reporter_id, reason,
                                 details, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', NOW())
            "#,
        )
        .bind(report_id)
        .bind(input.target_type)
        .bind(input.target_id)
        .bind(input.reporter_id)
        .bind(&input.reason)
        .bind(&input.details)
        .execute(&mut *tx)
        .await?;

        let new_count = target.reports_count + 1;
        let threshold = match input.target_type {
            TargetType::Campaign => self.campaign_threshold,
            TargetType::Profile => self.profile_threshold,
        };

        // Auto-hide only fires on the transition away from `active`;
        // reports against an already-hidden target never re-trigger it.
        let auto_hidden =
            new_count >= threshold && target.moderation_status == ModerationStatus::Active;

        self.update_target_counter(&mut tx, input.target_type, input.target_id, new_count, auto_hidden)
            .await?;

        if auto_hidden {
            audit::append_entry(
                &mut *tx,
                SYSTEM_ACTOR,
                crate::models::AuditAction::AutoHide,
                input.target_type,
                input.target_id,
                Some(serde_json::json!({
                    "report_count": new_count,
                    "threshold": threshold,
                })),
            )
            .await?;
        }

        let visible_status = if auto_hidden {
            ModerationStatus::UnderReviewHidden
        } else {
            target.moderation_status
        };

        self.upsert_summary(&mut tx, &input, &sid, &target, existing_summary, visible_status)
            .await?;

        tx.commit().await?;

        metrics::record_report_submitted(input.target_type.as_str());

        if auto_hidden {
            metrics::record_auto_hide(input.target_type.as_str());
            tracing::info!(
                target_type = %input.target_type.as_str(),
                target_id = %input.target_id,
                report_count = new_count,
                "Target auto-hidden after crossing report threshold"
            );
            self.spawn_hidden_notification(input.target_type, target.owner_id);
        }

        Ok(ReportOutcome {
            report_id,
            auto_hidden,
        })
    }

    async fn lock_target(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        target_type: TargetType,
        target_id: Uuid,
    ) -> Result<LockedTarget> {
        match target_type {
            TargetType::Campaign => {
                let row: Option<(Uuid, String, String, Option<String>, i32, ModerationStatus)> =
                    sqlx::query_as(
                        r#"
                        SELECT creator_id, title, slug, image_url, reports_count, moderation_status
                        FROM campaigns
                        WHERE id = $1 AND deleted_at IS NULL
                        FOR UPDATE
                        "#,
                    )
                    .bind(target_id)
                    .fetch_optional(&mut **tx)
                    .await?;

                let (creator_id, title, slug, image_url, reports_count, moderation_status) = row
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Campaign {} not found", target_id))
                    })?;

                Ok(LockedTarget {
                    owner_id: creator_id,
                    reports_count,
                    moderation_status,
                    title: Some(title),
                    slug: Some(slug),
                    image: image_url,
                    creator_id: Some(creator_id),
                })
            }
            TargetType::Profile => {
                let row: Option<(String, Option<String>, Option<String>, i32, ModerationStatus)> =
                    sqlx::query_as(
                        r#"
                        SELECT username, display_name, avatar_url, reports_count, moderation_status
                        FROM user_accounts
                        WHERE id = $1
                        FOR UPDATE
                        "#,
                    )
                    .bind(target_id)
                    .fetch_optional(&mut **tx)
                    .await?;

                let (username, display_name, avatar_url, reports_count, moderation_status) =
                    row.ok_or_else(|| {
                        AppError::NotFound(format!("User {} not found", target_id))
                    })?;

                Ok(LockedTarget {
                    owner_id: target_id,
                    reports_count,
                    moderation_status,
                    title: Some(display_name.unwrap_or(username.clone())),
                    slug: Some(username),
                    image: avatar_url,
                    creator_id: None,
                })
            }
        }
    }

    async fn update_target_counter(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        target_type: TargetType,
        target_id: Uuid,
        new_count: i32,
        auto_hidden: bool,
    ) -> Result<()> {
        let query = match (target_type, auto_hidden) {
            (TargetType::Campaign, false) => {
                "UPDATE campaigns SET reports_count = $2 WHERE id = $1"
            }
            (TargetType::Campaign, true) => {
                "UPDATE campaigns SET reports_count = $2, \
                 moderation_status = 'under-review-hidden', hidden_at = NOW() \
                 WHERE id = $1"
            }
            (TargetType::Profile, false) => {
                "UPDATE user_accounts SET reports_count = $2 WHERE id = $1"
            }
            (TargetType::Profile, true) => {
                "UPDATE user_accounts SET reports_count = $2, \
                 moderation_status = 'under-review-hidden', hidden_at = NOW() \
                 WHERE id = $1"
            }
        };

        sqlx::query(query)
            .bind(target_id)
            .bind(new_count)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn upsert_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        input: &SubmitReportInput,
        sid: &str,
        target: &LockedTarget,
        existing: Option<SummaryRow>,
        visible_status: ModerationStatus,
    ) -> Result<()> {
        match existing {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO report_summaries
                        (id, target_type, target_id, report_count, first_reported_at,
                         last_reported_at, status, target_title, target_image,
                         target_slug, creator_id, moderation_status)
                    VALUES ($1, $2, $3, 1, NOW(), NOW(), 'pending', $4, $5, $6, $7, $8)
                    "#,
                )
                .bind(sid)
                .bind(input.target_type)
                .bind(input.target_id)
                .bind(&target.title)
                .bind(&target.image)
                .bind(&target.slug)
                .bind(target.creator_id)
                .bind(visible_status)
                .execute(&mut **tx)
                .await?;
            }
            Some(summary) if summary.status.is_closed() => {
                // A closed summary reopens as a fresh moderation cycle:
                // the counter and first-seen timestamp restart.
                sqlx::query(
                    r#"
                    UPDATE report_summaries
                    SET report_count = 1, first_reported_at = NOW(),
                        last_reported_at = NOW(), status = 'pending',
                        target_title = $2, target_image = $3, target_slug = $4,
                        moderation_status = $5, resolved_at = NULL,
                        resolved_by = NULL, resolution_note = NULL
                    WHERE id = $1
                    "#,
                )
                .bind(sid)
                .bind(&target.title)
                .bind(&target.image)
                .bind(&target.slug)
                .bind(visible_status)
                .execute(&mut **tx)
                .await?;
            }
            Some(summary) => {
                sqlx::query(
                    r#"
                    UPDATE report_summaries
                    SET report_count = $2, last_reported_at = NOW(),
                        target_title = $3, target_image = $4, target_slug = $5,
                        moderation_status = $6
                    WHERE id = $1
                    "#,
                )
                .bind(sid)
                .bind(summary.report_count + 1)
                .bind(&target.title)
                .bind(&target.image)
                .bind(&target.slug)
                .bind(visible_status)
                .execute(&mut **tx)
                .await?;
            }
        }

        Ok(())
    }

    fn spawn_hidden_notification(&self, target_type: TargetType, owner_id: Uuid) {
        let notifier = self.notifier.clone();
        let (title, body) = match target_type {
            TargetType::Campaign => (
                "Your campaign is under review",
                "Your campaign was hidden pending review after multiple reports.",
            ),
            TargetType::Profile => (
                "Your profile is under review",
                "Your profile was hidden pending review after multiple reports.",
            ),
        };

        tokio::spawn(async move {
            notifier
                .notify_user(
                    owner_id,
                    title,
                    body,
                    Some(serde_json::json!({ "kind": "auto_hide" })),
                )
                .await;
        });
    }
}
