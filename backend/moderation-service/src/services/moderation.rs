//! Admin-driven moderation state transitions
//!
//! Status changes move only along the defined edges (see
//! `ModerationStatus::can_transition_to`). Every transition into a
//! removed/banned state stamps who/when/why; temporary variants open a
//! 30-day appeal window; restoration clears all moderation bookkeeping so
//! no stale state resurfaces on the next cycle.

use crate::db::audit;
use crate::error::{AppError, Result};
use crate::models::{
    summary_id, AccountStatus, AuditAction, Campaign, ModerationStatus, TargetType, UserAccount,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct ModerationService {
    pool: Arc<PgPool>,
    appeal_window_days: i64,
}

impl ModerationService {
    pub fn new(pool: Arc<PgPool>, appeal_window_days: i64) -> Self {
        Self {
            pool,
            appeal_window_days,
        }
    }

    /// Admin transition of a campaign's moderation status.
    pub async fn set_campaign_status(
        &self,
        admin_id: Uuid,
        campaign_id: Uuid,
        new_status: ModerationStatus,
        reason: Option<&str>,
    ) -> Result<Campaign> {
        if new_status == ModerationStatus::Deleted {
            return Err(AppError::ValidationError(
                "Status 'deleted' is reserved for target deletion".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let current: ModerationStatus = sqlx::query_scalar(
            "SELECT moderation_status FROM campaigns \
             WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(campaign_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campaign {} not found", campaign_id)))?;

        if !current.can_transition_to(new_status) {
            return Err(AppError::ValidationError(format!(
                "Invalid status transition: {} -> {}",
                current.as_str(),
                new_status.as_str()
            )));
        }

        let campaign = match new_status {
            ModerationStatus::Active => {
                sqlx::query_as::<_, Campaign>(
                    r#"
                    UPDATE campaigns
                    SET moderation_status = 'active', hidden_at = NULL,
                        removed_by = NULL, removed_at = NULL, remove_reason = NULL,
                        appeal_deadline = NULL, appeal_count = 0
                    WHERE id = $1
                    RETURNING id, creator_id, title, slug, image_url, reports_count,
                              moderation_status, hidden_at, removed_by, removed_at,
                              remove_reason, appeal_deadline, appeal_count, created_at,
                              deleted_at
                    "#,
                )
                .bind(campaign_id)
                .fetch_one(&mut *tx)
                .await?
            }
            ModerationStatus::UnderReview => {
                sqlx::query_as::<_, Campaign>(
                    r#"
                    UPDATE campaigns
                    SET moderation_status = 'under-review', hidden_at = NULL
                    WHERE id = $1
                    RETURNING id, creator_id, title, slug, image_url, reports_count,
                              moderation_status, hidden_at, removed_by, removed_at,
                              remove_reason, appeal_deadline, appeal_count, created_at,
                              deleted_at
                    "#,
                )
                .bind(campaign_id)
                .fetch_one(&mut *tx)
                .await?
            }
            ModerationStatus::UnderReviewHidden => {
                sqlx::query_as::<_, Campaign>(
                    r#"
                    UPDATE campaigns
                    SET moderation_status = 'under-review-hidden', hidden_at = NOW()
                    WHERE id = $1
                    RETURNING id, creator_id, title, slug, image_url, reports_count,
                              moderation_status, hidden_at, removed_by, removed_at,
                              remove_reason, appeal_deadline, appeal_count, created_at,
                              deleted_at
                    "#,
                )
                .bind(campaign_id)
                .fetch_one(&mut *tx)
                .await?
            }
            ModerationStatus::RemovedTemporary => {
                sqlx::query_as::<_, Campaign>(
                    r#"
                    UPDATE campaigns
                    SET moderation_status = 'removed-temporary', removed_by = $2,
                        removed_at = NOW(), remove_reason = $3,
                        appeal_deadline = NOW() + make_interval(days => $4),
                        appeal_count = 0
                    WHERE id = $1
                    RETURNING id, creator_id, title, slug, image_url, reports_count,
                              moderation_status, hidden_at, removed_by, removed_at,
                              remove_reason, appeal_deadline, appeal_count, created_at,
                              deleted_at
                    "#,
                )
                .bind(campaign_id)
                .bind(admin_id)
                .bind(reason)
                .bind(self.appeal_window_days as i32)
                .fetch_one(&mut *tx)
                .await?
            }
            ModerationStatus::Removed | ModerationStatus::RemovedPermanent => {
                sqlx::query_as::<_, Campaign>(
                    r#"
                    UPDATE campaigns
                    SET moderation_status = $2, removed_by = $3, removed_at = NOW(),
                        remove_reason = $4, appeal_deadline = NULL
                    WHERE id = $1
                    RETURNING id, creator_id, title, slug, image_url, reports_count,
                              moderation_status, hidden_at, removed_by, removed_at,
                              remove_reason, appeal_deadline, appeal_count, created_at,
                              deleted_at
                    "#,
                )
                .bind(campaign_id)
                .bind(new_status)
                .bind(admin_id)
                .bind(reason)
                .fetch_one(&mut *tx)
                .await?
            }
            ModerationStatus::Deleted => unreachable!("rejected above"),
        };

        audit::append_entry(
            &mut *tx,
            &admin_id.to_string(),
            AuditAction::SetStatus,
            TargetType::Campaign,
            campaign_id,
            Some(serde_json::json!({
                "from": current.as_str(),
                "to": new_status.as_str(),
                "reason": reason,
            })),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            campaign_id = %campaign_id,
            admin_id = %admin_id,
            from = %current.as_str(),
            to = %new_status.as_str(),
            "Campaign moderation status changed"
        );

        Ok(campaign)
    }

    /// Admin transition of a user's account status. Restoring to active
    /// also unhides the profile.
    pub async fn set_account_status(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        new_status: AccountStatus,
        reason: Option<&str>,
    ) -> Result<UserAccount> {
        let mut tx = self.pool.begin().await?;

        let current: AccountStatus = sqlx::query_scalar(
            "SELECT account_status FROM user_accounts WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        if !current.can_transition_to(new_status) {
            return Err(AppError::ValidationError(format!(
                "Invalid account status transition: {} -> {}",
                current.as_str(),
                new_status.as_str()
            )));
        }

        let user = match new_status {
            AccountStatus::Active => {
                sqlx::query_as::<_, UserAccount>(
                    r#"
                    UPDATE user_accounts
                    SET account_status = 'active', moderation_status = 'active',
                        hidden_at = NULL, banned_by = NULL, banned_at = NULL,
                        ban_reason = NULL, appeal_deadline = NULL, appeal_count = 0
                    WHERE id = $1
                    RETURNING id, username, display_name, avatar_url, reports_count,
                              moderation_status, account_status, hidden_at, banned_by,
                              banned_at, ban_reason, appeal_deadline, appeal_count,
                              created_at
                    "#,
                )
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?
            }
            AccountStatus::BannedTemporary => {
                sqlx::query_as::<_, UserAccount>(
                    r#"
                    UPDATE user_accounts
                    SET account_status = 'banned-temporary', banned_by = $2,
                        banned_at = NOW(), ban_reason = $3,
                        appeal_deadline = NOW() + make_interval(days => $4),
                        appeal_count = 0
                    WHERE id = $1
                    RETURNING id, username, display_name, avatar_url, reports_count,
                              moderation_status, account_status, hidden_at, banned_by,
                              banned_at, ban_reason, appeal_deadline, appeal_count,
                              created_at
                    "#,
                )
                .bind(user_id)
                .bind(admin_id)
                .bind(reason)
                .bind(self.appeal_window_days as i32)
                .fetch_one(&mut *tx)
                .await?
            }
            AccountStatus::BannedPermanent => {
                sqlx::query_as::<_, UserAccount>(
                    r#"
                    UPDATE user_accounts
                    SET account_status = 'banned-permanent', banned_by = $2,
                        banned_at = NOW(), ban_reason = $3, appeal_deadline = NULL,
                        appeal_count = 0
                    WHERE id = $1
                    RETURNING id, username, display_name, avatar_url, reports_count,
                              moderation_status, account_status, hidden_at, banned_by,
                              banned_at, ban_reason, appeal_deadline, appeal_count,
                              created_at
                    "#,
                )
                .bind(user_id)
                .bind(admin_id)
                .bind(reason)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        audit::append_entry(
            &mut *tx,
            &admin_id.to_string(),
            AuditAction::SetStatus,
            TargetType::Profile,
            user_id,
            Some(serde_json::json!({
                "from": current.as_str(),
                "to": new_status.as_str(),
                "reason": reason,
            })),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            admin_id = %admin_id,
            from = %current.as_str(),
            to = %new_status.as_str(),
            "Account status changed"
        );

        Ok(user)
    }

    /// Delete a campaign (creator or admin initiated) and cascade into the
    /// moderation records: the summary is dismissed with a deletion note
    /// and every open report is bulk-dismissed. Returns the number of
    /// reports that were dismissed.
    pub async fn delete_campaign(&self, actor: &str, campaign_id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<ModerationStatus> = sqlx::query_scalar(
            "SELECT moderation_status FROM campaigns \
             WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(campaign_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_none() {
            return Err(AppError::NotFound(format!(
                "Campaign {} not found",
                campaign_id
            )));
        }

        sqlx::query(
            "UPDATE campaigns SET deleted_at = NOW(), moderation_status = 'deleted' \
             WHERE id = $1",
        )
        .bind(campaign_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE report_summaries
            SET status = 'dismissed', moderation_status = 'deleted',
                resolved_at = NOW(), resolution_note = 'target deleted'
            WHERE id = $1
            "#,
        )
        .bind(summary_id(TargetType::Campaign, campaign_id))
        .execute(&mut *tx)
        .await?;

        let dismissed = sqlx::query(
            r#"
            UPDATE reports
            SET status = 'dismissed', reviewed_at = NOW(), action = 'target deleted'
            WHERE target_type = 'campaign' AND target_id = $1
              AND status <> 'dismissed'
            "#,
        )
        .bind(campaign_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        audit::append_entry(
            &mut *tx,
            actor,
            AuditAction::DeleteCampaign,
            TargetType::Campaign,
            campaign_id,
            Some(serde_json::json!({ "reports_dismissed": dismissed })),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            campaign_id = %campaign_id,
            actor = %actor,
            reports_dismissed = dismissed,
            "Campaign deleted, moderation records dismissed"
        );

        Ok(dismissed)
    }
}
