//! Appeal escalation sweep
//!
//! Promotes expired temporary removals/bans to their permanent variants.
//! The scan filter excludes already-permanent rows, so re-running the
//! sweep is a no-op. Each item escalates in its own transaction and a
//! per-item failure is collected rather than aborting the rest of the
//! sweep.

use crate::db::audit;
use crate::error::Result;
use crate::metrics;
use crate::models::{AuditAction, TargetType, SYSTEM_ACTOR};
use crate::services::notifier::Notifier;
use crate::services::rate_limiter::RateLimiter;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SweepError {
    pub id: Uuid,
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SweepOutcome {
    pub campaigns_processed: u64,
    pub users_processed: u64,
    pub errors: Vec<SweepError>,
}

#[derive(Debug, sqlx::FromRow)]
struct ExpiredCampaign {
    id: Uuid,
    creator_id: Uuid,
    title: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ExpiredUser {
    id: Uuid,
    username: String,
}

pub struct Sweeper {
    pool: Arc<PgPool>,
    notifier: Arc<Notifier>,
    rate_limiter: Arc<RateLimiter>,
}

impl Sweeper {
    pub fn new(pool: Arc<PgPool>, notifier: Arc<Notifier>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            pool,
            notifier,
            rate_limiter,
        }
    }

    /// One sweep over all expired temporary removals and bans.
    pub async fn run_sweep(&self) -> SweepOutcome {
        let started = Instant::now();
        let mut outcome = SweepOutcome {
            campaigns_processed: 0,
            users_processed: 0,
            errors: Vec::new(),
        };

        match self.expired_campaigns().await {
            Ok(campaigns) => {
                for campaign in campaigns {
                    match self.escalate_campaign(&campaign).await {
                        Ok(true) => outcome.campaigns_processed += 1,
                        Ok(false) => {} // raced with another writer, nothing to do
                        Err(e) => outcome.errors.push(SweepError {
                            id: campaign.id,
                            kind: "campaign".to_string(),
                            message: e.to_string(),
                        }),
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to scan expired campaign removals");
                outcome.errors.push(SweepError {
                    id: Uuid::nil(),
                    kind: "campaign-scan".to_string(),
                    message: e.to_string(),
                });
            }
        }

        match self.expired_users().await {
            Ok(users) => {
                for user in users {
                    match self.escalate_user(&user).await {
                        Ok(true) => outcome.users_processed += 1,
                        Ok(false) => {}
                        Err(e) => outcome.errors.push(SweepError {
                            id: user.id,
                            kind: "user".to_string(),
                            message: e.to_string(),
                        }),
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to scan expired user bans");
                outcome.errors.push(SweepError {
                    id: Uuid::nil(),
                    kind: "user-scan".to_string(),
                    message: e.to_string(),
                });
            }
        }

        // Housekeeping: drop rate-limit rows whose TTL lapsed.
        match self.rate_limiter.purge_expired_records().await {
            Ok(purged) if purged > 0 => {
                tracing::debug!(purged, "Purged expired rate limit records");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to purge expired rate limit records");
            }
        }

        let status = if outcome.errors.is_empty() {
            "success"
        } else {
            "partial"
        };
        metrics::record_sweep_run(status);
        metrics::record_sweep_processed("campaign", outcome.campaigns_processed);
        metrics::record_sweep_processed("user", outcome.users_processed);
        metrics::record_sweep_duration(started.elapsed());

        tracing::info!(
            campaigns_processed = outcome.campaigns_processed,
            users_processed = outcome.users_processed,
            errors = outcome.errors.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Appeal escalation sweep completed"
        );

        outcome
    }

    async fn expired_campaigns(&self) -> Result<Vec<ExpiredCampaign>> {
        let campaigns = sqlx::query_as::<_, ExpiredCampaign>(
            r#"
            SELECT id, creator_id, title
            FROM campaigns
            WHERE moderation_status = 'removed-temporary'
              AND appeal_deadline < NOW()
              AND deleted_at IS NULL
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(campaigns)
    }

    async fn expired_users(&self) -> Result<Vec<ExpiredUser>> {
        let users = sqlx::query_as::<_, ExpiredUser>(
            r#"
            SELECT id, username
            FROM user_accounts
            WHERE account_status = 'banned-temporary'
              AND appeal_deadline < NOW()
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(users)
    }

    /// Promote one expired campaign removal to permanent. Returns false
    /// when the row no longer matches the filter (already escalated or
    /// restored between scan and escalation).
    async fn escalate_campaign(&self, campaign: &ExpiredCampaign) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE campaigns
            SET moderation_status = 'removed-permanent',
                appeal_deadline = NULL, appeal_count = 0
            WHERE id = $1
              AND moderation_status = 'removed-temporary'
              AND appeal_deadline < NOW()
            "#,
        )
        .bind(campaign.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(false);
        }

        audit::append_entry(
            &mut *tx,
            SYSTEM_ACTOR,
            AuditAction::AutoPermanentRemoval,
            TargetType::Campaign,
            campaign.id,
            Some(serde_json::json!({ "title": campaign.title })),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            campaign_id = %campaign.id,
            "Temporary removal escalated to permanent"
        );

        self.notifier
            .notify_user(
                campaign.creator_id,
                "Your campaign has been permanently removed",
                "The appeal window for your removed campaign has expired.",
                Some(serde_json::json!({
                    "kind": "auto_permanent_removal",
                    "campaign_id": campaign.id,
                })),
            )
            .await;

        Ok(true)
    }

    /// Promote one expired user ban to permanent.
    async fn escalate_user(&self, user: &ExpiredUser) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE user_accounts
            SET account_status = 'banned-permanent',
                appeal_deadline = NULL, appeal_count = 0
            WHERE id = $1
              AND account_status = 'banned-temporary'
              AND appeal_deadline < NOW()
            "#,
        )
        .bind(user.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(false);
        }

        audit::append_entry(
            &mut *tx,
            SYSTEM_ACTOR,
            AuditAction::AutoPermanentBan,
            TargetType::Profile,
            user.id,
            Some(serde_json::json!({ "username": user.username })),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, "Temporary ban escalated to permanent");

        self.notifier
            .notify_user(
                user.id,
                "Your account ban is now permanent",
                "The appeal window for your account ban has expired.",
                Some(serde_json::json!({ "kind": "auto_permanent_ban" })),
            )
            .await;

        Ok(true)
    }
}
