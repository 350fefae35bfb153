//! Database operations for campaign targets

use crate::error::{AppError, Result};
use crate::models::{Campaign, ModerationStatus};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Database operations for campaigns
pub struct CampaignsDb {
    pool: Arc<PgPool>,
}

impl CampaignsDb {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Get a campaign by ID, including soft-deleted rows (the admin surface
    /// still needs to inspect them).
    pub async fn get_campaign(&self, campaign_id: Uuid) -> Result<Campaign> {
        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT id, creator_id, title, slug, image_url, reports_count,
                   moderation_status, hidden_at, removed_by, removed_at,
                   remove_reason, appeal_deadline, appeal_count, created_at,
                   deleted_at
            FROM campaigns
            WHERE id = $1
            "#,
        )
        .bind(campaign_id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campaign {} not found", campaign_id)))?;

        Ok(campaign)
    }

    /// Filtered listing for the admin surface. Soft-deleted campaigns are
    /// excluded.
    pub async fn list_campaigns(
        &self,
        moderation_status: Option<ModerationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Campaign>> {
        let campaigns = if let Some(status) = moderation_status {
            sqlx::query_as::<_, Campaign>(
                r#"
                SELECT id, creator_id, title, slug, image_url, reports_count,
                       moderation_status, hidden_at, removed_by, removed_at,
                       remove_reason, appeal_deadline, appeal_count, created_at,
                       deleted_at
                FROM campaigns
                WHERE moderation_status = $1 AND deleted_at IS NULL
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&*self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Campaign>(
                r#"
                SELECT id, creator_id, title, slug, image_url, reports_count,
                       moderation_status, hidden_at, removed_by, removed_at,
                       remove_reason, appeal_deadline, appeal_count, created_at,
                       deleted_at
                FROM campaigns
                WHERE deleted_at IS NULL
                ORDER BY created_at DESC
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&*self.pool)
            .await?
        };

        Ok(campaigns)
    }
}
