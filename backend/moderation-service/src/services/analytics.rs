//! Aggregate counts for the admin dashboard, cached briefly in Redis.

use crate::cache::AnalyticsCache;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CampaignCounts {
    pub total: i64,
    pub active: i64,
    pub under_review: i64,
    pub hidden: i64,
    pub removed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserCounts {
    pub total: i64,
    pub active: i64,
    pub banned_temporary: i64,
    pub banned_permanent: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReportCounts {
    pub total: i64,
    pub pending: i64,
    pub reviewed: i64,
    pub resolved: i64,
    pub dismissed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub campaigns: CampaignCounts,
    pub users: UserCounts,
    pub reports: ReportCounts,
    pub summaries_pending: i64,
    pub generated_at: DateTime<Utc>,
}

pub struct AnalyticsService {
    pool: Arc<PgPool>,
    cache: AnalyticsCache,
}

impl AnalyticsService {
    pub fn new(pool: Arc<PgPool>, cache: AnalyticsCache) -> Self {
        Self { pool, cache }
    }

    /// Aggregate counts, served from cache when fresh.
    pub async fn overview(&self) -> Result<AnalyticsSnapshot> {
        if let Some(snapshot) = self.cache.get::<AnalyticsSnapshot>().await {
            return Ok(snapshot);
        }

        let snapshot = self.compute().await?;
        self.cache.set(&snapshot).await;

        Ok(snapshot)
    }

    async fn compute(&self) -> Result<AnalyticsSnapshot> {
        let campaigns = sqlx::query_as::<_, CampaignCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE moderation_status = 'active') AS active,
                   COUNT(*) FILTER (WHERE moderation_status = 'under-review') AS under_review,
                   COUNT(*) FILTER (WHERE moderation_status = 'under-review-hidden') AS hidden,
                   COUNT(*) FILTER (WHERE moderation_status IN
                       ('removed', 'removed-temporary', 'removed-permanent')) AS removed
            FROM campaigns
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(&*self.pool)
        .await?;

        let users = sqlx::query_as::<_, UserCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE account_status = 'active') AS active,
                   COUNT(*) FILTER (WHERE account_status = 'banned-temporary') AS banned_temporary,
                   COUNT(*) FILTER (WHERE account_status = 'banned-permanent') AS banned_permanent
            FROM user_accounts
            "#,
        )
        .fetch_one(&*self.pool)
        .await?;

        let reports = sqlx::query_as::<_, ReportCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                   COUNT(*) FILTER (WHERE status = 'reviewed') AS reviewed,
                   COUNT(*) FILTER (WHERE status = 'resolved') AS resolved,
                   COUNT(*) FILTER (WHERE status = 'dismissed') AS dismissed
            FROM reports
            "#,
        )
        .fetch_one(&*self.pool)
        .await?;

        let summaries_pending: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM report_summaries WHERE status = 'pending'")
                .fetch_one(&*self.pool)
                .await?;

        Ok(AnalyticsSnapshot {
            campaigns,
            users,
            reports,
            summaries_pending,
            generated_at: Utc::now(),
        })
    }
}
