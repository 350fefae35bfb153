//! Integration tests: appeal escalation sweep
//!
//! Coverage:
//! - Expired temporary removals/bans escalate to permanent with cleared
//!   appeal fields and a system-actor audit entry
//! - Unexpired items are untouched
//! - The sweep is idempotent: a second run processes nothing
//! - A permanent state is terminal for subsequent admin restores

mod common;

use common::{create_campaign, create_user, setup_test_db};
use moderation_service::db::DevicesDb;
use moderation_service::error::AppError;
use moderation_service::models::{AccountStatus, ModerationStatus};
use moderation_service::services::{
    ModerationService, Notifier, RateLimiter, RateLimiterConfig, Sweeper,
};
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

fn sweeper(pool: &Pool<Postgres>) -> Sweeper {
    let pool = Arc::new(pool.clone());
    let notifier = Arc::new(Notifier::new(DevicesDb::new(pool.clone()), None));
    let rate_limiter = Arc::new(RateLimiter::new(
        pool.clone(),
        RateLimiterConfig {
            max_reports: 5,
            window_secs: 3600,
            record_ttl_secs: 86400,
        },
    ));
    Sweeper::new(pool, notifier, rate_limiter)
}

/// Put a campaign into removed-temporary with a deadline in the past/future
async fn remove_campaign_temporarily(pool: &Pool<Postgres>, id: Uuid, deadline_offset_days: i32) {
    sqlx::query(
        "UPDATE campaigns
         SET moderation_status = 'removed-temporary', removed_by = $2,
             removed_at = NOW(), remove_reason = 'fraudulent campaign',
             appeal_deadline = NOW() + make_interval(days => $3)
         WHERE id = $1",
    )
    .bind(id)
    .bind(Uuid::new_v4())
    .bind(deadline_offset_days)
    .execute(pool)
    .await
    .expect("mark campaign removed-temporary");
}

async fn ban_user_temporarily(pool: &Pool<Postgres>, id: Uuid, deadline_offset_days: i32) {
    sqlx::query(
        "UPDATE user_accounts
         SET account_status = 'banned-temporary', banned_by = $2,
             banned_at = NOW(), ban_reason = 'repeated harassment',
             appeal_deadline = NOW() + make_interval(days => $3)
         WHERE id = $1",
    )
    .bind(id)
    .bind(Uuid::new_v4())
    .bind(deadline_offset_days)
    .execute(pool)
    .await
    .expect("mark user banned-temporary");
}

#[tokio::test]
async fn expired_items_escalate_and_sweep_is_idempotent() {
    let pool = setup_test_db().await.expect("test db");
    let sweeper = sweeper(&pool);

    let expired_campaign = create_campaign(&pool, Uuid::new_v4()).await;
    let pending_campaign = create_campaign(&pool, Uuid::new_v4()).await;
    let expired_user = create_user(&pool).await;

    remove_campaign_temporarily(&pool, expired_campaign, -1).await;
    remove_campaign_temporarily(&pool, pending_campaign, 7).await;
    ban_user_temporarily(&pool, expired_user, -1).await;

    let outcome = sweeper.run_sweep().await;
    assert_eq!(outcome.campaigns_processed, 1);
    assert_eq!(outcome.users_processed, 1);
    assert!(outcome.errors.is_empty());

    // Expired campaign is now permanent with cleared appeal fields
    let (status, deadline): (ModerationStatus, Option<chrono::DateTime<chrono::Utc>>) =
        sqlx::query_as("SELECT moderation_status, appeal_deadline FROM campaigns WHERE id = $1")
            .bind(expired_campaign)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, ModerationStatus::RemovedPermanent);
    assert!(deadline.is_none());

    // Unexpired campaign is untouched
    let (status, deadline): (ModerationStatus, Option<chrono::DateTime<chrono::Utc>>) =
        sqlx::query_as("SELECT moderation_status, appeal_deadline FROM campaigns WHERE id = $1")
            .bind(pending_campaign)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, ModerationStatus::RemovedTemporary);
    assert!(deadline.is_some());

    // Expired ban escalated
    let account_status: AccountStatus =
        sqlx::query_scalar("SELECT account_status FROM user_accounts WHERE id = $1")
            .bind(expired_user)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(account_status, AccountStatus::BannedPermanent);

    // One system-actor audit entry per escalation
    let removal_entries: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_logs
         WHERE target_id = $1 AND action = 'auto_permanent_removal' AND actor = 'system'",
    )
    .bind(expired_campaign)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(removal_entries, 1);

    let ban_entries: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_logs
         WHERE target_id = $1 AND action = 'auto_permanent_ban' AND actor = 'system'",
    )
    .bind(expired_user)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(ban_entries, 1);

    // Second run with no clock advance processes nothing
    let second = sweeper.run_sweep().await;
    assert_eq!(second.campaigns_processed, 0);
    assert_eq!(second.users_processed, 0);
    assert!(second.errors.is_empty());

    let removal_entries_after: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_logs
         WHERE target_id = $1 AND action = 'auto_permanent_removal'",
    )
    .bind(expired_campaign)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(removal_entries_after, 1);
}

#[tokio::test]
async fn permanent_states_are_terminal_for_admins() {
    let pool = setup_test_db().await.expect("test db");
    let sweeper = sweeper(&pool);
    let moderation = ModerationService::new(Arc::new(pool.clone()), 30);

    let campaign_id = create_campaign(&pool, Uuid::new_v4()).await;
    remove_campaign_temporarily(&pool, campaign_id, -1).await;

    let outcome = sweeper.run_sweep().await;
    assert_eq!(outcome.campaigns_processed, 1);

    // No admin path leads back out of removed-permanent
    let err = moderation
        .set_campaign_status(
            Uuid::new_v4(),
            campaign_id,
            ModerationStatus::Active,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}
