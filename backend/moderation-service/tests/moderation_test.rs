//! Integration tests: admin moderation state transitions
//!
//! Coverage:
//! - Temporary removal stamps bookkeeping and opens the appeal window
//! - Restoration clears every moderation field
//! - Disallowed edges are rejected without touching the row
//! - Account bans mirror the same lifecycle on user targets

mod common;

use common::{create_campaign, create_user, setup_test_db};
use moderation_service::error::AppError;
use moderation_service::models::{AccountStatus, ModerationStatus};
use moderation_service::services::ModerationService;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

fn service(pool: &Pool<Postgres>) -> ModerationService {
    ModerationService::new(Arc::new(pool.clone()), 30)
}

#[tokio::test]
async fn temporary_removal_stamps_bookkeeping_and_restore_clears_it() {
    let pool = setup_test_db().await.expect("test db");
    let moderation = service(&pool);
    let admin = Uuid::new_v4();
    let campaign_id = create_campaign(&pool, Uuid::new_v4()).await;

    let removed = moderation
        .set_campaign_status(
            admin,
            campaign_id,
            ModerationStatus::RemovedTemporary,
            Some("misleading fundraising goal"),
        )
        .await
        .expect("transition allowed");

    assert_eq!(removed.moderation_status, ModerationStatus::RemovedTemporary);
    assert_eq!(removed.removed_by, Some(admin));
    assert_eq!(
        removed.remove_reason.as_deref(),
        Some("misleading fundraising goal")
    );
    assert_eq!(removed.appeal_count, 0);
    let deadline = removed.appeal_deadline.expect("appeal window opened");
    let days_out = (deadline - chrono::Utc::now()).num_days();
    assert!((29..=30).contains(&days_out), "deadline ~30 days out, got {}", days_out);

    let restored = moderation
        .set_campaign_status(admin, campaign_id, ModerationStatus::Active, None)
        .await
        .expect("restore allowed");

    assert_eq!(restored.moderation_status, ModerationStatus::Active);
    assert!(restored.removed_by.is_none());
    assert!(restored.removed_at.is_none());
    assert!(restored.remove_reason.is_none());
    assert!(restored.appeal_deadline.is_none());
    assert!(restored.hidden_at.is_none());

    // Both transitions are on the audit trail, attributed to the admin
    let entries: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_logs
         WHERE target_id = $1 AND action = 'set_status' AND actor = $2",
    )
    .bind(campaign_id)
    .bind(admin.to_string())
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(entries, 2);
}

#[tokio::test]
async fn disallowed_edges_are_rejected_before_writes() {
    let pool = setup_test_db().await.expect("test db");
    let moderation = service(&pool);
    let admin = Uuid::new_v4();
    let campaign_id = create_campaign(&pool, Uuid::new_v4()).await;

    // active -> removed-permanent is not an edge; escalation goes through
    // removed-temporary
    let err = moderation
        .set_campaign_status(
            admin,
            campaign_id,
            ModerationStatus::RemovedPermanent,
            Some("spam"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    // 'deleted' is never an admin transition input
    let err = moderation
        .set_campaign_status(admin, campaign_id, ModerationStatus::Deleted, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let status: ModerationStatus =
        sqlx::query_scalar("SELECT moderation_status FROM campaigns WHERE id = $1")
            .bind(campaign_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, ModerationStatus::Active);

    let audit_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(audit_rows, 0);

    let err = moderation
        .set_campaign_status(admin, Uuid::new_v4(), ModerationStatus::Removed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn hidden_campaign_can_be_removed_or_restored() {
    let pool = setup_test_db().await.expect("test db");
    let moderation = service(&pool);
    let admin = Uuid::new_v4();
    let campaign_id = create_campaign(&pool, Uuid::new_v4()).await;

    let hidden = moderation
        .set_campaign_status(admin, campaign_id, ModerationStatus::UnderReviewHidden, None)
        .await
        .unwrap();
    assert!(hidden.hidden_at.is_some());

    // Unhide into plain review
    let reviewing = moderation
        .set_campaign_status(admin, campaign_id, ModerationStatus::UnderReview, None)
        .await
        .unwrap();
    assert!(reviewing.hidden_at.is_none());

    let removed = moderation
        .set_campaign_status(
            admin,
            campaign_id,
            ModerationStatus::Removed,
            Some("confirmed fraud"),
        )
        .await
        .unwrap();
    assert_eq!(removed.moderation_status, ModerationStatus::Removed);
    // Direct removal has no appeal window
    assert!(removed.appeal_deadline.is_none());
}

#[tokio::test]
async fn account_ban_lifecycle() {
    let pool = setup_test_db().await.expect("test db");
    let moderation = service(&pool);
    let admin = Uuid::new_v4();
    let user_id = create_user(&pool).await;

    let banned = moderation
        .set_account_status(
            admin,
            user_id,
            AccountStatus::BannedTemporary,
            Some("coordinated fake reports"),
        )
        .await
        .unwrap();
    assert_eq!(banned.account_status, AccountStatus::BannedTemporary);
    assert_eq!(banned.banned_by, Some(admin));
    assert!(banned.appeal_deadline.is_some());

    // Escalate to permanent (admin action, not just sweep)
    let permanent = moderation
        .set_account_status(admin, user_id, AccountStatus::BannedPermanent, None)
        .await
        .unwrap();
    assert_eq!(permanent.account_status, AccountStatus::BannedPermanent);
    assert!(permanent.appeal_deadline.is_none());

    // Terminal: no path back
    let err = moderation
        .set_account_status(admin, user_id, AccountStatus::Active, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn restoring_banned_account_unhides_profile() {
    let pool = setup_test_db().await.expect("test db");
    let moderation = service(&pool);
    let admin = Uuid::new_v4();
    let user_id = create_user(&pool).await;

    // Simulate the auto-hide that preceded the ban
    sqlx::query(
        "UPDATE user_accounts
         SET moderation_status = 'under-review-hidden', hidden_at = NOW()
         WHERE id = $1",
    )
    .bind(user_id)
    .execute(&pool)
    .await
    .unwrap();

    moderation
        .set_account_status(admin, user_id, AccountStatus::BannedTemporary, Some("spam"))
        .await
        .unwrap();

    let restored = moderation
        .set_account_status(admin, user_id, AccountStatus::Active, None)
        .await
        .unwrap();

    assert_eq!(restored.account_status, AccountStatus::Active);
    assert_eq!(restored.moderation_status, ModerationStatus::Active);
    assert!(restored.hidden_at.is_none());
    assert!(restored.ban_reason.is_none());
}
