//! Integration tests: report ingestion
//!
//! Coverage:
//! - Report insert + denormalized counter + summary creation
//! - Auto-hide fires exactly once when the threshold is crossed
//! - Closed summaries reopen as a fresh cycle (count restarts at 1)
//! - Concurrent submissions never lose counter updates
//! - Validation and missing-target failures happen without side effects
//! - Campaign deletion cascades into summary + report dismissal

mod common;

use common::{create_campaign, create_user, setup_test_db};
use moderation_service::db::{DevicesDb, SummariesDb};
use moderation_service::error::AppError;
use moderation_service::models::{
    summary_id, ModerationStatus, SubmitReportInput, SummaryStatus, TargetType,
};
use moderation_service::services::{ModerationService, Notifier, ReportIngestion};
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

fn ingestion(pool: &Pool<Postgres>) -> Arc<ReportIngestion> {
    let pool = Arc::new(pool.clone());
    let notifier = Arc::new(Notifier::new(DevicesDb::new(pool.clone()), None));
    Arc::new(ReportIngestion::new(pool, notifier, 3, 10))
}

fn campaign_report(target_id: Uuid, reason: &str) -> SubmitReportInput {
    SubmitReportInput {
        target_type: TargetType::Campaign,
        target_id,
        reporter_id: Some(Uuid::new_v4()),
        reason: reason.to_string(),
        details: None,
    }
}

async fn campaign_state(pool: &Pool<Postgres>, id: Uuid) -> (i32, ModerationStatus) {
    sqlx::query_as("SELECT reports_count, moderation_status FROM campaigns WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("campaign row")
}

#[tokio::test]
async fn first_report_creates_summary_and_counts() {
    let pool = setup_test_db().await.expect("test db");
    let service = ingestion(&pool);
    let campaign_id = create_campaign(&pool, Uuid::new_v4()).await;

    let outcome = service
        .submit_report(campaign_report(campaign_id, "fraud"))
        .await
        .expect("submit succeeds");
    assert!(!outcome.auto_hidden);

    let (count, status) = campaign_state(&pool, campaign_id).await;
    assert_eq!(count, 1);
    assert_eq!(status, ModerationStatus::Active);

    let summaries = SummariesDb::new(Arc::new(pool.clone()));
    let summary = summaries
        .get_summary(&summary_id(TargetType::Campaign, campaign_id))
        .await
        .expect("summary exists");
    assert_eq!(summary.report_count, 1);
    assert_eq!(summary.status, SummaryStatus::Pending);
    assert_eq!(summary.target_title.as_deref(), Some("Clean water for Westbrook"));
}

#[tokio::test]
async fn auto_hide_fires_exactly_once_at_threshold() {
    let pool = setup_test_db().await.expect("test db");
    let service = ingestion(&pool);
    let campaign_id = create_campaign(&pool, Uuid::new_v4()).await;

    let first = service
        .submit_report(campaign_report(campaign_id, "fraud"))
        .await
        .unwrap();
    let second = service
        .submit_report(campaign_report(campaign_id, "spam"))
        .await
        .unwrap();
    assert!(!first.auto_hidden);
    assert!(!second.auto_hidden);

    // Third report crosses the campaign threshold
    let third = service
        .submit_report(campaign_report(campaign_id, "misleading"))
        .await
        .unwrap();
    assert!(third.auto_hidden);

    let (count, status) = campaign_state(&pool, campaign_id).await;
    assert_eq!(count, 3);
    assert_eq!(status, ModerationStatus::UnderReviewHidden);

    // A fourth report does not re-fire the transition
    let fourth = service
        .submit_report(campaign_report(campaign_id, "other"))
        .await
        .unwrap();
    assert!(!fourth.auto_hidden);

    let (count, status) = campaign_state(&pool, campaign_id).await;
    assert_eq!(count, 4);
    assert_eq!(status, ModerationStatus::UnderReviewHidden);

    // Exactly one auto_hide audit entry
    let hides: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_logs WHERE target_id = $1 AND action = 'auto_hide'",
    )
    .bind(campaign_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(hides, 1);
}

#[tokio::test]
async fn profile_threshold_is_higher_than_campaign_threshold() {
    let pool = setup_test_db().await.expect("test db");
    let service = ingestion(&pool);
    let user_id = create_user(&pool).await;

    for i in 0..9 {
        let outcome = service
            .submit_report(SubmitReportInput {
                target_type: TargetType::Profile,
                target_id: user_id,
                reporter_id: Some(Uuid::new_v4()),
                reason: "harassment".to_string(),
                details: Some(format!("incident {}", i)),
            })
            .await
            .unwrap();
        assert!(!outcome.auto_hidden, "report {} must not hide", i + 1);
    }

    let tenth = service
        .submit_report(SubmitReportInput {
            target_type: TargetType::Profile,
            target_id: user_id,
            reporter_id: Some(Uuid::new_v4()),
            reason: "harassment".to_string(),
            details: None,
        })
        .await
        .unwrap();
    assert!(tenth.auto_hidden);
}

#[tokio::test]
async fn resolved_summary_reopens_as_fresh_cycle() {
    let pool = setup_test_db().await.expect("test db");
    let service = ingestion(&pool);
    let campaign_id = create_campaign(&pool, Uuid::new_v4()).await;
    let summaries = SummariesDb::new(Arc::new(pool.clone()));
    let sid = summary_id(TargetType::Campaign, campaign_id);

    service
        .submit_report(campaign_report(campaign_id, "fraud"))
        .await
        .unwrap();
    service
        .submit_report(campaign_report(campaign_id, "spam"))
        .await
        .unwrap();

    let before = summaries.get_summary(&sid).await.unwrap();
    assert_eq!(before.report_count, 2);

    summaries
        .resolve_summary(&sid, Uuid::new_v4(), SummaryStatus::Resolved, Some("reviewed, fine"))
        .await
        .unwrap();

    service
        .submit_report(campaign_report(campaign_id, "misleading"))
        .await
        .unwrap();

    let after = summaries.get_summary(&sid).await.unwrap();
    assert_eq!(after.report_count, 1);
    assert_eq!(after.status, SummaryStatus::Pending);
    assert!(after.first_reported_at > before.first_reported_at);
    assert!(after.resolved_at.is_none());
    assert!(after.resolution_note.is_none());
}

#[tokio::test]
async fn concurrent_reports_never_lose_counter_updates() {
    let pool = setup_test_db().await.expect("test db");
    let service = ingestion(&pool);
    let campaign_id = create_campaign(&pool, Uuid::new_v4()).await;

    const N: usize = 12;
    let mut tasks = Vec::new();
    for _ in 0..N {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            service
                .submit_report(campaign_report(campaign_id, "spam"))
                .await
        }));
    }

    for task in tasks {
        task.await.expect("task").expect("submit succeeds");
    }

    let (count, _) = campaign_state(&pool, campaign_id).await;
    assert_eq!(count, N as i32);

    let summaries = SummariesDb::new(Arc::new(pool.clone()));
    let summary = summaries
        .get_summary(&summary_id(TargetType::Campaign, campaign_id))
        .await
        .unwrap();
    assert_eq!(summary.report_count, N as i32);

    // Concurrency must not double-fire the hide transition either
    let hides: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_logs WHERE target_id = $1 AND action = 'auto_hide'",
    )
    .bind(campaign_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(hides, 1);
}

#[tokio::test]
async fn invalid_reason_and_missing_target_leave_no_trace() {
    let pool = setup_test_db().await.expect("test db");
    let service = ingestion(&pool);
    let campaign_id = create_campaign(&pool, Uuid::new_v4()).await;

    // Profile-only reason on a campaign report
    let err = service
        .submit_report(campaign_report(campaign_id, "harassment"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    // Unknown target
    let err = service
        .submit_report(campaign_report(Uuid::new_v4(), "fraud"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let reports: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reports, 0);

    let (count, _) = campaign_state(&pool, campaign_id).await;
    assert_eq!(count, 0);
}

#[tokio::test]
async fn campaign_deletion_cascades_to_summary_and_reports() {
    let pool = setup_test_db().await.expect("test db");
    let service = ingestion(&pool);
    let campaign_id = create_campaign(&pool, Uuid::new_v4()).await;

    service
        .submit_report(campaign_report(campaign_id, "fraud"))
        .await
        .unwrap();
    service
        .submit_report(campaign_report(campaign_id, "spam"))
        .await
        .unwrap();

    let moderation = ModerationService::new(Arc::new(pool.clone()), 30);
    let admin = Uuid::new_v4();
    let dismissed = moderation
        .delete_campaign(&admin.to_string(), campaign_id)
        .await
        .expect("delete succeeds");
    assert_eq!(dismissed, 2);

    let dismissed_rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reports \
         WHERE target_id = $1 AND status = 'dismissed' AND action = 'target deleted'",
    )
    .bind(campaign_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(dismissed_rows, 2);

    let (status, moderation_status): (SummaryStatus, ModerationStatus) = sqlx::query_as(
        "SELECT status, moderation_status FROM report_summaries WHERE id = $1",
    )
    .bind(summary_id(TargetType::Campaign, campaign_id))
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(status, SummaryStatus::Dismissed);
    assert_eq!(moderation_status, ModerationStatus::Deleted);

    // Reporting a deleted campaign fails with NotFound
    let err = service
        .submit_report(campaign_report(campaign_id, "fraud"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
