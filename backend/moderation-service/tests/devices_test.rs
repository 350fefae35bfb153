//! Integration tests: device token registration

mod common;

use common::setup_test_db;
use moderation_service::db::DevicesDb;
use moderation_service::services::Notifier;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn tokens_upsert_move_between_accounts_and_remove() {
    let pool = setup_test_db().await.expect("test db");
    let devices = DevicesDb::new(Arc::new(pool.clone()));

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    devices
        .register_token(alice, "fcm-token-1", "android")
        .await
        .unwrap();
    devices
        .register_token(alice, "fcm-token-2", "web")
        .await
        .unwrap();
    assert_eq!(devices.tokens_for_user(alice).await.unwrap().len(), 2);

    // Re-registering the same token is idempotent, not a duplicate
    devices
        .register_token(alice, "fcm-token-1", "android")
        .await
        .unwrap();
    assert_eq!(devices.tokens_for_user(alice).await.unwrap().len(), 2);

    // A shared device re-registered by another account moves to it
    devices
        .register_token(bob, "fcm-token-1", "android")
        .await
        .unwrap();
    assert_eq!(devices.tokens_for_user(alice).await.unwrap().len(), 1);
    assert_eq!(devices.tokens_for_user(bob).await.unwrap().len(), 1);

    assert!(devices.remove_token(bob, "fcm-token-1").await.unwrap());
    assert!(!devices.remove_token(bob, "fcm-token-1").await.unwrap());
    assert!(devices.tokens_for_user(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn notifier_without_push_backend_is_a_silent_no_op() {
    let pool = setup_test_db().await.expect("test db");
    let devices = DevicesDb::new(Arc::new(pool.clone()));
    let user = Uuid::new_v4();

    devices
        .register_token(user, "fcm-token-9", "ios")
        .await
        .unwrap();

    // No FCM client configured: must neither error nor panic
    let notifier = Notifier::new(DevicesDb::new(Arc::new(pool.clone())), None);
    notifier
        .notify_user(user, "Your campaign is under review", "Hidden after reports", None)
        .await;
}
