//! Best-effort push notifications
//!
//! Delivery failures are logged and swallowed: a push that cannot be sent
//! must never fail or roll back the moderation action that triggered it.

use crate::db::DevicesDb;
use push_shared::{FcmClient, PushMessage};
use uuid::Uuid;

pub struct Notifier {
    devices: DevicesDb,
    /// Absent when no FCM key is configured (local development)
    fcm: Option<FcmClient>,
}

impl Notifier {
    pub fn new(devices: DevicesDb, fcm: Option<FcmClient>) -> Self {
        Self { devices, fcm }
    }

    /// Send a push to every device registered for a user.
    pub async fn notify_user(
        &self,
        user_id: Uuid,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) {
        let Some(fcm) = &self.fcm else {
            tracing::debug!(user_id = %user_id, "Push delivery disabled, skipping notification");
            return;
        };

        let tokens = match self.devices.tokens_for_user(user_id).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load device tokens");
                return;
            }
        };

        if tokens.is_empty() {
            tracing::debug!(user_id = %user_id, "No registered devices, skipping notification");
            return;
        }

        let mut message = PushMessage::new(title, body);
        if let Some(data) = data {
            message = message.with_data(data);
        }

        for token in tokens {
            if let Err(e) = fcm.send(&token, &message).await {
                tracing::warn!(user_id = %user_id, error = %e, "Push delivery failed");
            }
        }
    }
}
