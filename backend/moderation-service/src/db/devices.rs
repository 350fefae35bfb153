//! Database operations for push device tokens

use crate::error::Result;
use crate::models::DeviceToken;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Database operations for device tokens
pub struct DevicesDb {
    pool: Arc<PgPool>,
}

impl DevicesDb {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Register a device token. A token re-registered by another account
    /// moves to that account (shared devices).
    pub async fn register_token(
        &self,
        user_id: Uuid,
        token: &str,
        device_type: &str,
    ) -> Result<DeviceToken> {
        let device = sqlx::query_as::<_, DeviceToken>(
            r#"
            INSERT INTO device_tokens (id, user_id, token, device_type, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (token)
            DO UPDATE SET user_id = EXCLUDED.user_id, device_type = EXCLUDED.device_type
            RETURNING id, user_id, token, device_type, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token)
        .bind(device_type)
        .fetch_one(&*self.pool)
        .await?;

        tracing::info!(user_id = %user_id, device_type = %device_type, "Device token registered");

        Ok(device)
    }

    /// Remove a token. Returns whether a row was deleted.
    pub async fn remove_token(&self, user_id: Uuid, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM device_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(&*self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All registered tokens for a user.
    pub async fn tokens_for_user(&self, user_id: Uuid) -> Result<Vec<String>> {
        let tokens: Vec<String> =
            sqlx::query_scalar("SELECT token FROM device_tokens WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&*self.pool)
                .await?;

        Ok(tokens)
    }
}
