//! Database operations for user-account targets

use crate::error::{AppError, Result};
use crate::models::{AccountStatus, UserAccount};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Database operations for user accounts
pub struct UsersDb {
    pool: Arc<PgPool>,
}

impl UsersDb {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<UserAccount> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, username, display_name, avatar_url, reports_count,
                   moderation_status, account_status, hidden_at, banned_by,
                   banned_at, ban_reason, appeal_deadline, appeal_count,
                   created_at
            FROM user_accounts
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        Ok(user)
    }

    pub async fn list_users(
        &self,
        account_status: Option<AccountStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserAccount>> {
        let users = if let Some(status) = account_status {
            sqlx::query_as::<_, UserAccount>(
                r#"
                SELECT id, username, display_name, avatar_url, reports_count,
                       moderation_status, account_status, hidden_at, banned_by,
                       banned_at, ban_reason, appeal_deadline, appeal_count,
                       created_at
                FROM user_accounts
                WHERE account_status = $1
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
            sqlx::query_as::<_, UserAccount>(
                r#"
                SELECT id, username, display_name, avatar_url, reports_count,
                       moderation_status, account_status, hidden_at, banned_by,
                       banned_at, ban_reason, appeal_deadline, appeal_count,
                       created_at
                FROM user_accounts
                ORDER BY created_at DESC
                LIMIT $1 OFFSET $2
                "#,
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&*self.pool)
            .await?
        };

        Ok(users)
    }
}
