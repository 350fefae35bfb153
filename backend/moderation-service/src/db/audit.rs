//! Append-only audit trail for moderation actions

use crate::error::Result;
use crate::models::{AuditAction, AuditLogEntry, TargetType};
use sqlx::{PgPool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

/// Append an audit entry on any executor (pool or open transaction).
///
/// Transactional callers pass `&mut *tx` so the entry commits or rolls
/// back together with the state change it records.
pub async fn append_entry<'e, E>(
    executor: E,
    actor: &str,
    action: AuditAction,
    target_type: TargetType,
    target_id: Uuid,
    details: Option<serde_json::Value>,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, actor, action, target_type, target_id, details, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(actor)
    .bind(action.as_str())
    .bind(target_type)
    .bind(target_id)
    .bind(details)
    .execute(executor)
    .await?;

    Ok(())
}

/// Read access to the audit trail
pub struct AuditDb {
    pool: Arc<PgPool>,
}

impl AuditDb {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn list_for_target(
        &self,
        target_type: TargetType,
        target_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, actor, action, target_type, target_id, details, created_at
            FROM audit_logs
            WHERE target_type = $1 AND target_id = $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(target_type)
        .bind(target_id)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;

        Ok(entries)
    }
}
