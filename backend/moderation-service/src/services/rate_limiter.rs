//! Sliding-window abuse guard for report submission
//!
//! One row per hashed caller IP holds the caller's recent report attempts.
//! The whole check-then-write sequence runs inside a single transaction,
//! serialized per caller with an advisory lock so concurrent requests from
//! the same IP cannot double-submit past the limit.
//!
//! Failure policy: if the store is unavailable the limiter fails open and
//! admits the report. Availability beats strict abuse prevention here.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{RateLimitDecision, RateLimitEntry, RateLimitReason, TargetType};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::types::Json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Max surviving entries inside the window before rejection
    pub max_reports: usize,
    /// Sliding window length
    pub window_secs: i64,
    /// Row TTL, refreshed on every write
    pub record_ttl_secs: i64,
}

impl From<&Config> for RateLimiterConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_reports: config.rate_limit_max_reports,
            window_secs: config.rate_limit_window_secs,
            record_ttl_secs: config.rate_limit_record_ttl_secs,
        }
    }
}

/// Per-IP sliding-window rate limiter backed by `rate_limit_records`.
pub struct RateLimiter {
    pool: Arc<PgPool>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    pub fn new(pool: Arc<PgPool>, config: RateLimiterConfig) -> Self {
        Self { pool, config }
    }

    /// Check a submission attempt and record it when admitted.
    ///
    /// A caller without an IP signal is always admitted: there is nothing
    /// to key the window on. Store failures also admit (fail open) after
    /// logging.
    pub async fn check_and_record(
        &self,
        client_ip: Option<&str>,
        target_id: Uuid,
        target_type: TargetType,
        user_id: Option<Uuid>,
    ) -> RateLimitDecision {
        let Some(ip) = client_ip else {
            return RateLimitDecision::Allowed;
        };

        let ip_hash = hash_ip(ip);

        match self
            .check_and_record_inner(&ip_hash, target_id, target_type, user_id)
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    target_id = %target_id,
                    "Rate limit store unavailable, failing open"
                );
                RateLimitDecision::Allowed
            }
        }
    }

    async fn check_and_record_inner(
        &self,
        ip_hash: &str,
        target_id: Uuid,
        target_type: TargetType,
        user_id: Option<Uuid>,
    ) -> Result<RateLimitDecision> {
        let now = Utc::now();
        let cutoff = now - Duration::seconds(self.config.window_secs);

        let mut tx = self.pool.begin().await?;

        // Serialize concurrent submissions per caller. An advisory lock
        // covers the first-ever submission too, where there is no row yet
        // to lock with FOR UPDATE.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(ip_hash)
            .execute(&mut *tx)
            .await?;

        let stored: Option<Json<Vec<RateLimitEntry>>> =
            sqlx::query_scalar("SELECT reports FROM rate_limit_records WHERE ip_hash = $1")
                .bind(ip_hash)
                .fetch_optional(&mut *tx)
                .await?;

        let mut entries = stored.map(|json| json.0).unwrap_or_default();
        prune_expired(&mut entries, cutoff);

        if entries.len() >= self.config.max_reports {
            return Ok(RateLimitDecision::Rejected(
                RateLimitReason::RateLimitExceeded,
            ));
        }

        if entries
            .iter()
            .any(|e| e.target_id == target_id && e.target_type == target_type)
        {
            return Ok(RateLimitDecision::Rejected(RateLimitReason::DuplicateReport));
        }

        // Same account reporting the same target from another network is
        // still a duplicate. This read happens before any write is staged.
        if let Some(user_id) = user_id {
            if self
                .user_reported_target(&mut tx, user_id, target_id, target_type, cutoff)
                .await?
            {
                return Ok(RateLimitDecision::Rejected(RateLimitReason::DuplicateReport));
            }
        }

        entries.push(RateLimitEntry {
            target_id,
            target_type,
            timestamp: now,
            user_id,
        });

        let expire_at = now + Duration::seconds(self.config.record_ttl_secs);
        sqlx::query(
            r#"
            INSERT INTO rate_limit_records (ip_hash, reports, expire_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (ip_hash)
            DO UPDATE SET reports = EXCLUDED.reports, expire_at = EXCLUDED.expire_at
            "#,
        )
        .bind(ip_hash)
        .bind(Json(&entries))
        .bind(expire_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RateLimitDecision::Allowed)
    }

    async fn user_reported_target(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        target_id: Uuid,
        target_type: TargetType,
        cutoff: DateTime<Utc>,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM rate_limit_records r,
                     jsonb_array_elements(r.reports) AS entry
                WHERE entry->>'user_id' = $1
                  AND entry->>'target_id' = $2
                  AND entry->>'target_type' = $3
                  AND (entry->>'timestamp')::timestamptz > $4
            )
            "#,
        )
        .bind(user_id.to_string())
        .bind(target_id.to_string())
        .bind(target_type.as_str())
        .bind(cutoff)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::from)?;

        Ok(exists)
    }

    /// Purge rows whose TTL expired. Called opportunistically by the sweep.
    pub async fn purge_expired_records(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM rate_limit_records WHERE expire_at < NOW()")
            .execute(&*self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Drop entries whose timestamp fell out of the sliding window.
fn prune_expired(entries: &mut Vec<RateLimitEntry>, cutoff: DateTime<Utc>) {
    entries.retain(|e| e.timestamp > cutoff);
}

/// Hash an IP before storage; raw addresses are never persisted or logged.
fn hash_ip(ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: DateTime<Utc>) -> RateLimitEntry {
        RateLimitEntry {
            target_id: Uuid::new_v4(),
            target_type: TargetType::Campaign,
            timestamp: ts,
            user_id: None,
        }
    }

    #[test]
    fn prune_drops_only_stale_entries() {
        let now = Utc::now();
        let cutoff = now - Duration::hours(1);
        let mut entries = vec![
            entry(now - Duration::hours(2)),
            entry(now - Duration::minutes(59)),
            entry(now),
        ];

        prune_expired(&mut entries, cutoff);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.timestamp > cutoff));
    }

    #[test]
    fn prune_handles_empty_window() {
        let now = Utc::now();
        let mut entries = vec![entry(now - Duration::hours(3))];
        prune_expired(&mut entries, now - Duration::hours(1));
        assert!(entries.is_empty());
    }

    #[test]
    fn ip_hash_is_stable_and_opaque() {
        let a = hash_ip("203.0.113.7");
        let b = hash_ip("203.0.113.7");
        let c = hash_ip("203.0.113.8");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.contains("203"));
        assert_eq!(a.len(), 64);
    }
}
