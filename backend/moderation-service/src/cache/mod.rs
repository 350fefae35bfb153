//! Redis-backed response cache for the analytics endpoint.
//!
//! The cache is best-effort: a Redis failure is logged and treated as a
//! miss so the endpoint falls back to live counts.

use redis::aio::ConnectionManager;
use serde::de::DeserializeOwned;
use serde::Serialize;

const ANALYTICS_KEY: &str = "moderation:analytics:overview";

#[derive(Clone)]
pub struct AnalyticsCache {
    redis: ConnectionManager,
    ttl_secs: u64,
}

impl AnalyticsCache {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    pub async fn get<T: DeserializeOwned>(&self) -> Option<T> {
        let mut conn = self.redis.clone();

        let cached: Option<String> = match redis::cmd("GET")
            .arg(ANALYTICS_KEY)
            .query_async(&mut conn)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Analytics cache read failed");
                return None;
            }
        };

        let raw = cached?;
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "Analytics cache entry corrupt, ignoring");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, snapshot: &T) {
        let payload = match serde_json::to_string(snapshot) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize analytics snapshot");
                return;
            }
        };

        let mut conn = self.redis.clone();
        if let Err(e) = redis::cmd("SETEX")
            .arg(ANALYTICS_KEY)
            .arg(self.ttl_secs)
            .arg(payload)
            .query_async::<_, ()>(&mut conn)
            .await
        {
            tracing::warn!(error = %e, "Analytics cache write failed");
        }
    }
}
