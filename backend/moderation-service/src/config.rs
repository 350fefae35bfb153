use serde::Deserialize;
use std::env;

/// Runtime configuration for the moderation service.
///
/// Everything is environment-driven; each knob falls back to the value the
/// platform runs with in production. `DATABASE_URL` is consumed by the
/// `db-pool` crate and intentionally not duplicated here.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server configuration
    pub host: String,
    pub port: u16,

    // Redis (analytics cache)
    pub redis_url: String,

    // Auth
    pub jwt_public_key_pem: String,
    /// Static shared secret for the cron sweep endpoint, distinct from user auth
    pub cron_secret: String,

    // Push delivery (optional; absent key disables outbound push)
    pub fcm_server_key: Option<String>,
    pub fcm_endpoint: Option<String>,

    // Auto-hide thresholds (kept separate on purpose; product tuned them
    // independently for campaigns and profiles)
    pub campaign_auto_hide_threshold: i32,
    pub profile_auto_hide_threshold: i32,

    // Appeal escalation
    pub appeal_window_days: i64,
    pub sweep_timeout_secs: u64,

    // Report rate limiting
    pub rate_limit_max_reports: usize,
    pub rate_limit_window_secs: i64,
    pub rate_limit_record_ttl_secs: i64,

    // Analytics cache
    pub analytics_cache_ttl_secs: u64,

    // CORS
    pub allowed_origins: String,

    // Service configuration
    pub service_name: String,
    pub environment: String,
    pub json_logs: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8087".to_string())
                .parse()
                .unwrap_or(8087),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            jwt_public_key_pem: env::var("JWT_PUBLIC_KEY_PEM")
                .map_err(|_| ConfigError::MissingVar("JWT_PUBLIC_KEY_PEM"))?,
            cron_secret: env::var("CRON_SECRET")
                .map_err(|_| ConfigError::MissingVar("CRON_SECRET"))?,
            fcm_server_key: env::var("FCM_SERVER_KEY").ok(),
            fcm_endpoint: env::var("FCM_ENDPOINT").ok(),
            campaign_auto_hide_threshold: env::var("CAMPAIGN_AUTO_HIDE_THRESHOLD")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            profile_auto_hide_threshold: env::var("PROFILE_AUTO_HIDE_THRESHOLD")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            appeal_window_days: env::var("APPEAL_WINDOW_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            sweep_timeout_secs: env::var("SWEEP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            rate_limit_max_reports: env::var("RATE_LIMIT_MAX_REPORTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            rate_limit_record_ttl_secs: env::var("RATE_LIMIT_RECORD_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86400),
            analytics_cache_ttl_secs: env::var("ANALYTICS_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(120),
            allowed_origins: env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "moderation-service".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            json_logs: env::var("JSON_LOGS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global, so the two assertions live
    // in one test to keep them from racing under the parallel test runner.
    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_PUBLIC_KEY_PEM", "test-key");
        env::remove_var("CRON_SECRET");
        assert!(Config::from_env().is_err());

        env::set_var("CRON_SECRET", "test-secret");
        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 8087);
        assert_eq!(config.campaign_auto_hide_threshold, 3);
        assert_eq!(config.profile_auto_hide_threshold, 10);
        assert_eq!(config.appeal_window_days, 30);
        assert_eq!(config.rate_limit_max_reports, 5);
    }
}
