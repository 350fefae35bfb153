//! Externally-triggered periodic jobs
//!
//! The appeal escalation sweep is invoked by the platform scheduler over
//! HTTP. The endpoint is guarded by a static shared secret (never user
//! auth) and enforces a hard execution ceiling, since the sweep iterates
//! an unbounded set.

use super::ApiResponse;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::verify_cron_secret;
use crate::services::Sweeper;
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use std::time::Duration;

/// Promote expired temporary removals/bans to permanent
///
/// GET /cron/cleanup-expired-appeals
pub async fn cleanup_expired_appeals(
    req: HttpRequest,
    config: web::Data<Config>,
    sweeper: web::Data<Arc<Sweeper>>,
) -> Result<HttpResponse> {
    if !verify_cron_secret(&req, &config.cron_secret) {
        return Err(AppError::Unauthorized(
            "Invalid or missing cron secret".to_string(),
        ));
    }

    let ceiling = Duration::from_secs(config.sweep_timeout_secs);
    let outcome = match tokio::time::timeout(ceiling, sweeper.run_sweep()).await {
        Ok(outcome) => outcome,
        Err(_) => {
            metrics::record_sweep_run("timeout");
            tracing::error!(
                ceiling_secs = config.sweep_timeout_secs,
                "Appeal escalation sweep exceeded its execution ceiling"
            );
            return Err(AppError::SweepTimeout(format!(
                "Sweep did not finish within {}s",
                config.sweep_timeout_secs
            )));
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(outcome)))
}
