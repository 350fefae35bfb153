/// Moderation Service Library
///
/// Content-moderation backend for the Rallypoint campaign platform: report
/// ingestion with denormalized per-target counters, threshold auto-hide,
/// admin review actions, and the cron-driven appeal escalation sweep.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers (public reports, admin, cron, devices)
/// - `models`: Reports, summaries, targets, and the moderation state machine
/// - `services`: Business logic layer (ingestion, rate limiting, sweep)
/// - `db`: Database access layer and repositories
/// - `cache`: Analytics response caching
/// - `middleware`: JWT authentication and the cron secret guard
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
