//! Domain services
//!
//! Each service owns its transactional SQL; the invariants live next to
//! the writes that enforce them.

pub mod analytics;
pub mod moderation;
pub mod notifier;
pub mod rate_limiter;
pub mod report_ingestion;
pub mod sweeper;

pub use analytics::AnalyticsService;
pub use moderation::ModerationService;
pub use notifier::Notifier;
pub use rate_limiter::{RateLimiter, RateLimiterConfig};
pub use report_ingestion::ReportIngestion;
pub use sweeper::{SweepOutcome, Sweeper};
