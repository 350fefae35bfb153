//! Domain models for the moderation service

pub mod audit;
pub mod device;
pub mod rate_limit;
pub mod report;
pub mod summary;
pub mod target;

pub use audit::{AuditAction, AuditLogEntry, SYSTEM_ACTOR};
pub use device::DeviceToken;
pub use rate_limit::{RateLimitDecision, RateLimitEntry, RateLimitReason};
pub use report::{
    allowed_reasons, is_valid_reason, Report, ReportOutcome, ReportStatus, SubmitReportInput,
};
pub use summary::{parse_summary_id, summary_id, ReportSummary, SummaryStatus};
pub use target::{AccountStatus, Campaign, ModerationStatus, TargetType, UserAccount};
