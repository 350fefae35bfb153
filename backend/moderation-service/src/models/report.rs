use super::target::TargetType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of an individual report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Reviewed => "reviewed",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReportStatus::Pending),
            "reviewed" => Some(ReportStatus::Reviewed),
            "resolved" => Some(ReportStatus::Resolved),
            "dismissed" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }
}

/// Reasons accepted for campaign reports.
pub const CAMPAIGN_REPORT_REASONS: &[&str] = &[
    "fraud",
    "misleading",
    "inappropriate",
    "spam",
    "copyright",
    "other",
];

/// Reasons accepted for profile reports.
pub const PROFILE_REPORT_REASONS: &[&str] = &[
    "harassment",
    "impersonation",
    "spam",
    "inappropriate",
    "scam",
    "other",
];

pub fn allowed_reasons(target_type: TargetType) -> &'static [&'static str] {
    match target_type {
        TargetType::Campaign => CAMPAIGN_REPORT_REASONS,
        TargetType::Profile => PROFILE_REPORT_REASONS,
    }
}

/// Reason validity is type-dependent: each target kind has its own enum set.
pub fn is_valid_reason(target_type: TargetType, reason: &str) -> bool {
    allowed_reasons(target_type).contains(&reason)
}

/// One user's complaint about one target
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub target_type: TargetType,
    pub target_id: Uuid,
    /// Absent for anonymous reports
    pub reporter_id: Option<Uuid>,
    pub reason: String,
    pub details: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub action: Option<String>,
}

/// Input for report ingestion
#[derive(Debug, Clone)]
pub struct SubmitReportInput {
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub reporter_id: Option<Uuid>,
    pub reason: String,
    pub details: Option<String>,
}

/// Outcome of one ingestion call
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub report_id: Uuid,
    /// True only on the call whose report crossed the auto-hide threshold
    pub auto_hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_sets_are_type_dependent() {
        assert!(is_valid_reason(TargetType::Campaign, "fraud"));
        assert!(is_valid_reason(TargetType::Profile, "harassment"));

        // Campaign reasons are not valid for profiles and vice versa
        assert!(!is_valid_reason(TargetType::Profile, "fraud"));
        assert!(!is_valid_reason(TargetType::Campaign, "harassment"));

        // Shared values are valid for both
        assert!(is_valid_reason(TargetType::Campaign, "spam"));
        assert!(is_valid_reason(TargetType::Profile, "spam"));

        assert!(!is_valid_reason(TargetType::Campaign, ""));
        assert!(!is_valid_reason(TargetType::Campaign, "FRAUD"));
    }
}
