use super::target::{ModerationStatus, TargetType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Review state of an aggregate, independent of the target's own status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "summary_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    Pending,
    Resolved,
    Dismissed,
}

impl SummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStatus::Pending => "pending",
            SummaryStatus::Resolved => "resolved",
            SummaryStatus::Dismissed => "dismissed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SummaryStatus::Pending),
            "resolved" => Some(SummaryStatus::Resolved),
            "dismissed" => Some(SummaryStatus::Dismissed),
            _ => None,
        }
    }

    /// A closed summary reopens as a fresh cycle when a new report arrives.
    pub fn is_closed(&self) -> bool {
        matches!(self, SummaryStatus::Resolved | SummaryStatus::Dismissed)
    }
}

/// Denormalized aggregate of all reports against one target.
///
/// Display fields (`target_title`, `target_image`, `target_slug`) are cached
/// hints refreshed opportunistically on write; `moderation_status` is
/// refreshed from the live target at read time and never trusted stale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReportSummary {
    /// `"{type}-{target_id}"`
    pub id: String,
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub report_count: i32,
    pub first_reported_at: DateTime<Utc>,
    pub last_reported_at: DateTime<Utc>,
    pub status: SummaryStatus,
    pub target_title: Option<String>,
    pub target_image: Option<String>,
    pub target_slug: Option<String>,
    /// Campaign creator; absent for profile targets
    pub creator_id: Option<Uuid>,
    pub moderation_status: ModerationStatus,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
    pub resolution_note: Option<String>,
}

/// Canonical summary document id for a target.
pub fn summary_id(target_type: TargetType, target_id: Uuid) -> String {
    format!("{}-{}", target_type.as_str(), target_id)
}

/// Split a summary id back into its target coordinates. The UUID part
/// itself contains hyphens, so only the first separator counts.
pub fn parse_summary_id(id: &str) -> Option<(TargetType, Uuid)> {
    let (kind, raw_id) = id.split_once('-')?;
    let target_type = match kind {
        "campaign" => TargetType::Campaign,
        "profile" => TargetType::Profile,
        _ => return None,
    };
    let target_id = Uuid::parse_str(raw_id).ok()?;
    Some((target_type, target_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_id_embeds_type_and_target() {
        let id = Uuid::new_v4();
        assert_eq!(
            summary_id(TargetType::Campaign, id),
            format!("campaign-{}", id)
        );
        assert_eq!(
            summary_id(TargetType::Profile, id),
            format!("profile-{}", id)
        );
    }

    #[test]
    fn summary_id_round_trips_through_parse() {
        let id = Uuid::new_v4();
        let encoded = summary_id(TargetType::Campaign, id);
        assert_eq!(parse_summary_id(&encoded), Some((TargetType::Campaign, id)));
        assert_eq!(parse_summary_id("campaign-not-a-uuid"), None);
        assert_eq!(parse_summary_id("widget-00000000-0000-0000-0000-000000000000"), None);
        assert_eq!(parse_summary_id("campaign"), None);
    }

    #[test]
    fn closed_summaries_reopen() {
        assert!(SummaryStatus::Resolved.is_closed());
        assert!(SummaryStatus::Dismissed.is_closed());
        assert!(!SummaryStatus::Pending.is_closed());
    }
}
