use super::target::TargetType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Reserved actor value for automated actions (auto-hide, appeal expiry).
/// Kept as a well-known identity rather than a null actor so the audit
/// schema stays uniform.
pub const SYSTEM_ACTOR: &str = "system";

/// Actions recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    AutoHide,
    SetStatus,
    AutoPermanentRemoval,
    AutoPermanentBan,
    DeleteCampaign,
    ResolveReport,
    ResolveSummary,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::AutoHide => "auto_hide",
            AuditAction::SetStatus => "set_status",
            AuditAction::AutoPermanentRemoval => "auto_permanent_removal",
            AuditAction::AutoPermanentBan => "auto_permanent_ban",
            AuditAction::DeleteCampaign => "delete_campaign",
            AuditAction::ResolveReport => "resolve_report",
            AuditAction::ResolveSummary => "resolve_summary",
        }
    }
}

/// Immutable audit log entry. Append-only; there is no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: Uuid,
    /// Admin UUID string or [`SYSTEM_ACTOR`]
    pub actor: String,
    pub action: String,
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
