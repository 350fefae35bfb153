//! Moderation targets: campaigns and user profiles.
//!
//! Both target kinds carry the same report counter / moderation status
//! layering; user accounts additionally carry an account-level ban status
//! with its own (one-way) escalation to permanent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What a report points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "target_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Campaign,
    Profile,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Campaign => "campaign",
            TargetType::Profile => "profile",
        }
    }
}

/// Content-level moderation status shared by campaigns and profiles.
///
/// `deleted` is reserved for soft-deleted targets (and the summaries that
/// point at them); it is never a legal admin transition input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "moderation_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ModerationStatus {
    Active,
    UnderReview,
    UnderReviewHidden,
    Removed,
    RemovedTemporary,
    RemovedPermanent,
    Deleted,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Active => "active",
            ModerationStatus::UnderReview => "under-review",
            ModerationStatus::UnderReviewHidden => "under-review-hidden",
            ModerationStatus::Removed => "removed",
            ModerationStatus::RemovedTemporary => "removed-temporary",
            ModerationStatus::RemovedPermanent => "removed-permanent",
            ModerationStatus::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ModerationStatus::Active),
            "under-review" => Some(ModerationStatus::UnderReview),
            "under-review-hidden" => Some(ModerationStatus::UnderReviewHidden),
            "removed" => Some(ModerationStatus::Removed),
            "removed-temporary" => Some(ModerationStatus::RemovedTemporary),
            "removed-permanent" => Some(ModerationStatus::RemovedPermanent),
            "deleted" => Some(ModerationStatus::Deleted),
            _ => None,
        }
    }

    /// Validate a state transition.
    ///
    /// `removed-permanent` and `deleted` are terminal; everything else
    /// moves along the review/removal edges. Self-transitions are not
    /// edges.
    pub fn can_transition_to(&self, new_status: ModerationStatus) -> bool {
        use ModerationStatus::*;
        matches!(
            (self, new_status),
            (Active, UnderReview)
                | (Active, UnderReviewHidden)
                | (Active, Removed)
                | (Active, RemovedTemporary)
                | (UnderReview, Active)
                | (UnderReview, UnderReviewHidden)
                | (UnderReview, Removed)
                | (UnderReview, RemovedTemporary)
                | (UnderReviewHidden, Active)
                | (UnderReviewHidden, UnderReview)
                | (UnderReviewHidden, Removed)
                | (UnderReviewHidden, RemovedTemporary)
                | (Removed, Active)
                | (RemovedTemporary, Active)
                | (RemovedTemporary, RemovedPermanent)
        )
    }

    /// States that stamp removal bookkeeping (`removed_by` / `removed_at` /
    /// `remove_reason`).
    pub fn is_removed_state(&self) -> bool {
        matches!(
            self,
            ModerationStatus::Removed
                | ModerationStatus::RemovedTemporary
                | ModerationStatus::RemovedPermanent
        )
    }

    /// States that hide content from public listings.
    pub fn is_hidden_state(&self) -> bool {
        !matches!(self, ModerationStatus::Active | ModerationStatus::UnderReview)
    }
}

/// Account-level status for user targets. `banned-permanent` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum AccountStatus {
    Active,
    BannedTemporary,
    BannedPermanent,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::BannedTemporary => "banned-temporary",
            AccountStatus::BannedPermanent => "banned-permanent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(AccountStatus::Active),
            "banned-temporary" => Some(AccountStatus::BannedTemporary),
            "banned-permanent" => Some(AccountStatus::BannedPermanent),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, new_status: AccountStatus) -> bool {
        use AccountStatus::*;
        matches!(
            (self, new_status),
            (Active, BannedTemporary)
                | (Active, BannedPermanent)
                | (BannedTemporary, Active)
                | (BannedTemporary, BannedPermanent)
        )
    }

    pub fn is_banned_state(&self) -> bool {
        matches!(
            self,
            AccountStatus::BannedTemporary | AccountStatus::BannedPermanent
        )
    }
}

/// Campaign record with moderation fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub reports_count: i32,
    pub moderation_status: ModerationStatus,
    pub hidden_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub remove_reason: Option<String>,
    pub appeal_deadline: Option<DateTime<Utc>>,
    pub appeal_count: i32,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// User account record with moderation fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub reports_count: i32,
    pub moderation_status: ModerationStatus,
    pub account_status: AccountStatus,
    pub hidden_at: Option<DateTime<Utc>>,
    pub banned_by: Option<Uuid>,
    pub banned_at: Option<DateTime<Utc>>,
    pub ban_reason: Option<String>,
    pub appeal_deadline: Option<DateTime<Utc>>,
    pub appeal_count: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_auto_hide_edge_exists() {
        assert!(ModerationStatus::Active.can_transition_to(ModerationStatus::UnderReviewHidden));
    }

    #[test]
    fn admin_can_remove_directly_without_hiding() {
        assert!(ModerationStatus::Active.can_transition_to(ModerationStatus::Removed));
        assert!(ModerationStatus::Active.can_transition_to(ModerationStatus::RemovedTemporary));
    }

    #[test]
    fn restore_clears_through_defined_edges_only() {
        assert!(ModerationStatus::UnderReviewHidden.can_transition_to(ModerationStatus::Active));
        assert!(ModerationStatus::Removed.can_transition_to(ModerationStatus::Active));
        assert!(ModerationStatus::RemovedTemporary.can_transition_to(ModerationStatus::Active));
    }

    #[test]
    fn permanent_removal_is_terminal() {
        let terminal = ModerationStatus::RemovedPermanent;
        for next in [
            ModerationStatus::Active,
            ModerationStatus::UnderReview,
            ModerationStatus::UnderReviewHidden,
            ModerationStatus::Removed,
            ModerationStatus::RemovedTemporary,
            ModerationStatus::Deleted,
        ] {
            assert!(!terminal.can_transition_to(next));
        }
    }

    #[test]
    fn only_temporary_removal_escalates_to_permanent() {
        assert!(
            ModerationStatus::RemovedTemporary.can_transition_to(ModerationStatus::RemovedPermanent)
        );
        assert!(!ModerationStatus::Removed.can_transition_to(ModerationStatus::RemovedPermanent));
        assert!(!ModerationStatus::Active.can_transition_to(ModerationStatus::RemovedPermanent));
    }

    #[test]
    fn deleted_is_never_a_transition_target() {
        for from in [
            ModerationStatus::Active,
            ModerationStatus::UnderReview,
            ModerationStatus::UnderReviewHidden,
            ModerationStatus::Removed,
            ModerationStatus::RemovedTemporary,
        ] {
            assert!(!from.can_transition_to(ModerationStatus::Deleted));
        }
    }

    #[test]
    fn permanent_ban_is_terminal_and_one_way() {
        assert!(AccountStatus::BannedTemporary.can_transition_to(AccountStatus::BannedPermanent));
        assert!(!AccountStatus::BannedPermanent.can_transition_to(AccountStatus::Active));
        assert!(!AccountStatus::BannedPermanent.can_transition_to(AccountStatus::BannedTemporary));
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            ModerationStatus::Active,
            ModerationStatus::UnderReview,
            ModerationStatus::UnderReviewHidden,
            ModerationStatus::Removed,
            ModerationStatus::RemovedTemporary,
            ModerationStatus::RemovedPermanent,
            ModerationStatus::Deleted,
        ] {
            assert_eq!(ModerationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ModerationStatus::parse("nonsense"), None);

        for status in [
            AccountStatus::Active,
            AccountStatus::BannedTemporary,
            AccountStatus::BannedPermanent,
        ] {
            assert_eq!(AccountStatus::parse(status.as_str()), Some(status));
        }
    }
}
