//! Admin query and action endpoints
//!
//! Every route here sits behind `JwtAuthMiddleware`; the `AdminUser`
//! extractor enforces the admin role before a handler body runs. Status
//! strings from request payloads are parsed and rejected before any
//! storage access.

use super::ApiResponse;
use crate::db::{audit, AuditDb, CampaignsDb, ReportsDb, SummariesDb, UsersDb};
use crate::error::{AppError, Result};
use crate::middleware::AdminUser;
use crate::models::{
    parse_summary_id, AccountStatus, AuditAction, ModerationStatus, ReportStatus, SummaryStatus,
    TargetType,
};
use crate::services::{AnalyticsService, ModerationService};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

// =====================================================================
// Report summaries (the moderation queue)
// =====================================================================

#[derive(Debug, Deserialize)]
pub struct ListSummariesQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub target_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List report summaries with live moderation status
///
/// GET /admin/reports
pub async fn list_summaries(
    _admin: AdminUser,
    summaries: web::Data<Arc<SummariesDb>>,
    query: web::Query<ListSummariesQuery>,
) -> Result<HttpResponse> {
    let status = match &query.status {
        Some(raw) => Some(SummaryStatus::parse(raw).ok_or_else(|| {
            AppError::ValidationError(format!("Unknown summary status '{}'", raw))
        })?),
        None => None,
    };
    let target_type = parse_target_type_filter(query.target_type.as_deref())?;
    let (limit, offset) = page(query.limit, query.offset);

    let data = summaries
        .list_summaries(status, target_type, limit, offset)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

/// Individual reports behind one summary
///
/// GET /admin/reports/{summary_id}/detail
pub async fn summary_detail(
    _admin: AdminUser,
    reports: web::Data<Arc<ReportsDb>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let raw = path.into_inner();
    let (target_type, target_id) = parse_summary_id(&raw)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid summary id '{}'", raw)))?;

    let data = reports
        .list_for_target(target_type, target_id, MAX_PAGE_SIZE, 0)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

#[derive(Debug, Deserialize)]
pub struct ResolveSummaryPayload {
    pub status: String,
    pub note: Option<String>,
}

/// Resolve or dismiss a summary
///
/// PATCH /admin/summaries/{id}
pub async fn resolve_summary(
    admin: AdminUser,
    summaries: web::Data<Arc<SummariesDb>>,
    pool: web::Data<Arc<PgPool>>,
    path: web::Path<String>,
    payload: web::Json<ResolveSummaryPayload>,
) -> Result<HttpResponse> {
    let status = SummaryStatus::parse(&payload.status).ok_or_else(|| {
        AppError::ValidationError(format!("Unknown summary status '{}'", payload.status))
    })?;
    if status == SummaryStatus::Pending {
        return Err(AppError::ValidationError(
            "A summary cannot be resolved back to pending".to_string(),
        ));
    }

    let summary = summaries
        .resolve_summary(&path.into_inner(), admin.id, status, payload.note.as_deref())
        .await?;

    audit::append_entry(
        pool.get_ref().as_ref(),
        &admin.id.to_string(),
        AuditAction::ResolveSummary,
        summary.target_type,
        summary.target_id,
        Some(serde_json::json!({
            "status": status.as_str(),
            "note": payload.note,
        })),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(summary)))
}

// =====================================================================
// Individual reports
// =====================================================================

#[derive(Debug, Deserialize)]
pub struct ListReportsQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub target_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /admin/reports/raw
pub async fn list_reports(
    _admin: AdminUser,
    reports: web::Data<Arc<ReportsDb>>,
    query: web::Query<ListReportsQuery>,
) -> Result<HttpResponse> {
    let status = match &query.status {
        Some(raw) => Some(ReportStatus::parse(raw).ok_or_else(|| {
            AppError::ValidationError(format!("Unknown report status '{}'", raw))
        })?),
        None => None,
    };
    let target_type = parse_target_type_filter(query.target_type.as_deref())?;
    let (limit, offset) = page(query.limit, query.offset);

    let data = reports
        .list_reports(status, target_type, limit, offset)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

#[derive(Debug, Deserialize)]
pub struct ReviewReportPayload {
    pub status: String,
    pub action: Option<String>,
}

/// Resolve or dismiss one report
///
/// PATCH /admin/reports/{id}
pub async fn review_report(
    admin: AdminUser,
    reports: web::Data<Arc<ReportsDb>>,
    pool: web::Data<Arc<PgPool>>,
    path: web::Path<Uuid>,
    payload: web::Json<ReviewReportPayload>,
) -> Result<HttpResponse> {
    let status = ReportStatus::parse(&payload.status).ok_or_else(|| {
        AppError::ValidationError(format!("Unknown report status '{}'", payload.status))
    })?;
    if status == ReportStatus::Pending {
        return Err(AppError::ValidationError(
            "A report cannot be reviewed back to pending".to_string(),
        ));
    }

    let report = reports
        .review_report(path.into_inner(), admin.id, status, payload.action.as_deref())
        .await?;

    audit::append_entry(
        pool.get_ref().as_ref(),
        &admin.id.to_string(),
        AuditAction::ResolveReport,
        report.target_type,
        report.target_id,
        Some(serde_json::json!({
            "report_id": report.id,
            "status": status.as_str(),
            "action": payload.action,
        })),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(report)))
}

// =====================================================================
// Campaigns
// =====================================================================

#[derive(Debug, Deserialize)]
pub struct ListCampaignsQuery {
    pub moderation_status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /admin/campaigns
pub async fn list_campaigns(
    _admin: AdminUser,
    campaigns: web::Data<Arc<CampaignsDb>>,
    query: web::Query<ListCampaignsQuery>,
) -> Result<HttpResponse> {
    let status = match &query.moderation_status {
        Some(raw) => Some(ModerationStatus::parse(raw).ok_or_else(|| {
            AppError::ValidationError(format!("Unknown moderation status '{}'", raw))
        })?),
        None => None,
    };
    let (limit, offset) = page(query.limit, query.offset);

    let data = campaigns.list_campaigns(status, limit, offset).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

#[derive(Debug, Deserialize)]
pub struct SetCampaignStatusPayload {
    pub moderation_status: String,
    pub remove_reason: Option<String>,
}

/// Admin state transition for a campaign
///
/// PATCH /admin/campaigns/{id}
pub async fn set_campaign_status(
    admin: AdminUser,
    moderation: web::Data<Arc<ModerationService>>,
    path: web::Path<Uuid>,
    payload: web::Json<SetCampaignStatusPayload>,
) -> Result<HttpResponse> {
    let new_status = ModerationStatus::parse(&payload.moderation_status).ok_or_else(|| {
        AppError::ValidationError(format!(
            "Unknown moderation status '{}'",
            payload.moderation_status
        ))
    })?;

    let campaign = moderation
        .set_campaign_status(
            admin.id,
            path.into_inner(),
            new_status,
            payload.remove_reason.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(campaign)))
}

/// Delete a campaign and cascade into its moderation records
///
/// DELETE /admin/campaigns/{id}
pub async fn delete_campaign(
    admin: AdminUser,
    moderation: web::Data<Arc<ModerationService>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let dismissed = moderation
        .delete_campaign(&admin.id.to_string(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({
        "reports_dismissed": dismissed,
    }))))
}

// =====================================================================
// Users
// =====================================================================

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub account_status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /admin/users
pub async fn list_users(
    _admin: AdminUser,
    users: web::Data<Arc<UsersDb>>,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse> {
    let status = match &query.account_status {
        Some(raw) => Some(AccountStatus::parse(raw).ok_or_else(|| {
            AppError::ValidationError(format!("Unknown account status '{}'", raw))
        })?),
        None => None,
    };
    let (limit, offset) = page(query.limit, query.offset);

    let data = users.list_users(status, limit, offset).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

#[derive(Debug, Deserialize)]
pub struct SetAccountStatusPayload {
    pub account_status: String,
    pub ban_reason: Option<String>,
}

/// Admin state transition for a user account
///
/// PATCH /admin/users/{id}
pub async fn set_account_status(
    admin: AdminUser,
    moderation: web::Data<Arc<ModerationService>>,
    path: web::Path<Uuid>,
    payload: web::Json<SetAccountStatusPayload>,
) -> Result<HttpResponse> {
    let new_status = AccountStatus::parse(&payload.account_status).ok_or_else(|| {
        AppError::ValidationError(format!(
            "Unknown account status '{}'",
            payload.account_status
        ))
    })?;

    let user = moderation
        .set_account_status(
            admin.id,
            path.into_inner(),
            new_status,
            payload.ban_reason.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

// =====================================================================
// Audit trail & analytics
// =====================================================================

/// GET /admin/targets/{type}/{id}/audit
pub async fn target_audit_log(
    _admin: AdminUser,
    audit_db: web::Data<Arc<AuditDb>>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse> {
    let (raw_type, target_id) = path.into_inner();
    let target_type = match raw_type.as_str() {
        "campaign" => TargetType::Campaign,
        "profile" => TargetType::Profile,
        other => {
            return Err(AppError::ValidationError(format!(
                "Unknown target type '{}'",
                other
            )))
        }
    };

    let data = audit_db
        .list_for_target(target_type, target_id, MAX_PAGE_SIZE)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

/// Aggregate counts, cached ~120s
///
/// GET /admin/analytics
pub async fn analytics(
    _admin: AdminUser,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> Result<HttpResponse> {
    let snapshot = analytics.overview().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(snapshot)))
}

fn parse_target_type_filter(raw: Option<&str>) -> Result<Option<TargetType>> {
    match raw {
        None => Ok(None),
        Some("campaign") => Ok(Some(TargetType::Campaign)),
        Some("profile") => Ok(Some(TargetType::Profile)),
        Some(other) => Err(AppError::ValidationError(format!(
            "Unknown target type '{}'",
            other
        ))),
    }
}
