//! Public report submission endpoints
//!
//! Both endpoints accept anonymous reports. Pipeline per request:
//! payload validation, then the per-IP rate limiter, then the ingestion
//! transaction. Rejections never reveal more than the rejection reason.

use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{
    is_valid_reason, RateLimitDecision, RateLimitReason, SubmitReportInput, TargetType,
};
use crate::services::{RateLimiter, ReportIngestion};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Campaign report request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitCampaignReportPayload {
    pub target_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub reason: String,
    #[validate(length(max = 2000))]
    pub details: Option<String>,
    pub reporter_id: Option<Uuid>,
}

/// Profile report request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitUserReportPayload {
    pub reported_user_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub reason: String,
    #[validate(length(max = 2000))]
    pub details: Option<String>,
    pub reported_by: Option<Uuid>,
}

/// Report a campaign
///
/// POST /reports/submit
pub async fn submit_campaign_report(
    req: HttpRequest,
    ingestion: web::Data<Arc<ReportIngestion>>,
    rate_limiter: web::Data<Arc<RateLimiter>>,
    payload: web::Json<SubmitCampaignReportPayload>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    submit(
        &req,
        ingestion.get_ref(),
        rate_limiter.get_ref(),
        SubmitReportInput {
            target_type: TargetType::Campaign,
            target_id: payload.target_id,
            reporter_id: payload.reporter_id,
            reason: payload.reason.clone(),
            details: payload.details.clone(),
        },
    )
    .await
}

/// Report a user profile
///
/// POST /reports/user
pub async fn submit_user_report(
    req: HttpRequest,
    ingestion: web::Data<Arc<ReportIngestion>>,
    rate_limiter: web::Data<Arc<RateLimiter>>,
    payload: web::Json<SubmitUserReportPayload>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    submit(
        &req,
        ingestion.get_ref(),
        rate_limiter.get_ref(),
        SubmitReportInput {
            target_type: TargetType::Profile,
            target_id: payload.reported_user_id,
            reporter_id: payload.reported_by,
            reason: payload.reason.clone(),
            details: payload.details.clone(),
        },
    )
    .await
}

async fn submit(
    req: &HttpRequest,
    ingestion: &ReportIngestion,
    rate_limiter: &RateLimiter,
    input: SubmitReportInput,
) -> Result<HttpResponse> {
    // Reason validity is checked before the rate limiter so a malformed
    // request does not burn a slot in the caller's window.
    if !is_valid_reason(input.target_type, &input.reason) {
        return Err(AppError::ValidationError(format!(
            "Reason '{}' is not valid for {} reports",
            input.reason,
            input.target_type.as_str()
        )));
    }

    let client_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|ip| ip.to_string());

    let decision = rate_limiter
        .check_and_record(
            client_ip.as_deref(),
            input.target_id,
            input.target_type,
            input.reporter_id,
        )
        .await;

    match decision {
        RateLimitDecision::Allowed => {}
        RateLimitDecision::Rejected(reason) => {
            metrics::record_report_rejected(reason.as_str());
            return Err(match reason {
                RateLimitReason::RateLimitExceeded => {
                    AppError::RateLimited(reason.as_str().to_string())
                }
                RateLimitReason::DuplicateReport => {
                    AppError::DuplicateReport(reason.as_str().to_string())
                }
            });
        }
    }

    let outcome = ingestion.submit_report(input).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({
        "report_id": outcome.report_id,
        "auto_hidden": outcome.auto_hidden,
    }))))
}
