//! Device token management handlers

use super::ApiResponse;
use crate::db::DevicesDb;
use crate::error::{AppError, Result};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Register device token request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterTokenPayload {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 512))]
    pub token: String,
    /// "ios", "android", "web"
    #[validate(length(min = 1, max = 32))]
    pub device_type: String,
}

/// Remove device token request
#[derive(Debug, Deserialize, Validate)]
pub struct RemoveTokenPayload {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 512))]
    pub token: String,
}

/// Register a device token
///
/// POST /notifications/register-token
pub async fn register_token(
    devices: web::Data<Arc<DevicesDb>>,
    payload: web::Json<RegisterTokenPayload>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let device = devices
        .register_token(payload.user_id, &payload.token, &payload.device_type)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({
        "device_id": device.id,
    }))))
}

/// Remove a device token
///
/// DELETE /notifications/remove-token
pub async fn remove_token(
    devices: web::Data<Arc<DevicesDb>>,
    payload: web::Json<RemoveTokenPayload>,
) -> Result<HttpResponse> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let removed = devices.remove_token(payload.user_id, &payload.token).await?;
    if !removed {
        return Err(AppError::NotFound("Device token not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({
        "removed": true,
    }))))
}
