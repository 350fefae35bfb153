use crate::errors::FcmError;
use crate::models::{FcmNotification, FcmRequest, FcmSendResult, PushMessage};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// FCM client bound to a server key.
///
/// Sends are fire-and-forget from the caller's perspective: the service
/// layer logs failures but never propagates them into request handling.
#[derive(Clone)]
pub struct FcmClient {
    http: reqwest::Client,
    server_key: String,
    endpoint: String,
}

impl FcmClient {
    pub fn new(server_key: String) -> Self {
        Self::with_endpoint(server_key, DEFAULT_ENDPOINT.to_string())
    }

    /// Override the FCM endpoint (used by tests and self-hosted relays).
    pub fn with_endpoint(server_key: String, endpoint: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            server_key,
            endpoint,
        }
    }

    /// Send one message to one device token.
    pub async fn send(&self, device_token: &str, message: &PushMessage) -> Result<FcmSendResult, FcmError> {
        if device_token.is_empty() {
            return Err(FcmError::InvalidToken);
        }

        let request = FcmRequest {
            to: device_token.to_string(),
            notification: FcmNotification {
                title: message.title.clone(),
                body: message.body.clone(),
            },
            data: message.data.clone(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| FcmError::SendRequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FcmError::ApiError(status.to_string(), body));
        }

        let result: FcmSendResult = response
            .json()
            .await
            .map_err(|e| FcmError::ResponseParseError(e.to_string()))?;

        tracing::debug!(
            success = result.success,
            failure = result.failure,
            "FCM send completed"
        );

        Ok(result)
    }
}
