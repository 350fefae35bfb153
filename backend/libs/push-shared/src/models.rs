use serde::{Deserialize, Serialize};

/// One push message addressed to a single device token.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Arbitrary key/value payload delivered alongside the notification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Wire format of an FCM send request (legacy HTTP API).
#[derive(Debug, Serialize)]
pub struct FcmRequest {
    pub to: String,
    pub notification: FcmNotification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

/// FCM send result
#[derive(Debug, Clone, Deserialize)]
pub struct FcmSendResult {
    #[serde(default)]
    pub success: i64,
    #[serde(default)]
    pub failure: i64,
}

impl FcmSendResult {
    pub fn delivered(&self) -> bool {
        self.success > 0 && self.failure == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_message_serializes_without_empty_data() {
        let msg = PushMessage::new("Campaign hidden", "Your campaign is under review");
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["title"], "Campaign hidden");
    }

    #[test]
    fn send_result_delivered() {
        let ok: FcmSendResult = serde_json::from_str(r#"{"success":1,"failure":0}"#).unwrap();
        assert!(ok.delivered());
        let bad: FcmSendResult = serde_json::from_str(r#"{"success":0,"failure":1}"#).unwrap();
        assert!(!bad.delivered());
    }
}
