//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/subscribe`.
///
/// `email` is optional so a missing field is reported through the same
/// validation message as a malformed address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Response of `POST /api/subscribe`, also used for every error it returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_signups: Option<u64>,
}

impl SubscribeResponse {
    pub fn created(total_signups: u64) -> Self {
        Self {
            success: true,
            message: "Successfully joined the waitlist!".to_string(),
            total_signups: Some(total_signups),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            total_signups: None,
        }
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub timestamp: String,
}

/// Response of `GET /api/stats`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_signups: u64,
    pub connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_omits_total() {
        let body = serde_json::to_value(SubscribeResponse::failure("nope")).unwrap();
        assert_eq!(body, json!({ "success": false, "message": "nope" }));
    }

    #[test]
    fn test_created_uses_camel_case() {
        let body = serde_json::to_value(SubscribeResponse::created(3)).unwrap();
        assert_eq!(body["totalSignups"], 3);
        assert_eq!(body["success"], true);
    }

    #[test]
    fn test_request_without_email() {
        let req: SubscribeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_none());
    }
}
