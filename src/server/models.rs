//! Wire types for the NovinHub webhook endpoint.
//!
//! The envelope's `user_id` arrives as either a JSON string or a number
//! depending on the emitting platform; it is normalized to a string at this
//! boundary. Payloads are decoded per event type, not eagerly.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// Event envelope: `{type, user_id, payload}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Known event types. `leed_created` is the provider's spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    MessageCreated,
    CommentCreated,
    AutoformCompleted,
    LeadCreated,
    Revalidate,
    Unknown(String),
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            "message_created" => EventKind::MessageCreated,
            "comment_created" => EventKind::CommentCreated,
            "autoform_completed" => EventKind::AutoformCompleted,
            "leed_created" => EventKind::LeadCreated,
            "revalidate" => EventKind::Revalidate,
            other => EventKind::Unknown(other.to_string()),
        }
    }

    /// Decodes the untyped payload into the event-specific shape.
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Accepts a JSON string or number and normalizes to a string.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "user_id must be a string or number, got {}",
            other
        ))),
    }
}

/// `message_created` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub account: serde_json::Value,
    #[serde(default, rename = "socialUser")]
    pub social_user: serde_json::Value,
}

/// `comment_created` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub account: serde_json::Value,
    #[serde(default, rename = "socialUser")]
    pub social_user: serde_json::Value,
    #[serde(default, rename = "accountPost")]
    pub account_post: serde_json::Value,
}

/// `autoform_completed` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutoformPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub messages: serde_json::Value,
    #[serde(default, rename = "socialUser")]
    pub social_user: serde_json::Value,
}

/// `leed_created` payload. Only `type == "number"` leads are actionable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub lead_type: String,
    /// Candidate phone string for `"number"` leads.
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "message_id")]
    pub message_id: String,
    #[serde(default, rename = "socialUser")]
    pub social_user: serde_json::Value,
}

/// Response body for the webhook endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub status: String,
    pub message: String,
}

impl WebhookResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: "Webhook processed successfully".to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            status: "error".to_string(),
            message: message.to_string(),
        }
    }
}

/// Response body for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
