use serde::Serialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

pub const EVENT_INTERVIEW_STATUS_CHANGE: &str = "interview.status-change";

/// Parsed webhook body. Only the fields the receiver acts on are read, each
/// one independently, so a field of an unexpected type never hides the rest.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub event: String,
    data: JsonValue,
}

/// What a completed-interview event carries for the lifecycle update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletedInterview {
    pub id: Option<String>,
    pub email: Option<String>,
    pub video_url: Option<String>,
    pub share_url: Option<String>,
}

fn str_at<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn id_of(value: &JsonValue) -> Option<String> {
    match value.get("id")? {
        JsonValue::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl WebhookEvent {
    /// Accepts any JSON value; bodies that are not objects yield an empty event.
    pub fn from_value(body: JsonValue) -> Self {
        let event = body
            .get("event")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        let data = body.get("data").cloned().unwrap_or(JsonValue::Null);
        Self { event, data }
    }

    /// Details of an `interview.status-change` event whose status is `completed`.
    pub fn completed_interview(&self) -> Option<CompletedInterview> {
        if self.event != EVENT_INTERVIEW_STATUS_CHANGE
            || str_at(&self.data, &["status"]) != Some("completed")
        {
            return None;
        }
        Some(CompletedInterview {
            id: id_of(&self.data),
            email: str_at(&self.data, &["candidate", "email"]).map(str::to_string),
            video_url: str_at(&self.data, &["url", "public"]).map(str::to_string),
            share_url: str_at(&self.data, &["url", "short"]).map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
}
