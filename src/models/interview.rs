use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An open position on the interview provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRequest {
    pub position_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub external_id: Option<String>,
}

impl InviteRequest {
    /// Splits a full name on the first run of whitespace.
    pub fn new(
        position_id: impl Into<String>,
        email: impl Into<String>,
        full_name: &str,
        external_id: Option<String>,
    ) -> Self {
        let parts: Vec<&str> = full_name.split_whitespace().collect();
        let (first_name, last_name) = match parts.len() {
            0 => (String::new(), String::new()),
            1 => (parts[0].to_string(), String::new()),
            _ => (parts[0].to_string(), parts[1..].join(" ")),
        };
        Self {
            position_id: position_id.into(),
            email: email.into(),
            first_name,
            last_name,
            external_id,
        }
    }
}

/// Result of asking the provider to invite a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub id: Option<String>,
    /// Link the candidate opens (embedded in the interview page).
    pub interview_url: Option<String>,
    /// The provider already holds an interview for this email and position.
    pub existing_candidate: bool,
    pub message: Option<String>,
}
