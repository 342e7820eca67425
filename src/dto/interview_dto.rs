use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::interview::Position;
use crate::utils::serde_ext::{deserialize_opt_string_flexible, deserialize_trimmed_string};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInterviewPayload {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub position_id: String,
    #[serde(default, deserialize_with = "deserialize_trimmed_string")]
    #[validate(email)]
    pub candidate_email: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub candidate_name: String,
    #[serde(
        default,
        rename = "candidateId",
        deserialize_with = "deserialize_opt_string_flexible"
    )]
    pub candidate_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterviewView {
    pub id: Option<String>,
    pub position_id: String,
    pub candidate_email: String,
    pub interview_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "candidateId", skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
    /// The provider already had an interview for this candidate and position.
    pub existing_candidate: bool,
    /// A pending invite was found on the application record and reused.
    pub existing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterviewResponse {
    pub success: bool,
    pub interview: InterviewView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PositionsResponse {
    pub success: bool,
    pub positions: Vec<Position>,
}
