use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::application::ApplicationRecord;
use crate::models::survey::SurveyScore;
use crate::utils::serde_ext::{deserialize_opt_string_flexible, deserialize_trimmed_string};

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationPayload {
    #[serde(default, deserialize_with = "deserialize_opt_string_flexible")]
    pub candidate_id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_trimmed_string")]
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub position: Option<String>,
    pub position_id: Option<String>,
    pub passport_country: Option<String>,
    pub golf_handicap: Option<String>,
    pub message: Option<String>,
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationResponse {
    pub success: bool,
    pub application_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInterviewPayload {
    #[validate(required)]
    #[serde(default, deserialize_with = "deserialize_opt_string_flexible")]
    pub candidate_id: Option<String>,
    pub hireflix_interview_id: Option<String>,
    pub hireflix_interview_url: Option<String>,
    pub hireflix_interview_status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInterviewResponse {
    pub success: bool,
    pub message: String,
    pub candidate_id: String,
    pub updated_fields: Vec<&'static str>,
}

/// A record as the dashboard sees it: stored fields plus the derived score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(flatten)]
    pub record: ApplicationRecord,
    pub survey_score: Option<SurveyScore>,
}

impl From<ApplicationRecord> for ApplicationView {
    fn from(record: ApplicationRecord) -> Self {
        let survey_score = record.trait_scores.as_ref().map(SurveyScore::from_traits);
        Self {
            record,
            survey_score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationListResponse {
    pub total: usize,
    pub items: Vec<ApplicationView>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkDeletePayload {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub success: bool,
    pub requested: usize,
    pub deleted: u64,
}
