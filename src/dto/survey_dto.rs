use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::application::{SurveyAnswers, TraitScores};
use crate::models::survey::{out_of_range_answers, out_of_range_traits};
use crate::utils::serde_ext::deserialize_opt_string_flexible;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_identity"))]
pub struct SurveySubmissionPayload {
    #[serde(default, deserialize_with = "deserialize_opt_string_flexible")]
    pub candidate_id: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_flexible")]
    #[validate(email)]
    pub email: Option<String>,
    pub position: Option<String>,
    #[validate(custom(function = "validate_answers"))]
    pub answers: Option<SurveyAnswers>,
    #[serde(default)]
    #[validate(custom(function = "validate_trait_scores"))]
    pub trait_scores: TraitScores,
}

fn validate_identity(payload: &SurveySubmissionPayload) -> Result<(), ValidationError> {
    let has = |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
    if has(&payload.email) || has(&payload.candidate_id) {
        Ok(())
    } else {
        Err(ValidationError::new("email_or_candidate_id_required"))
    }
}

fn validate_trait_scores(scores: &TraitScores) -> Result<(), ValidationError> {
    if scores.is_empty() {
        return Err(ValidationError::new("required"));
    }
    if !out_of_range_traits(scores).is_empty() {
        return Err(ValidationError::new("score_out_of_range"));
    }
    Ok(())
}

fn validate_answers(answers: &SurveyAnswers) -> Result<(), ValidationError> {
    if out_of_range_answers(answers).is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new("score_out_of_range"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmissionResponse {
    pub success: bool,
    pub survey_id: String,
    pub application_id: Uuid,
    pub resume_url: Option<String>,
    pub fallback_created: bool,
    pub message: String,
}
