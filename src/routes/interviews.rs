use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use tracing::info;
use validator::Validate;

use crate::{
    dto::interview_dto::{
        CreateInterviewPayload, InterviewResponse, InterviewView, PositionsResponse,
    },
    error::Result,
    models::{application::INTERVIEW_PENDING, interview::InviteRequest},
    services::lifecycle_service::normalize_email,
    utils::time::now,
    AppState,
};

#[utoipa::path(
    get,
    path = "/positions",
    responses(
        (status = 200, description = "Open positions on the interview provider", body = PositionsResponse),
        (status = 503, description = "Interview provider not configured")
    )
)]
pub async fn list_positions(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let positions = state.interview_provider.list_positions().await?;
    Ok(Json(PositionsResponse {
        success: true,
        positions,
    }))
}

#[utoipa::path(
    post,
    path = "/interviews",
    request_body = CreateInterviewPayload,
    responses(
        (status = 200, description = "Interview invitation", body = InterviewResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 503, description = "Interview provider not configured")
    )
)]
#[axum::debug_handler]
pub async fn create_interview(
    State(state): State<AppState>,
    Json(payload): Json<CreateInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let email = normalize_email(&payload.candidate_email);

    if let Some(record) = state.lifecycle.find_by_email(&email).await? {
        if let Some(url) = record.pending_interview_url() {
            info!(application_id = %record.id, "reusing pending interview invite");
            return Ok(Json(InterviewResponse {
                success: true,
                interview: InterviewView {
                    id: record.interview_id.clone(),
                    position_id: payload.position_id,
                    candidate_email: email,
                    interview_url: Some(url.to_string()),
                    status: INTERVIEW_PENDING.to_string(),
                    created_at: now(),
                    candidate_id: payload.candidate_id.or(record.candidate_id.clone()),
                    existing_candidate: false,
                    existing: true,
                },
                user_message: None,
            }));
        }
    }

    let request = InviteRequest::new(
        payload.position_id.clone(),
        email.clone(),
        &payload.candidate_name,
        payload.candidate_id.clone(),
    );
    let invitation = state.interview_provider.invite_candidate(&request).await?;

    if let (Some(id), Some(url)) = (&invitation.id, &invitation.interview_url) {
        // A missing application is logged by the tracker; the invite still goes back.
        state
            .lifecycle
            .attach_interview_invite(&email, id, url)
            .await?;
    }

    let status = if invitation.existing_candidate {
        "existing"
    } else {
        INTERVIEW_PENDING
    };

    Ok(Json(InterviewResponse {
        success: true,
        interview: InterviewView {
            id: invitation.id,
            position_id: payload.position_id,
            candidate_email: email,
            interview_url: invitation.interview_url,
            status: status.to_string(),
            created_at: now(),
            candidate_id: payload.candidate_id,
            existing_candidate: invitation.existing_candidate,
            existing: false,
        },
        user_message: invitation.message,
    }))
}
