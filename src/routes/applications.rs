use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationListResponse, ApplicationView, BulkDeletePayload, BulkDeleteResponse,
        CreateApplicationPayload, CreateApplicationResponse, UpdateInterviewPayload,
        UpdateInterviewResponse,
    },
    error::{Error, Result},
    models::application::ApplicationFilter,
    services::lifecycle_service::{InterviewUpdate, LifecycleOutcome},
    AppState,
};

#[utoipa::path(
    post,
    path = "/applications",
    request_body = CreateApplicationPayload,
    responses(
        (status = 201, description = "Application submitted", body = CreateApplicationResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "An application already exists for this email")
    )
)]
#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Json(payload): Json<CreateApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let record = state.lifecycle.create_application(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateApplicationResponse {
            success: true,
            application_id: record.id,
            message: "Application submitted successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/applications/interview",
    request_body = UpdateInterviewPayload,
    responses(
        (status = 200, description = "Interview details stored", body = serde_json::Value),
        (status = 400, description = "candidateId missing"),
        (status = 404, description = "No application for this candidate")
    )
)]
#[axum::debug_handler]
pub async fn update_interview(
    State(state): State<AppState>,
    Json(payload): Json<UpdateInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate_id = payload
        .candidate_id
        .ok_or_else(|| Error::BadRequest("candidateId is required".into()))?;

    let update = InterviewUpdate {
        interview_id: payload.hireflix_interview_id,
        interview_url: payload.hireflix_interview_url,
        interview_status: payload.hireflix_interview_status,
    };
    let (outcome, updated_fields) = state
        .lifecycle
        .update_interview_by_candidate(&candidate_id, update)
        .await?;

    match outcome {
        LifecycleOutcome::Updated(_) => Ok(Json(UpdateInterviewResponse {
            success: true,
            message: "Application updated with interview details".to_string(),
            candidate_id,
            updated_fields,
        })),
        LifecycleOutcome::NotFound => Err(Error::NotFound(format!(
            "No application found for candidate {}",
            candidate_id
        ))),
    }
}

#[utoipa::path(
    get,
    path = "/applications",
    params(
        ("status" = Option<String>, Query, description = "Exact status label"),
        ("position" = Option<String>, Query, description = "Exact position"),
        ("country" = Option<String>, Query, description = "Passport country"),
        ("search" = Option<String>, Query, description = "Matches name, email or position")
    ),
    responses(
        (status = 200, description = "Applications, newest first", body = serde_json::Value)
    )
)]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(filter): Query<ApplicationFilter>,
) -> Result<impl IntoResponse> {
    let items: Vec<ApplicationView> = state
        .lifecycle
        .list(filter)
        .await?
        .into_iter()
        .map(ApplicationView::from)
        .collect();
    Ok(Json(ApplicationListResponse {
        total: items.len(),
        items,
    }))
}

#[utoipa::path(
    get,
    path = "/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application found", body = serde_json::Value),
        (status = 404, description = "Application not found")
    )
)]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let record = state
        .lifecycle
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".into()))?;
    Ok(Json(ApplicationView::from(record)))
}

/// Read used by the status page while it waits for the interview to finish.
#[utoipa::path(
    get,
    path = "/applications/candidate/{candidate_id}",
    params(("candidate_id" = String, Path, description = "Client-generated candidate id")),
    responses(
        (status = 200, description = "Latest application for the candidate", body = serde_json::Value),
        (status = 404, description = "Application not found")
    )
)]
pub async fn get_application_by_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> Result<impl IntoResponse> {
    let record = state
        .lifecycle
        .find_by_candidate_id(&candidate_id)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".into()))?;
    Ok(Json(ApplicationView::from(record)))
}

#[utoipa::path(
    delete,
    path = "/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 204, description = "Application deleted"),
        (status = 404, description = "Application not found")
    )
)]
pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if state.lifecycle.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound("Application not found".into()))
    }
}

#[utoipa::path(
    post,
    path = "/applications/bulk-delete",
    request_body = BulkDeletePayload,
    responses(
        (status = 200, description = "Applications deleted", body = BulkDeleteResponse),
        (status = 400, description = "No ids given")
    )
)]
pub async fn bulk_delete_applications(
    State(state): State<AppState>,
    Json(payload): Json<BulkDeletePayload>,
) -> Result<impl IntoResponse> {
    if payload.ids.is_empty() {
        return Err(Error::BadRequest("ids must not be empty".into()));
    }
    let deleted = state.lifecycle.delete_many(&payload.ids).await?;
    Ok(Json(BulkDeleteResponse {
        success: true,
        requested: payload.ids.len(),
        deleted,
    }))
}
