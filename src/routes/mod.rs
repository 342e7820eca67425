pub mod applications;
pub mod dashboard;
pub mod health;
pub mod interviews;
pub mod surveys;
pub mod webhook;

use std::path::Path;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::services::ServeDir;
use utoipa::OpenApi;

use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        applications::create_application,
        applications::update_interview,
        applications::list_applications,
        applications::get_application,
        applications::get_application_by_candidate,
        applications::delete_application,
        applications::bulk_delete_applications,
        surveys::submit_survey,
        interviews::list_positions,
        interviews::create_interview,
        webhook::webhook_info,
        webhook::handle_interview_webhook,
        dashboard::get_dashboard_stats,
        health::health,
    ),
    components(schemas(
        crate::dto::application_dto::CreateApplicationPayload,
        crate::dto::application_dto::CreateApplicationResponse,
        crate::dto::application_dto::UpdateInterviewPayload,
        crate::dto::application_dto::BulkDeletePayload,
        crate::dto::application_dto::BulkDeleteResponse,
        crate::dto::survey_dto::SurveySubmissionResponse,
        crate::dto::interview_dto::CreateInterviewPayload,
        crate::dto::interview_dto::InterviewView,
        crate::dto::interview_dto::InterviewResponse,
        crate::dto::interview_dto::PositionsResponse,
        crate::dto::webhook_dto::WebhookAck,
        crate::models::interview::Position,
        crate::services::dashboard_service::DashboardStats,
    )),
    tags((name = "internship-funnel", description = "Internship application funnel"))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// All funnel routes plus the uploaded-file directory under `/uploads`.
pub fn build_router(state: AppState, uploads_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route(
            "/applications",
            get(applications::list_applications).post(applications::create_application),
        )
        .route("/applications/interview", post(applications::update_interview))
        .route(
            "/applications/bulk-delete",
            post(applications::bulk_delete_applications),
        )
        .route(
            "/applications/candidate/:candidate_id",
            get(applications::get_application_by_candidate),
        )
        .route(
            "/applications/:id",
            get(applications::get_application).delete(applications::delete_application),
        )
        .route("/surveys", post(surveys::submit_survey))
        .route("/positions", get(interviews::list_positions))
        .route("/interviews", post(interviews::create_interview))
        .route(
            "/webhooks/interview",
            get(webhook::webhook_info)
                .post(webhook::handle_interview_webhook)
                .options(webhook::webhook_preflight),
        )
        .route("/dashboard/stats", get(dashboard::get_dashboard_stats))
        .nest_service("/uploads", ServeDir::new(uploads_dir.as_ref()))
        .with_state(state)
}
