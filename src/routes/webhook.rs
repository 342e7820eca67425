use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    dto::webhook_dto::{WebhookAck, WebhookEvent},
    error::{Error, Result},
    middleware::cors::preflight_headers,
    services::lifecycle_service::InterviewCompletion,
    utils::signature,
    AppState,
};

pub const SIGNATURE_HEADER: &str = "x-hireflix-signature";

fn verify_signature(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<()> {
    let Some(secret) = state.webhook_secret.as_deref() else {
        return Ok(());
    };
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("Missing webhook signature".into()))?;
    if signature::verify(secret, body, provided) {
        Ok(())
    } else {
        warn!("webhook signature mismatch");
        Err(Error::Unauthorized("Invalid webhook signature".into()))
    }
}

#[utoipa::path(
    get,
    path = "/webhooks/interview",
    responses((status = 200, description = "Static receiver info", body = serde_json::Value))
)]
pub async fn webhook_info() -> impl IntoResponse {
    Json(json!({
        "webhook": "Global Golf Intern - Hireflix",
        "status": "active",
    }))
}

pub async fn webhook_preflight() -> impl IntoResponse {
    (StatusCode::OK, preflight_headers())
}

/// Every parseable event is acknowledged with 200 so the provider never
/// retries events this service ignores.
#[utoipa::path(
    post,
    path = "/webhooks/interview",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 401, description = "Signature missing or invalid"),
        (status = 500, description = "Body is not valid JSON")
    )
)]
pub async fn handle_interview_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    verify_signature(&state, &headers, &body)?;

    let event = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) => WebhookEvent::from_value(value),
        Err(e) => {
            error!(error = %e, "webhook body is not valid JSON");
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Failed to process webhook" })),
            )
                .into_response());
        }
    };

    let Some(done) = event.completed_interview() else {
        info!(event = %event.event, "webhook event logged");
        return Ok(Json(WebhookAck {
            success: true,
            message: format!("Event {} logged", event.event),
            matched: None,
        })
        .into_response());
    };

    let Some(email) = done.email else {
        warn!(interview_id = ?done.id, "completed interview without candidate email");
        return Ok(Json(WebhookAck {
            success: true,
            message: "Interview completion processed".to_string(),
            matched: Some(false),
        })
        .into_response());
    };

    let outcome = state
        .lifecycle
        .mark_interview_completed(InterviewCompletion {
            email,
            interview_id: done.id,
            video_url: done.video_url,
            share_url: done.share_url,
        })
        .await?;

    Ok(Json(WebhookAck {
        success: true,
        message: "Interview completion processed".to_string(),
        matched: Some(outcome.is_updated()),
    })
    .into_response())
}
