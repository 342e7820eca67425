use axum::{
    extract::{FromRequest, Json, Multipart, Request, State},
    http::header,
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dto::survey_dto::{SurveySubmissionPayload, SurveySubmissionResponse},
    error::{Error, Result},
    services::{
        blob_service::{resume_key, validate_resume},
        lifecycle_service::{SurveyOutcome, SurveySubmission},
    },
    AppState,
};

struct ResumeUpload {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

fn text_field(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(SurveySubmissionPayload, Option<ResumeUpload>)> {
    let mut payload = SurveySubmissionPayload::default();
    let mut resume = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "candidateId" => payload.candidate_id = text_field(field.text().await?),
            "name" => payload.name = text_field(field.text().await?),
            "email" => payload.email = text_field(field.text().await?),
            "position" => payload.position = text_field(field.text().await?),
            "answers" => {
                if let Some(raw) = text_field(field.text().await?) {
                    payload.answers = Some(serde_json::from_str(&raw)?);
                }
            }
            "traitScores" => {
                if let Some(raw) = text_field(field.text().await?) {
                    payload.trait_scores = serde_json::from_str(&raw)?;
                }
            }
            "resume" => {
                let filename = field.file_name().unwrap_or("resume.bin").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                if !data.is_empty() {
                    resume = Some(ResumeUpload {
                        filename,
                        content_type,
                        data,
                    });
                }
            }
            _ => {}
        }
    }

    Ok((payload, resume))
}

/// Stores the résumé and returns its URL. Storage failures are logged and the
/// survey goes ahead without one.
async fn upload_resume(
    state: &AppState,
    candidate_id: Option<&str>,
    upload: ResumeUpload,
    ext: &str,
) -> Option<String> {
    let key = resume_key(candidate_id, ext);
    match state
        .blob_storage
        .upload(&key, upload.data, upload.content_type.as_deref())
        .await
    {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(error = %e, key = %key, "résumé upload failed; continuing without it");
            None
        }
    }
}

#[utoipa::path(
    post,
    path = "/surveys",
    request_body(
        content = serde_json::Value,
        description = "JSON survey, or multipart with the same fields plus a `resume` file"
    ),
    responses(
        (status = 200, description = "Survey stored", body = SurveySubmissionResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "No application for the candidate id and no email given")
    )
)]
pub async fn submit_survey(
    State(state): State<AppState>,
    request: Request,
) -> Result<impl IntoResponse> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let (payload, resume) = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| Error::BadRequest(e.body_text()))?;
        read_multipart(multipart).await?
    } else {
        let Json(payload) = Json::<SurveySubmissionPayload>::from_request(request, &state)
            .await
            .map_err(|e| Error::BadRequest(e.body_text()))?;
        (payload, None)
    };

    payload.validate()?;

    let resume = match resume {
        Some(upload) => {
            let ext = validate_resume(&upload.filename, &upload.data)?;
            Some((upload, ext))
        }
        None => None,
    };

    let resume_url = match resume {
        Some((upload, ext)) => {
            upload_resume(&state, payload.candidate_id.as_deref(), upload, &ext).await
        }
        None => None,
    };

    let uploaded = resume_url.clone();
    let submission = SurveySubmission {
        candidate_id: payload.candidate_id,
        name: payload.name,
        email: payload.email,
        position: payload.position,
        answers: payload.answers,
        trait_scores: payload.trait_scores,
        resume_url,
    };

    let outcome = match state.lifecycle.attach_survey(submission).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(url) = uploaded {
                warn!(resume_url = %url, error = %e, "survey failed after résumé upload");
            }
            return Err(e);
        }
    };

    let fallback_created = matches!(outcome, SurveyOutcome::FallbackCreated(_));
    let record = outcome.record();
    info!(application_id = %record.id, fallback_created, "survey submitted");

    Ok(Json(SurveySubmissionResponse {
        success: true,
        survey_id: record.survey_id.clone().unwrap_or_default(),
        application_id: record.id,
        resume_url: record.resume_url.clone(),
        fallback_created,
        message: if fallback_created {
            "Survey saved; no matching application was found so a new record was created"
                .to_string()
        } else {
            "Survey submitted successfully".to_string()
        },
    }))
}
