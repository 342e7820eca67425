mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{multipart_request, send, send_json, spawn_app, Part};

#[tokio::test]
async fn unmatched_survey_creates_fallback_record() {
    let app = spawn_app();

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/surveys",
        &json!({
            "name": "Dana Park",
            "email": "Dana@X.com",
            "traitScores": { "openness": 3.5, "conscientiousness": 5 }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallbackCreated"], true);

    let record = app.by_email("dana@x.com").await.unwrap();
    assert!(record.survey_completed);
    assert_eq!(record.name.as_deref(), Some("Dana Park"));
    assert_eq!(record.status.as_str(), "Survey Completed");
    assert_eq!(record.trait_scores.as_ref().unwrap().len(), 2);
    assert_eq!(record.survey_id.as_deref(), body["surveyId"].as_str());
}

#[tokio::test]
async fn application_after_survey_fills_the_survey_record() {
    let app = spawn_app();
    let (status, body) = send_json(
        &app.router,
        "POST",
        "/surveys",
        &json!({ "email": "  lee@x.com ", "traitScores": { "openness": 4 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallbackCreated"], true);
    let survey_record = app.by_email("lee@x.com").await.unwrap();

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/applications",
        &json!({
            "name": "Lee Chan",
            "email": " Lee@x.com",
            "phone": "+1 555 0100",
            "passportCountry": "Canada"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["applicationId"], survey_record.id.to_string());
    assert_eq!(app.store.len().await, 1);

    let record = app.by_email("lee@x.com").await.unwrap();
    assert_eq!(record.name.as_deref(), Some("Lee Chan"));
    assert_eq!(record.phone.as_deref(), Some("+1 555 0100"));
    assert_eq!(record.passport_country.as_deref(), Some("Canada"));
    assert!(record.survey_completed);
    assert_eq!(record.status.as_str(), "Survey Completed");

    let (status, _) = send_json(
        &app.router,
        "POST",
        "/applications",
        &json!({ "name": "Lee Chan", "email": "lee@x.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn survey_matches_by_candidate_id_when_email_misses() {
    let app = spawn_app();
    send_json(
        &app.router,
        "POST",
        "/applications",
        &json!({ "name": "Eve Ng", "email": "eve@x.com", "candidateId": "c-42" }),
    )
    .await;

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/surveys",
        &json!({
            "candidateId": "c-42",
            "email": "eve.other@x.com",
            "traitScores": { "openness": 4 },
            "answers": { "openness": { "0": 4, "1": 4 } }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallbackCreated"], false);

    let record = app.by_email("eve@x.com").await.unwrap();
    assert!(record.survey_completed);
    assert_eq!(record.answers.unwrap()["openness"]["1"], 4.0);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn candidate_only_survey_without_application_is_not_found() {
    let app = spawn_app();
    let (status, _) = send_json(
        &app.router,
        "POST",
        "/surveys",
        &json!({ "candidateId": "ghost", "traitScores": { "openness": 4 } }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn invalid_surveys_are_rejected() {
    let app = spawn_app();

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/surveys",
        &json!({ "email": "x@x.com", "traitScores": { "openness": 6 } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"], json!(["trait_scores"]));

    let (status, _) = send_json(
        &app.router,
        "POST",
        "/surveys",
        &json!({ "traitScores": { "openness": 3 } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn multipart_survey_stores_resume() {
    let app = spawn_app();
    send_json(
        &app.router,
        "POST",
        "/applications",
        &json!({ "name": "Finn Wu", "email": "finn@x.com", "candidateId": "1718" }),
    )
    .await;

    let req = multipart_request(
        "/surveys",
        &[
            Part::Text("candidateId", "1718"),
            Part::Text("email", "finn@x.com"),
            Part::Text("traitScores", r#"{"openness":4.5,"grit":3}"#),
            Part::File {
                name: "resume",
                filename: "finn.pdf",
                content_type: "application/pdf",
                data: b"%PDF-1.4 test resume",
            },
        ],
    );
    let (status, body) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::OK);

    let resume_url = body["resumeUrl"].as_str().unwrap().to_string();
    assert!(resume_url.starts_with("http://localhost:8080/uploads/resumes/1718_"));
    assert!(resume_url.ends_with(".pdf"));

    let record = app.by_email("finn@x.com").await.unwrap();
    assert_eq!(record.resume_url.as_deref(), Some(resume_url.as_str()));
    assert_eq!(record.trait_scores.unwrap()["grit"], 3.0);

    let key = resume_url.trim_start_matches("http://localhost:8080/uploads/");
    let stored = tokio::fs::read(app.uploads.join(key)).await.unwrap();
    assert_eq!(stored, b"%PDF-1.4 test resume");
    let _ = tokio::fs::remove_dir_all(&app.uploads).await;
}

#[tokio::test]
async fn multipart_rejects_forged_pdf() {
    let app = spawn_app();
    let req = multipart_request(
        "/surveys",
        &[
            Part::Text("email", "gil@x.com"),
            Part::Text("traitScores", r#"{"openness":4}"#),
            Part::File {
                name: "resume",
                filename: "cv.pdf",
                content_type: "application/pdf",
                data: b"MZ not a pdf",
            },
        ],
    );
    let (status, _) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty().await);
}
