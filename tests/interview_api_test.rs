mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, send_json, spawn_app, spawn_app_with, FakeProvider};
use internship_funnel::{
    routes::build_router,
    services::{blob_service::LocalBlobStorage, hireflix_service::HireflixService},
    store::MemoryApplicationStore,
    AppState,
};

fn interview_request(email: &str) -> serde_json::Value {
    json!({
        "position_id": "pos_golf_ops",
        "candidate_email": email,
        "candidate_name": "Ivy  May Lin",
        "candidateId": 1718000000000u64
    })
}

#[tokio::test]
async fn lists_positions() {
    let app = spawn_app();
    let (status, body) = get(&app.router, "/positions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["positions"][0]["id"], "pos_golf_ops");
    assert_eq!(body["positions"][0]["title"], "Golf Operations Intern");
}

#[tokio::test]
async fn invite_is_recorded_and_then_reused() {
    let app = spawn_app();
    send_json(
        &app.router,
        "POST",
        "/applications",
        &json!({ "name": "Ivy May Lin", "email": "ivy@x.com" }),
    )
    .await;

    let (status, body) =
        send_json(&app.router, "POST", "/interviews", &interview_request("Ivy@X.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interview"]["id"], "iv_1");
    assert_eq!(body["interview"]["status"], "pending");
    assert_eq!(body["interview"]["existing"], false);
    assert_eq!(body["interview"]["candidateId"], "1718000000000");

    let sent = app.provider.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(sent.first_name, "Ivy");
    assert_eq!(sent.last_name, "May Lin");
    assert_eq!(sent.email, "ivy@x.com");
    assert_eq!(sent.external_id.as_deref(), Some("1718000000000"));

    let record = app.by_email("ivy@x.com").await.unwrap();
    assert_eq!(record.interview_id.as_deref(), Some("iv_1"));
    assert_eq!(record.interview_status.as_deref(), Some("pending"));
    assert_eq!(record.status.as_str(), "Interview Pending");
    assert!(!record.interview_completed);

    let (status, body) =
        send_json(&app.router, "POST", "/interviews", &interview_request("ivy@x.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interview"]["existing"], true);
    assert_eq!(body["interview"]["interview_url"], "https://hf.example/s/1");
    assert_eq!(app.provider.invites.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invite_without_application_is_still_returned() {
    let app = spawn_app();
    let (status, body) =
        send_json(&app.router, "POST", "/interviews", &interview_request("new@x.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interview"]["interview_url"], "https://hf.example/s/1");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn already_invited_candidate_gets_message() {
    let app = spawn_app_with(
        None,
        FakeProvider {
            already_exists: true,
            ..Default::default()
        },
    );
    let (status, body) =
        send_json(&app.router, "POST", "/interviews", &interview_request("ivy@x.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interview"]["existing_candidate"], true);
    assert!(body["interview"]["interview_url"].is_null());
    assert_eq!(body["user_message"], "already invited");
}

#[tokio::test]
async fn invalid_interview_request_is_rejected() {
    let app = spawn_app();
    let (status, body) = send_json(
        &app.router,
        "POST",
        "/interviews",
        &json!({ "position_id": "pos_golf_ops", "candidate_email": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"], json!(["candidate_email", "candidate_name"]));
    assert_eq!(app.provider.invites.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unconfigured_provider_is_unavailable() {
    let uploads = std::env::temp_dir().join("funnel-unconfigured");
    let provider = HireflixService::new(
        "http://127.0.0.1:9/graphql".into(),
        None,
        Duration::from_secs(1),
    )
    .unwrap();
    let state = AppState::new(
        Arc::new(MemoryApplicationStore::new()),
        Arc::new(LocalBlobStorage::new(&uploads, "http://localhost:8080").unwrap()),
        Arc::new(provider),
        None,
    );
    let router = build_router(state, &uploads);

    let (status, _) = get(&router, "/positions").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) =
        send_json(&router, "POST", "/interviews", &interview_request("ivy@x.com")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
