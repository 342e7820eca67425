#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use internship_funnel::{
    error::Result,
    models::application::{ApplicationRecord, LookupKey},
    models::interview::{Invitation, InviteRequest, Position},
    routes::build_router,
    services::{blob_service::LocalBlobStorage, hireflix_service::InterviewProvider},
    store::{ApplicationStore, MemoryApplicationStore},
    AppState,
};

/// Interview provider double that hands out numbered invites.
#[derive(Default)]
pub struct FakeProvider {
    pub invites: AtomicUsize,
    pub already_exists: bool,
    pub last_request: Mutex<Option<InviteRequest>>,
}

#[async_trait]
impl InterviewProvider for FakeProvider {
    async fn list_positions(&self) -> Result<Vec<Position>> {
        Ok(vec![Position {
            id: "pos_golf_ops".into(),
            title: "Golf Operations Intern".into(),
        }])
    }

    async fn invite_candidate(&self, request: &InviteRequest) -> Result<Invitation> {
        let n = self.invites.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }
        if self.already_exists {
            return Ok(Invitation {
                id: None,
                interview_url: None,
                existing_candidate: true,
                message: Some("already invited".into()),
            });
        }
        Ok(Invitation {
            id: Some(format!("iv_{}", n)),
            interview_url: Some(format!("https://hf.example/s/{}", n)),
            existing_candidate: false,
            message: None,
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryApplicationStore>,
    pub provider: Arc<FakeProvider>,
    pub uploads: PathBuf,
}

impl TestApp {
    pub async fn by_email(&self, email: &str) -> Option<ApplicationRecord> {
        self.store
            .find_latest_by(&LookupKey::Email(email.to_string()))
            .await
            .unwrap()
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(None, FakeProvider::default())
}

pub fn spawn_app_with(webhook_secret: Option<&str>, provider: FakeProvider) -> TestApp {
    let uploads = std::env::temp_dir().join(format!("funnel-uploads-{}", uuid::Uuid::new_v4()));
    let store = Arc::new(MemoryApplicationStore::new());
    let provider = Arc::new(provider);
    let blob = LocalBlobStorage::new(&uploads, "http://localhost:8080").unwrap();

    let state = AppState::new(
        store.clone(),
        Arc::new(blob),
        provider.clone(),
        webhook_secret.map(str::to_string),
    );
    TestApp {
        router: build_router(state, &uploads),
        store,
        provider,
        uploads,
    }
}

pub async fn read_json(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return JsonValue::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    (status, read_json(resp).await)
}

pub async fn send_json(
    router: &Router,
    method: &str,
    uri: &str,
    body: &JsonValue,
) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, req).await
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, req).await
}

pub const BOUNDARY: &str = "funnel-test-boundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}
