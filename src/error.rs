use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Interview provider error: {0}")]
    Upstream(String),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Blob storage error: {0}")]
    Blob(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Validation(_) | Error::Json(_) | Error::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match self {
            Error::Validation(errs) => {
                let field_errors = errs.field_errors();
                let mut fields: Vec<String> = field_errors.keys().map(|k| k.to_string()).collect();
                fields.sort_unstable();
                json!({ "success": false, "error": "Missing or invalid fields", "fields": fields })
            }
            Error::BadRequest(msg)
            | Error::Unauthorized(msg)
            | Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::Unavailable(msg) => json!({ "success": false, "error": msg }),
            Error::Json(err) => json!({ "success": false, "error": err.to_string() }),
            Error::Multipart(err) => json!({ "success": false, "error": err.to_string() }),
            Error::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                json!({ "success": false, "error": "Store unavailable" })
            }
            Error::Upstream(msg) => {
                tracing::error!(error = %msg, "interview provider call failed");
                json!({ "success": false, "error": "Interview provider unavailable" })
            }
            Error::Reqwest(err) => {
                tracing::error!(error = %err, "outbound HTTP call failed");
                json!({ "success": false, "error": "Interview provider unavailable" })
            }
            other => {
                tracing::error!(error = %other, "request failed");
                json!({ "success": false, "error": "An unexpected error occurred" })
            }
        };

        (status, Json(body)).into_response()
    }
}
