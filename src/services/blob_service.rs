use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use url::Url;

use crate::error::{Error, Result};
use crate::utils::time::now_millis;

pub const RESUME_EXTENSIONS: [&str; 5] = ["pdf", "doc", "docx", "txt", "rtf"];

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Stores `data` under `key` and returns a URL it can be fetched from.
    async fn upload(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<String>;
}

/// Lower-cased extension of an uploaded résumé, checked against the allow-list
/// and, for PDFs, the file signature.
pub fn validate_resume(filename: &str, data: &[u8]) -> Result<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !RESUME_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "File type .{} is not allowed",
            ext
        )));
    }
    if data.is_empty() {
        return Err(Error::BadRequest("Résumé file is empty".into()));
    }
    if ext == "pdf" && !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }
    Ok(ext)
}

/// `resumes/{candidateId}_{millis}.{ext}`; characters outside `[A-Za-z0-9_-]`
/// in the candidate id are replaced.
pub fn resume_key(candidate_id: Option<&str>, ext: &str) -> String {
    let owner: String = candidate_id
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("anonymous")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("resumes/{}_{}.{}", owner, now_millis(), ext)
}

/// Writes blobs below a local directory served at `{public_base_url}/uploads/`.
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
    public_base: Url,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self> {
        let mut public_base = Url::parse(public_base_url)
            .map_err(|e| Error::Config(format!("Invalid PUBLIC_BASE_URL: {}", e)))?;
        if !public_base.path().ends_with('/') {
            let path = format!("{}/", public_base.path());
            public_base.set_path(&path);
        }
        Ok(Self {
            root: root.into(),
            public_base,
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(Error::Blob(format!("Invalid blob key: {}", key)));
        }
        Ok(self.root.join(relative))
    }

    fn public_url(&self, key: &str) -> Result<String> {
        self.public_base
            .join("uploads/")
            .and_then(|base| base.join(key))
            .map(String::from)
            .map_err(|e| Error::Blob(format!("Failed to build public URL: {}", e)))
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn upload(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &data).await.map_err(|e| {
            tracing::error!(key, error = %e, "failed to write blob");
            Error::Blob(format!("Failed to save file: {}", e))
        })?;
        tracing::info!(key, size = data.len(), ?content_type, "blob stored");
        self.public_url(key)
    }
}
