//! Document management on the research backend.
//!
//! The backend keeps uploaded documents in a flat directory and exposes it
//! as `GET /files/`, `POST /upload/` and `DELETE /files/{name}`.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use scout_core::constants::{NAME, VERSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::errors::ApiError;

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `GET /files/` body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileList {
    /// Document names.
    pub files: Vec<String>,
}

/// `POST /upload/` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Stored file name.
    pub filename: String,
    /// Server-side path.
    pub path: String,
}

#[derive(Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    message: String,
}

/// Client for the backend's document endpoints.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("{NAME}/{VERSION}"))
            .build()?;
        Self::with_client(client, base_url)
    }

    /// Use an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url).map_err(|e| ApiError::invalid_url(base_url, e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::invalid_url(base_url, "cannot be a base URL"));
        }
        Ok(Self { client, base })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// List uploaded documents.
    pub async fn list_files(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(&["files", ""])?;
        let response = self.client.get(url.clone()).send().await?;
        let list: FileList = check(response, &url).await?.json().await?;
        debug!(count = list.files.len(), "listed files");
        Ok(list.files)
    }

    /// Upload a local file as multipart field `file`.
    pub async fn upload_file(&self, path: &Path) -> Result<UploadedFile, ApiError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} has no usable file name", path.display()),
                )
            })?
            .to_owned();
        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();
        let form = Form::new().part("file", Part::bytes(bytes).file_name(name.clone()));

        let url = self.endpoint(&["upload", ""])?;
        let response = self.client.post(url.clone()).multipart(form).send().await?;
        let uploaded: UploadedFile = check(response, &url).await?.json().await?;
        info!(file = %name, size, "uploaded file");
        Ok(uploaded)
    }

    /// Delete a document by name.
    pub async fn delete_file(&self, name: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["files", name])?;
        let response = self.client.delete(url.clone()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                name: name.to_owned(),
            });
        }
        let body: DeleteResponse = check(response, &url).await?.json().await?;
        info!(file = %name, "deleted file");
        Ok(body.message)
    }

    /// Base URL with `segments` appended (percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::invalid_url(self.base.as_str(), "cannot be a base URL"))?;
            let _ = path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

async fn check(response: Response, url: &Url) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}
