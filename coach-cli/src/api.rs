//! HTTP client for the support backend.

use std::path::{Path, PathBuf};

use reqwest::{
    Client, Response, StatusCode,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use shared::{
    config::client::ClientConfig,
    models::{
        ChatRequest, ChatResponse, ClearDocumentsResponse, DocumentCountResponse, ErrorDetail,
        HealthResponse, ResourceCatalog, UploadResponse,
    },
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Failures talking to the backend, classified so callers can pick the
/// message to show.
#[derive(Error, Debug)]
pub enum ApiError {
    /// An endpoint could not be built from the configured server URL
    #[error("invalid endpoint '{path}': {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// The request never produced a response
    #[error("request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status
    #[error("{url} responded with {status}")]
    Status {
        url: Url,
        status: StatusCode,
        detail: Option<String>,
    },

    /// The body did not match the expected shape
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },

    /// A local file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Error text supplied by the backend, if it sent any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True when the backend could not be reached at all.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Thin typed wrapper over the `/api` endpoints.
#[derive(Clone, Debug)]
pub struct CoachClient {
    client: Client,
    api_base: Url,
}

impl CoachClient {
    /// Builds a client for the server named in `config`.
    ///
    /// # Errors
    /// Returns an error if the API base cannot be derived or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base = config.base_url();
        let api_base = base.join("api/").map_err(|source| ApiError::InvalidUrl {
            path: "api/".to_string(),
            source,
        })?;
        let client = Client::builder()
            .user_agent(concat!("coach-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Transport {
                url: api_base.clone(),
                source,
            })?;
        Ok(Self { client, api_base })
    }

    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.api_base
            .join(path.trim_start_matches('/'))
            .map_err(|source| ApiError::InvalidUrl {
                path: path.to_string(),
                source,
            })
    }

    /// `GET /api/health`.
    ///
    /// # Errors
    /// Any [`ApiError`] variant except `Io`.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = self.endpoint("health")?;
        let response = self.send(&url, self.client.get(url.clone())).await?;
        decode(url, response).await
    }

    /// `GET /api/documents/count`.
    ///
    /// # Errors
    /// Any [`ApiError`] variant except `Io`.
    pub async fn document_count(&self) -> Result<u64, ApiError> {
        let url = self.endpoint("documents/count")?;
        let response = self.send(&url, self.client.get(url.clone())).await?;
        let body: DocumentCountResponse = decode(url, response).await?;
        Ok(body.count)
    }

    /// `POST /api/chat`.
    ///
    /// # Errors
    /// Any [`ApiError`] variant except `Io`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let url = self.endpoint("chat")?;
        debug!(
            use_rag = request.use_rag,
            provider = request.provider.as_deref().unwrap_or("default"),
            language = request.language.as_deref().unwrap_or("en"),
            "sending chat message"
        );
        let response = self
            .send(&url, self.client.post(url.clone()).json(request))
            .await?;
        decode(url, response).await
    }

    /// `POST /api/upload` with the file as multipart field `file`.
    ///
    /// # Errors
    /// [`ApiError::Io`] when the file cannot be read, otherwise as for any
    /// other request.
    pub async fn upload(&self, path: &Path) -> Result<UploadResponse, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());
        let url = self.endpoint("upload")?;
        debug!(file = %filename, bytes = bytes.len(), "uploading document");

        let mut part = Part::bytes(bytes).file_name(filename.clone());
        if let Some(mime) = mime_for(&filename) {
            part = part.mime_str(mime).map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        }
        let form = Form::new().part("file", part);
        let response = self
            .send(&url, self.client.post(url.clone()).multipart(form))
            .await?;
        decode(url, response).await
    }

    /// `DELETE /api/documents`.
    ///
    /// # Errors
    /// Any [`ApiError`] variant except `Io`.
    pub async fn clear_documents(&self) -> Result<ClearDocumentsResponse, ApiError> {
        let url = self.endpoint("documents")?;
        let response = self.send(&url, self.client.delete(url.clone())).await?;
        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        if body.trim().is_empty() {
            return Ok(ClearDocumentsResponse::default());
        }
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { url, source })
    }

    /// Fetches the static resource directory document from `url`.
    ///
    /// # Errors
    /// Any [`ApiError`] variant except `Io`.
    pub async fn fetch_resources(&self, url: Url) -> Result<ResourceCatalog, ApiError> {
        let response = self.send(&url, self.client.get(url.clone())).await?;
        decode(url, response).await
    }

    /// Sends the request and turns non-success statuses into
    /// [`ApiError::Status`] carrying the backend's `detail`.
    async fn send(
        &self,
        url: &Url,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|source| {
            warn!(url = %url, error = %source, "backend unreachable");
            ApiError::Transport {
                url: url.clone(),
                source,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(url = %url, status = %status, "backend responded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = ErrorDetail::from_body(&body);
        warn!(
            url = %url,
            status = %status,
            detail = detail.as_deref().unwrap_or(""),
            "backend rejected request"
        );
        Err(ApiError::Status {
            url: url.clone(),
            status,
            detail,
        })
    }
}

async fn decode<T: DeserializeOwned>(url: Url, response: Response) -> Result<T, ApiError> {
    let body = response.text().await.map_err(|source| ApiError::Transport {
        url: url.clone(),
        source,
    })?;
    serde_json::from_str(&body).map_err(|source| ApiError::Decode { url, source })
}

fn mime_for(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "txt" | "md" => Some("text/plain"),
        _ => None,
    }
}
