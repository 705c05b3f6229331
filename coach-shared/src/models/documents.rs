//! Health, count, upload and clear bodies.

use serde::{Deserialize, Serialize};

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// `"healthy"` when the backend is ready to answer.
    pub status: String,
    /// Number of indexed chunks.
    #[serde(default)]
    pub documents_count: u64,
    /// Whether retrieval over uploaded documents is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_enabled: Option<bool>,
    /// Provider the backend uses when none is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,
    /// Providers the backend can route to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
}

impl HealthResponse {
    /// Whether the backend reported itself ready.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Body of `GET /api/documents/count`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentCountResponse {
    /// Number of indexed chunks.
    pub count: u64,
}

/// Successful body of `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    /// Name the backend stored the file under.
    pub filename: String,
    /// Chunks added to the index.
    pub chunks_created: u64,
    /// Backend status word, usually `"success"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Successful body of `DELETE /api/documents`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClearDocumentsResponse {
    /// Backend status word.
    #[serde(default)]
    pub status: Option<String>,
    /// Confirmation text from the backend.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_health_body_parses() {
        let health: HealthResponse =
            serde_json::from_str(r#"{"status":"healthy","documents_count":5}"#).unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.documents_count, 5);
        assert!(health.providers.is_none());
    }

    #[test]
    fn health_with_providers_parses() {
        let health: HealthResponse = serde_json::from_str(
            r#"{"status":"degraded","rag_enabled":true,"documents_count":0,
                "default_provider":"claude","providers":["ollama","openai"]}"#,
        )
        .unwrap();
        assert!(!health.is_healthy());
        assert_eq!(health.rag_enabled, Some(true));
        assert_eq!(health.default_provider.as_deref(), Some("claude"));
        assert_eq!(health.providers.unwrap().len(), 2);
    }

    #[test]
    fn upload_body_parses() {
        let upload: UploadResponse = serde_json::from_str(
            r#"{"filename":"guide.pdf","chunks_created":12,"status":"success"}"#,
        )
        .unwrap();
        assert_eq!(upload.filename, "guide.pdf");
        assert_eq!(upload.chunks_created, 12);
    }

    #[test]
    fn clear_body_tolerates_empty_object() {
        let cleared: ClearDocumentsResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(cleared, ClearDocumentsResponse::default());
    }
}
