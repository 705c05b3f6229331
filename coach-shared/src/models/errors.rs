//! Error bodies sent by the backend.

use serde::{Deserialize, Serialize};

/// Error body returned by the backend (`{"detail": ...}`).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Human-readable reason, shown to the user verbatim.
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorDetail {
    /// Creates an error body carrying `detail`.
    ///
    /// # Arguments
    /// * `detail` - The reason reported by the backend
    ///
    /// # Returns
    /// A new [`ErrorDetail`] with the detail set.
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// Extracts the detail text from a raw response body.
    ///
    /// Validation errors carry a structured `detail`; only plain strings count
    /// as displayable text, and blank strings are treated as absent.
    #[must_use]
    pub fn from_body(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value
            .get("detail")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|detail| !detail.is_empty())
            .map(ToString::to_string)
    }

    /// Checks if this body has a detail.
    #[must_use]
    pub const fn has_detail(&self) -> bool {
        self.detail.is_some()
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{detail}"),
            None => write!(f, "unknown error"),
        }
    }
}

impl std::error::Error for ErrorDetail {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_new() {
        let error = ErrorDetail::new("Unsupported file type");
        assert_eq!(error.detail.as_deref(), Some("Unsupported file type"));
        assert!(error.has_detail());
    }

    #[test]
    fn test_error_detail_from_string_body() {
        let detail = ErrorDetail::from_body(
            r#"{"detail":"Unsupported file type. Please upload .txt or .pdf files."}"#,
        );
        assert_eq!(
            detail.as_deref(),
            Some("Unsupported file type. Please upload .txt or .pdf files.")
        );
    }

    #[test]
    fn test_error_detail_structured_body_is_ignored() {
        let body = r#"{"detail":[{"loc":["body","file"],"msg":"field required"}]}"#;
        assert_eq!(ErrorDetail::from_body(body), None);
    }

    #[test]
    fn test_error_detail_non_json_body() {
        assert_eq!(ErrorDetail::from_body("Internal Server Error"), None);
        assert_eq!(ErrorDetail::from_body(""), None);
        assert_eq!(ErrorDetail::from_body(r#"{"detail":"   "}"#), None);
    }

    #[test]
    fn test_error_detail_display() {
        assert_eq!(ErrorDetail::new("boom").to_string(), "boom");
        assert_eq!(ErrorDetail::default().to_string(), "unknown error");
    }

    #[test]
    fn test_error_detail_deserialization() {
        let error: ErrorDetail = serde_json::from_str(r#"{"detail":"nope"}"#).unwrap();
        assert_eq!(error, ErrorDetail::new("nope"));
        let empty: ErrorDetail = serde_json::from_str("{}").unwrap();
        assert!(!empty.has_detail());
    }
}
