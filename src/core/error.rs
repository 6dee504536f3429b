use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A failure that has been sorted into "retry later" (soft) or "needs a
/// human" (hard).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedError {
    pub soft: bool,
    pub message: String,
    /// Structured error body returned by the platform, when it parsed.
    pub detail: Option<serde_json::Value>,
}

impl ClassifiedError {
    pub fn soft(message: impl Into<String>) -> Self {
        Self {
            soft: true,
            message: message.into(),
            detail: None,
        }
    }

    pub fn hard(message: impl Into<String>) -> Self {
        Self {
            soft: false,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Central error type for the publishing core.
/// Every module returns `Result<T, PublishError>`.
#[derive(Debug, Error)]
pub enum PublishError {
    // ── Metadata ────────────────────────────────────────
    #[error("Malformed mod descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("Unknown mod/plugin loader \"{0}\"")]
    UnsupportedLoaderType(String),

    #[error("Config file {0} was not found inside the artifact")]
    MissingConfigFile(String),

    // ── Platform ────────────────────────────────────────
    #[error("Failed to fetch the version catalog: {0}")]
    CatalogFetch(ClassifiedError),

    #[error("Failed to upload: {0}")]
    Upload(ClassifiedError),

    #[error("Platform request failed: {0}")]
    Request(ClassifiedError),

    #[error("Malformed platform response: {0}")]
    MalformedResponse(String),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Decoding ────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type PublishResult<T> = Result<T, PublishError>;

impl PublishError {
    /// Whether the caller may retry the operation that produced this error.
    ///
    /// Transport failures without a status code count as soft when they
    /// never reached the platform or were cut off mid-body.
    pub fn is_soft(&self) -> bool {
        match self {
            PublishError::CatalogFetch(e) | PublishError::Upload(e) | PublishError::Request(e) => {
                e.soft
            }
            PublishError::Http(e) => crate::core::http::is_soft_transport(e),
            _ => false,
        }
    }

    /// The classified form of this error, if it carries one.
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            PublishError::CatalogFetch(e) | PublishError::Upload(e) | PublishError::Request(e) => {
                Some(e)
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for PublishError {
    fn from(source: std::io::Error) -> Self {
        PublishError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_classified_soft_errors_are_soft() {
        assert!(PublishError::Upload(ClassifiedError::soft("503")).is_soft());
        assert!(!PublishError::Upload(ClassifiedError::hard("404")).is_soft());
        assert!(PublishError::CatalogFetch(ClassifiedError::soft("html")).is_soft());
        assert!(!PublishError::MalformedResponse("success=false".into()).is_soft());
        assert!(!PublishError::UnsupportedLoaderType("rift".into()).is_soft());
    }

    #[test]
    fn detail_is_kept_alongside_the_verdict() {
        let err = ClassifiedError::hard("bad")
            .with_detail(serde_json::json!({ "errorCode": 1001 }));
        assert!(!err.soft);
        assert_eq!(err.detail.unwrap()["errorCode"], 1001);
    }
}
