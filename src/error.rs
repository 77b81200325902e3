// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch {target}: {reason}")]
    FetchFailure { target: String, reason: String },

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Commit rejected for {path}: {reason}")]
    ConflictFailure { path: String, reason: String },

    #[error("{slug} was handed to note {minutes} minute(s) ago and may be edited there; use --force to override")]
    EditLocked { slug: String, minutes: i64 },

    #[error("Malformed descriptor {path}: {reason}")]
    MalformedDescriptor { path: String, reason: String },

    #[error("Frontmatter error: {0}")]
    Frontmatter(String),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PipelineError {
    pub fn fetch(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailure {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn conflict(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConflictFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PipelineError::fetch("articles/demo/index.md", "status 404");
        assert_eq!(
            err.to_string(),
            "Failed to fetch articles/demo/index.md: status 404"
        );

        let err = PipelineError::conflict("articles/demo/index.md", "stale sha");
        assert!(err.to_string().contains("stale sha"));

        let err = PipelineError::malformed("meta.json", "missing field `note_id`");
        assert!(err.to_string().starts_with("Malformed descriptor meta.json"));

        let err = PipelineError::EditLocked {
            slug: "demo".to_string(),
            minutes: 3,
        };
        assert!(err.to_string().contains("3 minute(s) ago"));
    }
}
