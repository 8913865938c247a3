//! Error types for notionsite.
//!
//! Library crates use [`NotionSiteError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all notionsite operations.
#[derive(Debug, thiserror::Error)]
pub enum NotionSiteError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to the content store.
    #[error("network error: {0}")]
    Network(String),

    /// The content store answered with a non-success status.
    #[error("api error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// A response body or property value could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A database exposes no data source to query.
    #[error("no data sources found for database {label}")]
    NoDataSources { label: String },

    /// Cursor pagination ended in an inconsistent state.
    #[error("pagination error: {0}")]
    Pagination(String),

    /// Downloading or persisting an asset failed.
    #[error("asset error: {0}")]
    Asset(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NotionSiteError>;

impl NotionSiteError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = NotionSiteError::config("missing token");
        assert_eq!(err.to_string(), "config error: missing token");

        let err = NotionSiteError::NoDataSources {
            label: "projects".into(),
        };
        assert_eq!(
            err.to_string(),
            "no data sources found for database projects"
        );

        let err = NotionSiteError::Api {
            status: 404,
            code: "object_not_found".into(),
            message: "Could not find database".into(),
        };
        assert!(err.to_string().contains("404 object_not_found"));
    }
}
