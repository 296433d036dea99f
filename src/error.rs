use crate::output::{DiagramKind, OutputFormat};
use std::path::PathBuf;
use thiserror::Error;

/// Codevision error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("Invalid structure document: {0}")]
    Document(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for codevision operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a parser error
    pub fn parser(msg: impl Into<String>) -> Self {
        Error::Parser(msg.into())
    }

    /// Create a structure document error
    pub fn document(msg: impl Into<String>) -> Self {
        Error::Document(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

/// Failure of a single render request.
///
/// Returned instead of diagram text so a caller can never mistake an error
/// message for diagram content. Other render requests are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("{kind} diagrams cannot be rendered as {format}")]
    Unsupported {
        kind: DiagramKind,
        format: OutputFormat,
    },

    #[error("diagram has {actual} nodes, exceeding the limit of {limit}")]
    GraphSizeExceeded { limit: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_path_not_found_display() {
        let err = Error::PathNotFound(PathBuf::from("/some/path"));
        assert_eq!(err.to_string(), "Path not found: /some/path");
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("max_nodes must be at least 1");
        assert_eq!(
            err.to_string(),
            "Config validation error: max_nodes must be at least 1"
        );
    }

    #[test]
    fn test_parser_error() {
        let err = Error::parser("grammar version mismatch");
        assert_eq!(err.to_string(), "Parser error: grammar version mismatch");
    }

    #[test]
    fn test_document_error() {
        let err = Error::document("duplicate token Base");
        assert_eq!(
            err.to_string(),
            "Invalid structure document: duplicate token Base"
        );
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }

    #[test]
    fn test_render_unsupported_display() {
        let err = RenderError::Unsupported {
            kind: DiagramKind::Component,
            format: OutputFormat::PlantUml,
        };
        assert_eq!(
            err.to_string(),
            "component diagrams cannot be rendered as plantuml"
        );
    }

    #[test]
    fn test_render_error_is_transparent() {
        let err: Error = RenderError::GraphSizeExceeded {
            limit: 10,
            actual: 12,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "diagram has 12 nodes, exceeding the limit of 10"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
        assert_send_sync::<RenderError>();
    }
}
