//! Error types for loading and building aggregate schemas

use thiserror::Error;

use crate::builder::BuildFailure;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised outside the build's own diagnostics: I/O, malformed input,
/// configuration, or a failed build surfaced through `?`.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Malformed schema source:\n  {}", .0.join("\n  "))]
    Malformed(Vec<String>),

    #[error("Unknown aggregate: {0}")]
    UnknownAggregate(String),

    #[error(transparent)]
    Build(#[from] BuildFailure),
}
