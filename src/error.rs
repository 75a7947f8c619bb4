// src/error.rs

//! Unified error handling for the portal client.

use thiserror::Error;

/// Result type alias for portal operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// Only failures the caller has to act on end up here. A page that could
/// not be fetched during the crawl is logged and treated as empty instead.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built or a request could not be prepared
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// A filter pattern is not a valid regular expression
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A link matched its condition set but carries no usable id
    #[error("Link {url} has no integer '{param}' parameter")]
    MissingId { param: String, url: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Create a pattern compilation error.
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a missing identifier error.
    pub fn missing_id(param: impl Into<String>, url: impl Into<String>) -> Self {
        Self::MissingId {
            param: param.into(),
            url: url.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
