//! Error types for the transit catalog client
//!
//! This module defines error types for all components of the application.
//! Errors are designed to be actionable and provide clear context for
//! debugging and user feedback.

use std::path::PathBuf;

use thiserror::Error;

/// Body of an HTTP error response, classified by content type.
///
/// The catalog API reports failures as JSON documents; intermediate proxies
/// and the file host sometimes answer with plain text. Both shapes are kept
/// so callers can inspect structured details when they exist.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// Response declared a JSON content type and parsed as JSON
    Json(serde_json::Value),
    /// Anything else, decoded lossily as text
    Text(String),
}

impl ErrorBody {
    /// Classify a response body using its `Content-Type` header.
    ///
    /// A JSON content type with an unparseable body falls back to the text
    /// form rather than discarding the payload.
    pub fn from_parts(content_type: Option<&str>, bytes: &[u8]) -> Self {
        let is_json = content_type
            .map(|ct| ct.contains("json"))
            .unwrap_or(false);

        if is_json {
            if let Ok(value) = serde_json::from_slice(bytes) {
                return ErrorBody::Json(value);
            }
        }
        ErrorBody::Text(String::from_utf8_lossy(bytes).into_owned())
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorBody::Json(value) => write!(f, "{}", value),
            ErrorBody::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Catalog API and derived-file request errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP transport failure (connect, timeout, decode)
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be constructed
    #[error("Invalid URL")]
    Url(#[from] url::ParseError),

    /// Server answered with an error status; the response body is carried
    /// so callers can surface the API's own message
    #[error("Catalog API returned HTTP {status}: {body}")]
    Status { status: u16, body: ErrorBody },

    /// Response payload did not match the expected shape
    #[error("Unexpected response payload: {reason}")]
    UnexpectedPayload { reason: String },

    /// A dataset's hosted URL was too short to derive a sibling file from
    #[error("Cannot derive {file} from hosted URL: {url}")]
    UnderivableUrl { file: String, url: String },
}

/// Token storage and verification errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No token in the environment or .env file
    #[error(
        "Missing catalog API token. Set MOBILITY_API_TOKEN or run 'auth setup'"
    )]
    MissingToken,

    /// Token rejected during interactive entry
    #[error("Invalid token: {reason}")]
    InvalidToken { reason: String },

    /// Verification request could not be completed
    #[error("Could not verify the token against the catalog API")]
    VerificationFailed,

    /// File I/O error during token storage
    #[error("Failed to save token to file")]
    TokenStorage(#[from] std::io::Error),

    /// Permission error on the .env file
    #[error("Permission denied accessing token file: {path}")]
    PermissionDenied { path: PathBuf },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// I/O error reading configuration
    #[error("I/O error reading configuration")]
    Io(#[from] std::io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum CatalogError {
    /// API request error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl CatalogError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            CatalogError::Api(ApiError::Http(_)) => true,
            CatalogError::Api(ApiError::Status { status, .. }) => {
                matches!(status, 429 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            CatalogError::Api(_) => "api",
            CatalogError::Auth(_) => "authentication",
            CatalogError::Config(_) => "config",
            CatalogError::Io(_) => "io",
            CatalogError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CatalogError>;

/// API result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Authentication result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
