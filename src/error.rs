// src/error.rs

use std::fmt;

use reqwest::StatusCode;

/// Global Application Error Enum.
/// Every fallible operation in the client reports through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // Connection refused, DNS, TLS, broken body...
    Transport(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized (or no token held when one is required)
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // Any other non-success status
    Status { status: u16, body: String },

    // Response body did not match the expected shape
    Decode(String),

    // Token storage could not be read or written
    Storage(String),

    // Local form validation failed; the message is user-facing
    Validation(String),

    // The document picker failed (not cancelled)
    Picker(String),

    // Missing or malformed configuration
    Config(String),
}

impl AppError {
    /// Maps a non-success HTTP status and its body to the matching variant.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => AppError::BadRequest(body),
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(body),
            StatusCode::NOT_FOUND => AppError::NotFound(body),
            other => AppError::Status {
                status: other.as_u16(),
                body,
            },
        }
    }

    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::BadRequest(_) => Some(400),
            AppError::Unauthorized(_) => Some(401),
            AppError::NotFound(_) => Some(404),
            AppError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Transport(msg) => write!(f, "network error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "not found: {}", msg),
            AppError::Status { status, body } => write!(f, "HTTP {}: {}", status, body),
            AppError::Decode(msg) => write!(f, "unexpected response: {}", msg),
            AppError::Storage(msg) => write!(f, "storage error: {}", msg),
            AppError::Validation(msg) => write!(f, "{}", msg),
            AppError::Picker(msg) => write!(f, "document picker failed: {}", msg),
            AppError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `reqwest::Error` into the matching `AppError`.
/// Allows using `?` operator on requests.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::from_status(status, err.to_string())
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
