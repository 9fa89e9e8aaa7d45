use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of API errors for consistent handling by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Missing or rejected credentials (no token, HTTP 401)
    Authentication,
    /// Request failed in transit, or non-2xx without a usable body
    Network,
    /// Non-2xx carrying a server-supplied message
    Server,
    /// Request exceeded the configured timeout
    Timeout,
    /// Request was cancelled by the caller
    Cancelled,
    /// Response body did not match the expected shape
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Authentication => write!(f, "authentication"),
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::Server => write!(f, "server"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Cancelled => write!(f, "cancelled"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the remote API with kind and details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status, when the server answered
    pub status: Option<u16>,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Authentication, message)
    }

    /// Creates an error from a non-2xx response.
    ///
    /// Uses the `message` field of a JSON body when present, otherwise
    /// `fallback`.
    pub fn from_status(status: u16, body: &str, fallback: &str) -> Self {
        let server_message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|msg| !msg.is_empty())
                    .map(str::to_string)
            });

        let kind = match (status, &server_message) {
            (401, _) => ApiErrorKind::Authentication,
            (_, Some(_)) => ApiErrorKind::Server,
            (_, None) => ApiErrorKind::Network,
        };

        Self {
            kind,
            message: server_message.unwrap_or_else(|| fallback.to_string()),
            status: Some(status),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(after: Duration) -> Self {
        Self::new(ApiErrorKind::Timeout, "Request timed out").with_details(format!(
            "no response within {}s",
            after.as_secs_f32()
        ))
    }

    /// Creates a cancellation error.
    pub fn cancelled() -> Self {
        Self::new(ApiErrorKind::Cancelled, "Request cancelled")
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }

    /// Classifies a transport error from reqwest.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::new(ApiErrorKind::Timeout, "Request timed out")
        } else if err.is_decode() {
            ApiError::parse(format!("Invalid response: {err}"))
        } else if err.is_connect() {
            ApiError::new(ApiErrorKind::Network, format!("Connection failed: {err}"))
        } else {
            ApiError::new(ApiErrorKind::Network, format!("Request failed: {err}"))
        }
    }

    /// Attaches details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// True when the server answered with a non-2xx status.
    pub fn is_http_status(&self) -> bool {
        self.status.is_some()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
