//! Typed client for the SmartReview backend HTTP surface.

mod client;
mod types;

use std::fmt;

use serde_json::Value;

pub use client::BackendClient;
pub use types::{Installation, InstallationAccount, Repo, User};

/// Categories of backend errors for consistent handling at the controller
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 401: the session token is missing, expired, or rejected.
    Unauthorized,
    /// 404: the addressed resource does not exist (benign for deletes).
    NotFound,
    /// Any other non-2xx response from the backend.
    Server,
    /// The request never completed (connect failure, timeout).
    Network,
    /// A 2xx response whose body could not be decoded.
    Parse,
}

/// Structured error from the backend with kind and details.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    /// Creates an error from a non-success HTTP response.
    ///
    /// Pulls the server-provided message out of an `{"error": "..."}` body
    /// when present so it can be surfaced verbatim.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 => ApiErrorKind::Unauthorized,
            404 => ApiErrorKind::NotFound,
            _ => ApiErrorKind::Server,
        };

        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(msg) = json.get("error").and_then(|v| v.as_str())
        {
            return Self {
                kind,
                message: msg.to_string(),
                details: Some(body.to_string()),
            };
        }

        Self {
            kind,
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Creates a network-level error from a transport failure.
    pub fn network(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else {
            "Could not reach the server".to_string()
        };
        Self {
            kind: ApiErrorKind::Network,
            message,
            details: Some(err.to_string()),
        }
    }

    /// Creates a parse error for an undecodable success body.
    pub fn parse(err: &reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: "Unexpected response from the server".to_string(),
            details: Some(err.to_string()),
        }
    }

    /// True when the backend rejected the session token.
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    /// True when the addressed resource was absent.
    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for backend operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
