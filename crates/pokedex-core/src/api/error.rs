use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{message}")]
    ServerError { status: u16, message: String },

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error bodies may carry a human-readable reason in either field.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Truncate a message to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// `detail` or `message` from a JSON error body, else `HTTP <status>`.
    pub fn message_from_body(status: StatusCode, body: &str) -> String {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| {
                let non_empty = |m: &String| !m.trim().is_empty();
                b.detail.filter(non_empty).or(b.message.filter(non_empty))
            })
            .map(|m| Self::truncate_body(&m))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::message_from_body(status, body);
        match status.as_u16() {
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited(message),
            code @ 500..=599 => ApiError::ServerError {
                status: code,
                message,
            },
            code => ApiError::Http {
                status: code,
                message,
            },
        }
    }

    /// HTTP status behind the failure, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound(_) => Some(404),
            ApiError::RateLimited(_) => Some(429),
            ApiError::ServerError { status, .. } | ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse(_) => None,
        }
    }

    /// Rate limiting, 5xx and connectivity failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited(_) | ApiError::ServerError { .. } | ApiError::Network(_)
        )
    }
}
