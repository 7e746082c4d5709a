use std::error::Error;
use std::fmt;

use reqwest::StatusCode;

/// Failure talking to the coaching API.
#[derive(Debug)]
pub enum ApiError {
    /// The server rejected the credentials (HTTP 401/403).
    Unauthenticated,
    /// An authenticated call was attempted without a token.
    MissingToken,
    /// Any other non-success status.
    Status { status: StatusCode, body: String },
    /// The request never produced a response.
    Network(reqwest::Error),
    /// The response body did not match the expected shape.
    Decode(reqwest::Error),
    /// The configured base URL cannot carry path segments.
    InvalidUrl(String),
}

impl ApiError {
    /// Whether this failure should end the signed-in session.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated | ApiError::MissingToken)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthenticated => Some(StatusCode::UNAUTHORIZED),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(err) | ApiError::Decode(err) => err.status(),
            ApiError::MissingToken | ApiError::InvalidUrl(_) => None,
        }
    }

    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            ApiError::Unauthenticated
        } else {
            ApiError::Status { status, body }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthenticated => write!(f, "Session expired or invalid; please log in again"),
            ApiError::MissingToken => write!(f, "Not logged in"),
            ApiError::Status { status, body } if body.trim().is_empty() => {
                write!(f, "API request failed with status {status}")
            }
            ApiError::Status { status, body } => {
                write!(f, "API request failed with status {status}: {}", body.trim())
            }
            ApiError::Network(err) => write!(f, "Could not reach the API: {err}"),
            ApiError::Decode(err) => write!(f, "Unexpected API response: {err}"),
            ApiError::InvalidUrl(url) => write!(f, "Invalid API URL: {url}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Network(err) | ApiError::Decode(err) => Some(err),
            _ => None,
        }
    }
}
