//! Failure kinds of the token and fetch layer.
//!
//! Public convenience operations flatten these into empty results after
//! logging them; the `try_*` variants hand them to the caller untouched.

use reqwest::StatusCode;
use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The credential provider had no secret to offer.
    #[error("no credential available for login")]
    NoCredential,

    /// Login request failed or returned no session key.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// Network failure or timeout.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: StatusCode, url: String },

    /// Response body was not the expected JSON.
    #[error("malformed response body: {0}")]
    Parse(String),
}

impl FetchError {
    /// A 401 on an authenticated GET; the only failure that triggers a refresh.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::HttpStatus { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::NoCredential => "no_credential",
            FetchError::AuthFailure(_) => "auth_failure",
            FetchError::Transport(_) => "transport",
            FetchError::HttpStatus { .. } => "http_status",
            FetchError::Parse(_) => "parse",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus {
                status,
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
