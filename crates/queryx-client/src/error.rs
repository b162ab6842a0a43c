//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Client errors.
///
/// The backend only distinguishes two failure classes: the request never
/// produced a usable answer ([`Error::Transport`]), or it produced one whose
/// response code says the operation failed ([`Error::Http`] and
/// [`Error::Rejected`]). The remaining variants are raised locally before or
/// after the exchange.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection, timeout or TLS failure.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("{message} (HTTP {status})")]
    Http { status: StatusCode, message: String },

    /// The server answered, but the envelope response code is not "200".
    #[error("{message}")]
    Rejected { rc: String, message: String },

    /// The response body was not the JSON shape this endpoint returns.
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Form state was rejected before any request was sent.
    #[error("{0}")]
    Validation(String),
}

impl Error {
    /// Whether the failure happened below the HTTP layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Response code reported by the server, if the server answered.
    pub fn response_code(&self) -> Option<String> {
        match self {
            Error::Http { status, .. } => Some(status.as_u16().to_string()),
            Error::Rejected { rc, .. } => Some(rc.clone()),
            _ => None,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
