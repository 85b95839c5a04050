//! Error types for the Bot API client.
//!
//! # Design
//! Four kinds, one per stage of a call: encoding the parameters, moving bytes
//! over the network, decoding the response, and the remote side rejecting the
//! request. `Remote` is the normal failure path for bad input (unknown chat,
//! malformed text, expired token) and is kept apart from the local and
//! transport kinds so callers can branch on it.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, BotApiError>;

/// Errors returned by `Transport` and `BotClient`.
#[derive(Debug, Error)]
pub enum BotApiError {
    /// The request parameters could not be represented as JSON or as a query.
    #[error("failed to encode request parameters: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Connecting, sending, timing out or reading the body failed.
    #[error("transport failure: {0}")]
    Transport(#[source] ureq::Error),

    /// The response was not a valid envelope, or `result` did not match the
    /// expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The envelope reported `ok: false`.
    #[error("bot api error {code}: {message}")]
    Remote { code: i64, message: String },
}

impl BotApiError {
    pub fn is_remote(&self) -> bool {
        matches!(self, BotApiError::Remote { .. })
    }

    /// The remote `error_code`, if this is a remote rejection.
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            BotApiError::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the call was aborted by the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BotApiError::Transport(ureq::Error::Timeout(_)))
    }
}
