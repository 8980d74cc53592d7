//! Error Types
//!
//! Failures the engine can observe while talking to the research backend.
//! None of these reach the user verbatim: the request pipeline folds every
//! [`ChatError`] into one generic assistant message and keeps the detail for
//! the logs.

use std::time::Duration;

use thiserror::Error;

/// Backend-facing failures
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ChatError {
    /// Connection refused, DNS failure, reset, etc.
    #[error("network failure: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status
    #[error("backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// The body did not match the expected schema or broke a value invariant
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No answer within the configured request timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The background request task died before producing a result
    #[error("request task aborted: {0}")]
    Aborted(String),
}

impl ChatError {
    /// Whether this is a network-or-server failure (as opposed to a bad body)
    #[must_use]
    pub fn is_network_or_server(&self) -> bool {
        !matches!(self, Self::MalformedResponse(_))
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Why a `send` was refused before anything happened
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SendRejected {
    /// Input was empty after trimming
    #[error("message is empty")]
    EmptyInput,
    /// A previous request is still in flight
    #[error("a request is already pending")]
    Busy,
}
