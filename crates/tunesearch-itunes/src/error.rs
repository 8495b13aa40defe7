// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Terminal failure of a single search call. None of these are retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The term could not be turned into a well-formed request target.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request was sent but no response body was obtained.
    #[error("network error: {0}")]
    Network(String),

    /// A body was received but did not match the expected shape.
    #[error("failed to decode search response: {0}")]
    Decode(String),
}

/// Failure kind without the cause text, for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    Network,
    Decode,
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            SearchError::Network(_) => ErrorKind::Network,
            SearchError::Decode(_) => ErrorKind::Decode,
        }
    }
}

impl From<url::ParseError> for SearchError {
    fn from(err: url::ParseError) -> Self {
        SearchError::InvalidRequest(err.to_string())
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Decode(err.to_string())
    }
}

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for SearchError {
    fn from(err: TransportError) -> Self {
        SearchError::Network(err.to_string())
    }
}
