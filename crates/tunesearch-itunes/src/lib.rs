// SPDX-License-Identifier: GPL-3.0-or-later

//! iTunes catalog search client.
//!
//! This crate turns a free-text search term into a request against the
//! iTunes `search` endpoint, performs it through a pluggable [`Transport`],
//! and decodes the response into an ordered list of [`Track`]s.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{QueryClient, QueryClientBuilder};
pub use error::{ErrorKind, Result, SearchError, TransportError};
pub use models::{QueryEncoding, SearchResult, Track};
pub use transport::{ReqwestTransport, Transport};

/// Result of one search invocation.
pub type Outcome = Result<SearchResult>;
