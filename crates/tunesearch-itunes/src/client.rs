// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{Result, TransportError};
use crate::models::{QueryEncoding, SearchResponse, SearchResult};
use crate::transport::{ReqwestTransport, Transport};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

pub const ITUNES_API_BASE: &str = "https://itunes.apple.com";
pub const DEFAULT_ENTITY: &str = "song";
pub const USER_AGENT: &str = concat!("tunesearch/", env!("CARGO_PKG_VERSION"));

/// Client for the iTunes catalog search endpoint.
///
/// Each call to [`search`](Self::search) makes at most one request and is
/// independent of any other call; the client keeps no result state.
#[derive(Clone)]
pub struct QueryClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    entity: String,
    encoding: QueryEncoding,
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("base_url", &self.base_url)
            .field("entity", &self.entity)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl QueryClient {
    /// Create a client against the public iTunes API with default settings.
    pub fn new() -> std::result::Result<Self, TransportError> {
        Self::builder().build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder() -> QueryClientBuilder {
        QueryClientBuilder::default()
    }

    /// Search the catalog for tracks matching `term`.
    ///
    /// An empty term resolves immediately to an empty result without touching
    /// the network. Any failure is terminal for the call.
    ///
    /// # Example
    /// ```no_run
    /// # use tunesearch_itunes::QueryClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = QueryClient::new()?;
    /// let result = client.search("michael jackson").await?;
    /// for track in &result {
    ///     println!("{} ({})", track.title, track.album_or_collection_name);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search(&self, term: &str) -> Result<SearchResult> {
        if term.is_empty() {
            debug!(target: "itunes", "empty search term, no request issued");
            return Ok(SearchResult::empty());
        }

        let url = self.endpoint(term)?;
        let body = self.transport.get(&url).await?;

        let response: SearchResponse = serde_json::from_slice(&body)?;
        debug!(
            target: "itunes",
            tracks = response.results.len(),
            "decoded search response"
        );
        Ok(SearchResult::from(response.results))
    }

    /// Build the request target for `term` without sending anything.
    ///
    /// With [`QueryEncoding::Spaces`] the URL parser still percent-encodes
    /// characters a URL cannot carry (non-ASCII, `"`, `<`, `>`), so only a
    /// malformed base URL yields [`SearchError::InvalidRequest`].
    ///
    /// [`SearchError::InvalidRequest`]: crate::SearchError::InvalidRequest
    pub fn endpoint(&self, term: &str) -> Result<Url> {
        let url = match self.encoding {
            QueryEncoding::Spaces => Url::parse(&format!(
                "{}/search?term={}&entity={}",
                self.base_url,
                encode_spaces(term),
                self.entity
            ))?,
            QueryEncoding::Form => {
                let mut url = Url::parse(&format!("{}/search", self.base_url))?;
                url.query_pairs_mut()
                    .append_pair("term", term)
                    .append_pair("entity", &self.entity);
                url
            }
        };

        trace!(target: "itunes", "built endpoint {}", url);
        Ok(url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn encoding(&self) -> QueryEncoding {
        self.encoding
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        // Building the configured reqwest client should not fail; fall back
        // to a plain client so Default stays infallible.
        let transport = ReqwestTransport::new(USER_AGENT, None)
            .unwrap_or_else(|_| ReqwestTransport::from_client(Client::new()));

        QueryClient {
            transport: Arc::new(transport),
            base_url: ITUNES_API_BASE.to_string(),
            entity: DEFAULT_ENTITY.to_string(),
            encoding: QueryEncoding::default(),
        }
    }
}

/// Replace each space with `+`. Nothing else is escaped.
pub fn encode_spaces(term: &str) -> String {
    term.replace(' ', "+")
}

/// Builder for configuring a [`QueryClient`].
pub struct QueryClientBuilder {
    base_url: String,
    entity: String,
    encoding: QueryEncoding,
    timeout: Option<Duration>,
    user_agent: String,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for QueryClientBuilder {
    fn default() -> Self {
        Self {
            base_url: ITUNES_API_BASE.to_string(),
            entity: DEFAULT_ENTITY.to_string(),
            encoding: QueryEncoding::default(),
            timeout: None,
            user_agent: USER_AGENT.to_string(),
            transport: None,
        }
    }
}

impl QueryClientBuilder {
    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the `entity` query parameter.
    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        self
    }

    pub fn encoding(mut self, encoding: QueryEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set a request timeout. Ignored when a custom transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header. Ignored when a custom transport is supplied.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Use a custom transport instead of the default reqwest one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the query client.
    pub fn build(self) -> std::result::Result<QueryClient, TransportError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.user_agent, self.timeout)?),
        };

        Ok(QueryClient {
            transport,
            base_url: self.base_url,
            entity: self.entity,
            encoding: self.encoding,
        })
    }
}
