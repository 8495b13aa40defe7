// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, trace};
use url::Url;

use crate::error::TransportError;

/// HTTP GET capability the query client calls into.
///
/// Implementations make exactly one attempt and hand back the response body
/// whatever the status code; interpreting the body is the caller's job.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn get(&self, url: &Url) -> std::result::Result<Vec<u8>, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport. `timeout` of `None` keeps reqwest's default (no timeout).
    pub fn new(
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> std::result::Result<Self, TransportError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> std::result::Result<Vec<u8>, TransportError> {
        trace!(target: "itunes", "GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        debug!(target: "itunes", "response status: {}", status);

        let body = response.bytes().await?;
        trace!(target: "itunes", bytes = body.len(), "response body received");
        Ok(body.to_vec())
    }
}
