// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Result;
use tunesearch_config::AppConfig;
use tunesearch_itunes::QueryClient;

pub mod session;

pub use session::{Applied, Completion, SearchSession, StalePolicy, Submission};

use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub client: QueryClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    pub fn on_start(&self) {
        info!(
            target: "application",
            base_url = %self.config.catalog.base_url,
            entity = %self.config.catalog.entity,
            "application state initialized"
        );
    }

    /// A fresh session using the configured stale-response policy.
    pub fn session(&self) -> SearchSession {
        SearchSession::new(
            self.client.clone(),
            self.config.session.stale_responses.into(),
        )
    }
}

fn build_client(config: &AppConfig) -> Result<QueryClient> {
    let catalog = &config.catalog;
    let mut builder = QueryClient::builder()
        .base_url(catalog.base_url.as_str())
        .entity(catalog.entity.as_str())
        .encoding(catalog.encoding);

    if let Some(timeout) = catalog.timeout() {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunesearch_itunes::QueryEncoding;

    #[test]
    fn client_follows_catalog_config() {
        let mut config = AppConfig::default();
        config.catalog.base_url = "http://localhost:8080/".to_string();
        config.catalog.encoding = QueryEncoding::Form;

        let state = AppState::new(config).unwrap();

        assert_eq!(state.client.base_url(), "http://localhost:8080");
        assert_eq!(state.client.encoding(), QueryEncoding::Form);
        assert_eq!(
            state.client.endpoint("a&b").unwrap().as_str(),
            "http://localhost:8080/search?term=a%26b&entity=song"
        );
    }

    #[test]
    fn session_uses_configured_policy() {
        let mut config = AppConfig::default();
        config.session.stale_responses = tunesearch_config::StaleResponses::Apply;

        let state = AppState::new(config).unwrap();

        assert_eq!(state.session().policy(), StalePolicy::ApplyAll);
    }
}
