// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tunesearch_itunes::client::{DEFAULT_ENTITY, ITUNES_API_BASE};
use tunesearch_itunes::QueryEncoding;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub entity: String,
    pub encoding: QueryEncoding,
    /// Request timeout in seconds. Unset keeps the HTTP client's default.
    pub timeout_secs: Option<u64>,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: ITUNES_API_BASE.to_string(),
            entity: DEFAULT_ENTITY.to_string(),
            encoding: QueryEncoding::Spaces,
            timeout_secs: None,
        }
    }
}

/// What to do with a completion that arrives after a newer search was issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleResponses {
    #[default]
    Discard,
    Apply,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub stale_responses: StaleResponses,
    pub initial_term: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stale_responses: StaleResponses::Discard,
            initial_term: "michael jackson".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub session: SessionConfig,
    pub telemetry: TelemetryConfig,
}

/// Layered configuration sources: defaults, optional TOML file, then
/// environment overrides (prefix: TUNESEARCH_, nesting with `__`).
pub fn figment(config_path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment.merge(Env::prefixed("TUNESEARCH_").split("__"))
}

/// Load configuration from [`figment`]'s layered sources.
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let config: AppConfig = figment(config_path).extract()?;
    Ok(config)
}
