// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Configuration file handling.

use config::Config;
use log::{info, warn};
use serde_with::{DurationSeconds, serde_as};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use url::Url;

/// Default configuration file.
pub const DEF_CONFIG_FILE: &str = "configuration.yaml";

/// Hakuna REST API base URL.
pub const DEF_API_URL: &str = "https://app.hakuna.ch/api/v1";

/// Default refresh interval in minutes.
pub const DEF_SCAN_INTERVAL_MIN: u8 = 5;
pub const MIN_SCAN_INTERVAL_MIN: u8 = 1;
pub const MAX_SCAN_INTERVAL_MIN: u8 = 60;

/// Prefix of environment variables overriding configuration values.
///
/// E.g. `HAKUNA_API_TOKEN=secret` sets the `api.token` key.
pub const ENV_PREFIX: &str = "HAKUNA";

/// Environment variable to enable Hakuna API request and response tracing.
///
/// **Attention:** this setting is only for debugging and exposes all personal data!
pub const ENV_API_MSG_TRACING: &str = "HAKUNA_MSG_TRACING";

#[derive(Default, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    pub integration: IntegrationSettings,
    pub api: ApiSettings,
}

#[derive(serde::Deserialize, serde::Serialize)]
pub struct IntegrationSettings {
    pub interface: String,
    pub http: WebServerSettings,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            interface: "127.0.0.1".to_string(),
            http: WebServerSettings {
                enabled: true,
                port: 8090,
            },
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
pub struct WebServerSettings {
    pub enabled: bool,
    pub port: u16,
}

/// Hakuna account settings.
#[serde_as]
#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct ApiSettings {
    pub url: Url,
    /// Personal API token from <https://app.hakuna.ch/token>.
    pub token: String,
    /// Optional company identifier. Not required for the token based API.
    #[serde(default)]
    pub company: Option<String>,
    /// Refresh interval in minutes.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u8,
    /// HTTP connection timeout, including DNS name resolution.
    /// Make sure that `request_timeout` >= `connection_timeout`.
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "connection_timeout_sec")]
    pub connection_timeout: Duration,
    /// Total time before a response must be received.
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "request_timeout_sec")]
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            token: "".to_string(),
            company: None,
            scan_interval: DEF_SCAN_INTERVAL_MIN,
            connection_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl ApiSettings {
    /// Refresh interval of the coordinator.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval as u64 * 60)
    }

    /// Update the API token.
    pub fn set_token(&mut self, token: impl AsRef<str>) {
        self.token = token.as_ref().trim().to_string();
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

impl Display for ApiSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "url={}, company={}, interval={}min, timeouts={:?}/{:?}",
            self.url,
            self.company.as_deref().unwrap_or("-"),
            self.scan_interval,
            self.connection_timeout,
            self.request_timeout
        )
    }
}

fn default_api_url() -> Url {
    Url::parse(DEF_API_URL).expect("invalid default API URL")
}

fn default_scan_interval() -> u8 {
    DEF_SCAN_INTERVAL_MIN
}

/// Load the configuration settings.
///
/// The application provides default values which can be overriden in the following order:
/// 1. Configuration settings in the yaml or json configuration file specified in `filename`
/// 2. Environment variables with prefix `HAKUNA_` (works only for cfg keys not containing a `_`!)
pub fn get_configuration(filename: Option<&str>) -> Result<Settings, config::ConfigError> {
    // default configuration
    let mut config = Config::builder().add_source(Config::try_from(&Settings::default())?);
    // read optional configuration file to override defaults
    if let Some(filename) = filename {
        info!("Loading configuration file: {filename}");
        config = config.add_source(config::File::with_name(filename));
    }

    // This does NOT WORK for nested configurations! https://github.com/mehcode/config-rs/issues/312
    let config = config
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("_"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;

    check_cfg_values(settings)
}

pub(crate) fn check_cfg_values(mut settings: Settings) -> Result<Settings, config::ConfigError> {
    if !(MIN_SCAN_INTERVAL_MIN..=MAX_SCAN_INTERVAL_MIN).contains(&settings.api.scan_interval) {
        warn!(
            "Invalid scan interval {}min, valid range: {MIN_SCAN_INTERVAL_MIN}-{MAX_SCAN_INTERVAL_MIN}. Using default: {DEF_SCAN_INTERVAL_MIN}min",
            settings.api.scan_interval
        );
        settings.api.scan_interval = DEF_SCAN_INTERVAL_MIN;
    }

    if settings.api.connection_timeout.is_zero()
        || settings.api.request_timeout < settings.api.connection_timeout
    {
        warn!("Invalid API timeout settings, using defaults.");
        let defaults = ApiSettings::default();
        settings.api.connection_timeout = defaults.connection_timeout;
        settings.api.request_timeout = defaults.request_timeout;
    }

    match settings.api.url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(config::ConfigError::Message(format!(
                "invalid scheme in api.url: {scheme}. Valid: [http, https]"
            )));
        }
    }

    let token = settings.api.token.trim().to_string();
    settings.api.token = token;

    Ok(settings)
}
