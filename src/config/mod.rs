pub mod email_config;
pub mod endpoint_config;
pub mod monitor_config;
pub mod server_config;

use crate::config::email_config::EmailConfig;
use crate::config::endpoint_config::EndpointConfig;
use crate::config::monitor_config::MonitorConfig;
use crate::config::server_config::ServerConfig;
use crate::monitor::MonitorSettings;
use crate::notifier::RecipientList;
use crate::probe::ProbeConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub const ENV_EMAIL_SERVICE: &str = "EMAIL_SERVICE";
pub const ENV_EMAIL_USERNAME: &str = "EMAIL_USERNAME";
pub const ENV_EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";
pub const ENV_PORT: &str = "PORT";

/// Upper bound for every interval and timeout setting (one year)
pub const MAX_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("missing required setting: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("invalid PORT override '{0}'")]
    InvalidPort(String),
}

/// Main configuration structure matching config.yaml format
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a YAML file, apply process environment
    /// overrides and validate the result
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Environment values win over the file. `lookup` is usually
    /// `std::env::var`; tests pass a map instead.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(service) = lookup(ENV_EMAIL_SERVICE) {
            self.email.service = service;
        }
        if let Some(username) = lookup(ENV_EMAIL_USERNAME) {
            self.email.username = Some(username);
        }
        if let Some(password) = lookup(ENV_EMAIL_PASSWORD) {
            self.email.password = Some(password);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        Ok(())
    }

    /// Reject configurations the monitor cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.url.trim().is_empty() {
            return Err(ConfigError::MissingField("endpoint.url"));
        }
        let url = reqwest::Url::parse(&self.endpoint.url).map_err(|e| ConfigError::InvalidValue {
            field: "endpoint.url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "endpoint.url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        check_seconds("monitor.interval_in_seconds", self.monitor.interval_in_seconds)?;
        check_seconds("monitor.timeout_in_seconds", self.monitor.timeout_in_seconds)?;

        if self.email.service.trim().is_empty() {
            return Err(ConfigError::MissingField("email.service"));
        }
        if self.email.recipients.is_empty() {
            return Err(ConfigError::MissingField("email.recipients"));
        }
        if let Some(bad) = self
            .email
            .recipients
            .iter()
            .find(|r| !r.trim().contains('@'))
        {
            return Err(ConfigError::InvalidValue {
                field: "email.recipients",
                reason: format!("'{}' is not an email address", bad),
            });
        }
        if self.email.username.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField("email.username"));
        }
        if self.email.password.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField("email.password"));
        }
        check_seconds("email.timeout_in_seconds", self.email.timeout_in_seconds)?;

        Ok(())
    }

    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            endpoint_url: self.endpoint.url.clone(),
            timeout: self.monitor.timeout(),
            verify_tls: self.endpoint.check_ssl,
            expected_body_substring: self.endpoint.body_text_to_check.clone(),
            interval: self.monitor.interval(),
        }
    }

    pub fn recipients(&self) -> RecipientList {
        self.email.recipients.iter().map(|r| r.trim()).collect()
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            endpoint_title: self.endpoint.display_title().to_string(),
            probe: self.probe_config(),
            recipients: self.recipients(),
            delivery_timeout: self.email.timeout(),
        }
    }
}

fn check_seconds(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    if value > MAX_SECONDS {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be at most {} seconds", MAX_SECONDS),
        });
    }
    Ok(())
}
