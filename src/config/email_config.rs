use serde::Deserialize;
use std::time::Duration;

/// `email` section. Credentials normally come from the environment.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EmailConfig {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default = "default_timeout_in_seconds")]
    pub timeout_in_seconds: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            service: String::new(),
            username: None,
            password: None,
            recipients: Vec::new(),
            timeout_in_seconds: default_timeout_in_seconds(),
        }
    }
}

impl EmailConfig {
    /// Upper bound for a single delivery attempt
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_in_seconds)
    }
}

fn default_timeout_in_seconds() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_config_deserialization() {
        let yaml = r#"
service: Gmail
recipients:
  - ops@example.com
  - oncall@example.com
"#;
        let config: EmailConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.service, "Gmail");
        assert_eq!(config.recipients.len(), 2);
        assert!(config.username.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }
}
