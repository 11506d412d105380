use anyhow::{Context, Result};

use crate::config::Config;
use crate::notifier::{message, Notifier, SmtpNotifier};
use crate::probe::{HttpProbe, Probe, ProbeResult};

/// Run one probe outside the control loop, optionally mailing a failure
pub async fn run_single_check(config: &Config, notify: bool) -> Result<ProbeResult> {
    let probe_config = config.probe_config();
    let probe = HttpProbe::new(&probe_config).context("Failed to build HTTP client")?;
    let result = probe.check(&probe_config).await;

    if let (true, ProbeResult::Failure(reason)) = (notify, &result) {
        let notifier = SmtpNotifier::from_config(&config.email).context("Invalid email settings")?;
        let request = message::endpoint_failure(
            config.endpoint.display_title(),
            &probe_config.endpoint_url,
            reason,
            &message::now(),
            &config.recipients(),
        );
        tokio::time::timeout(config.email.timeout(), notifier.notify(&request))
            .await
            .context("Notification timed out")?
            .context("Failed to send notification")?;
    }

    Ok(result)
}

/// Human-readable configuration summary with credentials masked
pub fn describe_config(config: &Config) -> String {
    let mask = |value: &Option<String>| match value.as_deref() {
        Some(v) if !v.is_empty() => "********",
        _ => "(not set)",
    };

    let lines = [
        "Endpoint:".to_string(),
        format!("  url: {}", config.endpoint.url),
        format!("  title: {}", config.endpoint.display_title()),
        format!("  check_ssl: {}", config.endpoint.check_ssl),
        format!(
            "  body_text_to_check: {}",
            config.endpoint.body_text_to_check.as_deref().unwrap_or("(none)")
        ),
        "Monitor:".to_string(),
        format!("  interval: {}s", config.monitor.interval_in_seconds),
        format!("  timeout: {}s", config.monitor.timeout_in_seconds),
        "Email:".to_string(),
        format!("  service: {}", config.email.service),
        format!(
            "  username: {}",
            config.email.username.as_deref().unwrap_or("(not set)")
        ),
        format!("  password: {}", mask(&config.email.password)),
        format!("  recipients: {}", config.recipients()),
        "Server:".to_string(),
        format!("  host: {}", config.server.host),
        format!("  port: {}", config.server.port),
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_config_masks_password() {
        let mut config = Config::default();
        config.endpoint.url = "https://example.com".to_string();
        config.email.password = Some("hunter2".to_string());
        config.email.recipients = vec!["b@example.com".to_string(), "a@example.com".to_string()];

        let text = describe_config(&config);
        assert!(text.contains("url: https://example.com"));
        assert!(text.contains("password: ********"));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("recipients: a@example.com,b@example.com"));
        assert!(text.contains("port: 5050"));
    }

    #[tokio::test]
    async fn test_single_check_against_closed_port() {
        let mut config = Config::default();
        config.endpoint.url = "http://127.0.0.1:1/".to_string();
        config.endpoint.check_ssl = false;
        config.monitor.timeout_in_seconds = 1;

        let result = run_single_check(&config, false).await.unwrap();
        assert!(!result.is_success());
    }
}
