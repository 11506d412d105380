use serde::Deserialize;

/// `endpoint` section: what to probe and how to judge the response
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct EndpointConfig {
    #[serde(default)]
    pub url: String,
    /// Human-readable name used in notification subjects
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_check_ssl")]
    pub check_ssl: bool,
    #[serde(default)]
    pub body_text_to_check: Option<String>,
}

impl EndpointConfig {
    /// Title for notifications, falling back to the URL
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => &self.url,
        }
    }
}

fn default_check_ssl() -> bool {
    true
}
