//! webcheck — watches one HTTP endpoint and emails a recipient list when it
//! stops answering correctly or when monitoring is switched on or off.

pub mod cli;
pub mod config;
pub mod monitor;
pub mod notifier;
pub mod probe;
pub mod web;

// Public API
pub use config::{Config, ConfigError};
pub use monitor::{MonitorController, MonitorSettings, MonitorState, ToggleOutcome};
pub use notifier::{DeliveryError, NotificationRequest, Notifier, RecipientList, SmtpNotifier};
pub use probe::{FailureReason, HttpProbe, Probe, ProbeConfig, ProbeResult};
pub use web::{ControlSurface, WebServer};
