//! Monitoring control loop
//!
//! [`MonitorController`] owns the on/off state and at most one ticker task.
//! Each tick runs one probe; failures are mailed to the recipient list and
//! real state transitions can be announced the same way.

pub mod controller;
mod ticker;

pub use controller::MonitorController;

use std::fmt;
use std::time::Duration;

use crate::notifier::RecipientList;
use crate::probe::ProbeConfig;

/// Everything the controller needs from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub endpoint_title: String,
    pub probe: ProbeConfig,
    pub recipients: RecipientList,
    /// Upper bound for one notification delivery
    pub delivery_timeout: Duration,
}

/// Snapshot of the controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorState {
    pub running: bool,
}

impl MonitorState {
    pub fn label(&self) -> &'static str {
        if self.running {
            "ON"
        } else {
            "OFF"
        }
    }
}

/// Result of a start/stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    TurnedOn,
    AlreadyOn,
    TurnedOff,
    AlreadyOff,
}

impl ToggleOutcome {
    /// Whether the request changed the state
    pub fn is_transition(&self) -> bool {
        matches!(self, ToggleOutcome::TurnedOn | ToggleOutcome::TurnedOff)
    }
}

impl fmt::Display for ToggleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ToggleOutcome::TurnedOn => "turned ON!",
            ToggleOutcome::AlreadyOn => "already turned on.",
            ToggleOutcome::TurnedOff => "turned OFF!",
            ToggleOutcome::AlreadyOff => "already turned off.",
        };
        write!(f, "Monitoring service {}", message)
    }
}
