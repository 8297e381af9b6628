//! Controller configuration

use dsr_rules::ProjectRef;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rule list controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Project whose rules are managed
    pub project: ProjectRef,
    /// Upper bound on each gateway call; `None` leaves it to the transport
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Emit a notification after every successful mutation
    #[serde(default = "default_true")]
    pub notify_success: bool,
}

fn default_true() -> bool {
    true
}

impl ControllerConfig {
    /// Create configuration for `project`
    #[inline]
    #[must_use]
    pub fn new(project: ProjectRef) -> Self {
        Self {
            project,
            request_timeout_secs: None,
            notify_success: true,
        }
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Without success notifications
    #[inline]
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.notify_success = false;
        self
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
