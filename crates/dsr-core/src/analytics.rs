//! Analytics events
//!
//! Every committed mutation emits one event. Delivery is fire-and-forget:
//! sinks return nothing and the controller never waits on them.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Structured analytics event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    /// Event name, e.g. `sampling.settings.rule.specific_delete`
    pub name: &'static str,
    /// Organization slug
    pub organization: String,
    /// Server-side project id
    pub project_id: String,
    /// Sample rate of the affected rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,
    /// Condition names of the affected rule
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    /// Emission time
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    /// Create event stamped with the current time
    #[must_use]
    pub fn new(
        name: &'static str,
        organization: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            name,
            organization: organization.into(),
            project_id: project_id.into(),
            sample_rate: None,
            conditions: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// With rule details
    #[inline]
    #[must_use]
    pub fn with_rule(mut self, sample_rate: f64, conditions: Vec<String>) -> Self {
        self.sample_rate = Some(sample_rate);
        self.conditions = conditions;
        self
    }
}

/// Telemetry collaborator
pub trait AnalyticsSink: Send + Sync {
    /// Record an event
    fn record(&self, event: AnalyticsEvent);
}

/// Sink that logs events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn record(&self, event: AnalyticsEvent) {
        tracing::debug!(
            target: "dsr::analytics",
            event = event.name,
            organization = %event.organization,
            project_id = %event.project_id,
            sample_rate = ?event.sample_rate,
            conditions = ?event.conditions,
            "analytics event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_skips_empty_details() {
        let event = AnalyticsEvent::new("sampling.settings.rule.specific_reorder", "acme", "11");
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("sample_rate").is_none());
        assert!(value.get("conditions").is_none());

        let event = event.with_rule(0.5, vec!["event.release".into()]);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["sample_rate"], serde_json::json!(0.5));
    }
}
