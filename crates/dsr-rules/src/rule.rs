//! Sampling rule types
//!
//! A rule pairs an ordered set of conditions with a sample rate. The wire
//! shape matches the project endpoint, so these types serialize directly
//! into the `dynamicSampling.rules` payload.

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule identifier
///
/// `0` marks a rule that is not persisted yet, or one that was modified and
/// must be re-created by the server.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RuleId(pub u64);

impl RuleId {
    /// Id of a rule awaiting creation
    pub const PENDING: Self = Self(0);

    /// Create new rule id
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Whether the server still has to assign an id
    #[inline]
    #[must_use]
    pub const fn is_pending(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RuleId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Fraction of matching events retained, always within `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SampleRate(f64);

impl SampleRate {
    /// Keep everything
    pub const ALL: Self = Self(1.0);
    /// Drop everything
    pub const NONE: Self = Self(0.0);

    /// Create a sample rate
    ///
    /// # Errors
    /// `RuleError::InvalidSampleRate` when `rate` is NaN or outside `[0, 1]`.
    #[inline]
    pub fn new(rate: f64) -> Result<Self, RuleError> {
        if (0.0..=1.0).contains(&rate) {
            Ok(Self(rate))
        } else {
            Err(RuleError::InvalidSampleRate(rate))
        }
    }

    /// Raw fraction
    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Rate expressed as a percentage
    #[inline]
    #[must_use]
    pub fn as_percent(self) -> f64 {
        self.0 * 100.0
    }
}

impl TryFrom<f64> for SampleRate {
    type Error = RuleError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<SampleRate> for f64 {
    fn from(rate: SampleRate) -> Self {
        rate.0
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

/// Rule type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// Catch-all rule applying to traffic no specific rule matched
    Uniform,
    /// Conditional rule, evaluated in list order
    Specific,
}

/// Comparison applied by a single condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOp {
    /// Exact match against any of the values
    Eq,
    /// Glob match against any of the values
    Glob,
}

/// Logical operator joining the inner conditions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    /// Every inner condition must match
    #[default]
    And,
}

/// Per-condition matching options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionOptions {
    /// Case-insensitive comparison
    #[serde(default)]
    pub ignore_case: bool,
}

impl ConditionOptions {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Well-known condition names
pub mod names {
    //! Names accepted by the server in `condition.inner[].name`

    /// Release of the event
    pub const EVENT_RELEASE: &str = "event.release";
    /// Environment of the event
    pub const EVENT_ENVIRONMENT: &str = "event.environment";
    /// User id attached to the event
    pub const EVENT_USER_ID: &str = "event.user.id";
    /// User segment attached to the event
    pub const EVENT_USER_SEGMENT: &str = "event.user.segment";
    /// Transaction name of the event
    pub const EVENT_TRANSACTION: &str = "event.transaction";
    /// Release from the trace context
    pub const TRACE_RELEASE: &str = "trace.release";
    /// Environment from the trace context
    pub const TRACE_ENVIRONMENT: &str = "trace.environment";
    /// User id from the trace context
    pub const TRACE_USER_ID: &str = "trace.user.id";
    /// User segment from the trace context
    pub const TRACE_USER_SEGMENT: &str = "trace.user.segment";
    /// Transaction from the trace context
    pub const TRACE_TRANSACTION: &str = "trace.transaction";
}

/// A single named condition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    /// Comparison
    pub op: ConditionOp,
    /// Field the condition reads, see [`names`]
    pub name: String,
    /// Values or patterns, any of which may match
    #[serde(default)]
    pub value: Vec<String>,
    /// Matching options
    #[serde(default, skip_serializing_if = "ConditionOptions::is_default")]
    pub options: ConditionOptions,
}

impl Condition {
    /// Exact-match condition
    #[must_use]
    pub fn eq<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            op: ConditionOp::Eq,
            name: name.into(),
            value: values.into_iter().map(Into::into).collect(),
            options: ConditionOptions::default(),
        }
    }

    /// Glob-match condition
    #[must_use]
    pub fn glob<I, S>(name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            op: ConditionOp::Glob,
            ..Self::eq(name, patterns)
        }
    }

    /// Compare case-insensitively
    #[inline]
    #[must_use]
    pub fn ignore_case(mut self) -> Self {
        self.options.ignore_case = true;
        self
    }
}

/// Ordered condition set of a rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleCondition {
    /// Operator joining `inner`
    #[serde(default)]
    pub op: LogicalOp,
    /// Conditions in declaration order
    #[serde(default)]
    pub inner: Vec<Condition>,
}

impl RuleCondition {
    /// Conjunction of the given conditions
    #[inline]
    #[must_use]
    pub fn all(inner: Vec<Condition>) -> Self {
        Self {
            op: LogicalOp::And,
            inner,
        }
    }

    /// Condition names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(|c| c.name.as_str())
    }
}

/// A dynamic sampling rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Server-assigned id, `0` while pending
    #[serde(default)]
    pub id: RuleId,
    /// Conditions; empty for the uniform rule
    #[serde(default)]
    pub condition: RuleCondition,
    /// Fraction of matching events kept
    pub sample_rate: SampleRate,
    /// Whether the server applies the rule
    #[serde(default)]
    pub active: bool,
    /// Uniform or specific
    #[serde(rename = "type")]
    pub rule_type: RuleType,
}

impl Rule {
    /// Catch-all rule, active, with no conditions
    #[must_use]
    pub fn uniform(id: impl Into<RuleId>, sample_rate: SampleRate) -> Self {
        Self {
            id: id.into(),
            condition: RuleCondition::default(),
            sample_rate,
            active: true,
            rule_type: RuleType::Uniform,
        }
    }

    /// Conditional rule, inactive until toggled
    #[must_use]
    pub fn specific(
        id: impl Into<RuleId>,
        sample_rate: SampleRate,
        conditions: Vec<Condition>,
    ) -> Self {
        Self {
            id: id.into(),
            condition: RuleCondition::all(conditions),
            sample_rate,
            active: false,
            rule_type: RuleType::Specific,
        }
    }

    /// With active flag
    #[inline]
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// With id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<RuleId>) -> Self {
        self.id = id.into();
        self
    }

    /// Whether this is the catch-all rule
    #[inline]
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        self.rule_type == RuleType::Uniform
    }

    /// Condition names, used for analytics
    #[must_use]
    pub fn condition_names(&self) -> Vec<String> {
        self.condition.names().map(str::to_owned).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sample_rate_bounds() {
        assert!(SampleRate::new(0.0).is_ok());
        assert!(SampleRate::new(1.0).is_ok());
        assert!(SampleRate::new(0.25).is_ok());
        assert_eq!(
            SampleRate::new(1.01),
            Err(RuleError::InvalidSampleRate(1.01))
        );
        assert!(SampleRate::new(-0.1).is_err());
        assert!(SampleRate::new(f64::NAN).is_err());
    }

    #[test]
    fn rule_serializes_to_wire_shape() {
        let rule = Rule::specific(
            4,
            SampleRate::new(0.5).unwrap(),
            vec![Condition::glob(names::TRACE_RELEASE, ["1.*"]).ignore_case()],
        )
        .with_active(true);

        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 4,
                "condition": {
                    "op": "and",
                    "inner": [{
                        "op": "glob",
                        "name": "trace.release",
                        "value": ["1.*"],
                        "options": {"ignoreCase": true}
                    }]
                },
                "sampleRate": 0.5,
                "active": true,
                "type": "specific"
            })
        );
    }

    #[test]
    fn rule_rejects_out_of_range_rate() {
        let raw = json!({
            "id": 1,
            "condition": {"op": "and", "inner": []},
            "sampleRate": 2.0,
            "active": true,
            "type": "uniform"
        });
        assert!(serde_json::from_value::<Rule>(raw).is_err());
    }

    #[test]
    fn pending_id() {
        assert!(RuleId::PENDING.is_pending());
        assert!(!RuleId::new(3).is_pending());
    }

    #[test]
    fn condition_names_keep_order() {
        let rule = Rule::specific(
            1,
            SampleRate::ALL,
            vec![
                Condition::eq(names::EVENT_ENVIRONMENT, ["prod"]),
                Condition::eq(names::EVENT_USER_ID, ["42"]),
            ],
        );
        assert_eq!(
            rule.condition_names(),
            vec!["event.environment".to_string(), "event.user.id".to_string()]
        );
    }
}
