//! Error types for the rule model
//!
//! Covers:
//! - Out-of-range sample rates
//! - Rule list invariant violations
//! - Partitioning failures
//! - Editor route parsing

use crate::rule::RuleId;

/// Errors raised while constructing rule values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    /// Sample rate outside `[0, 1]` (or NaN)
    #[error("invalid sample rate {0}: must be within [0, 1]")]
    InvalidSampleRate(f64),
}

/// Rule list invariant violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// More than one catch-all rule in the list
    #[error("expected at most one uniform rule, found {}", ids.len())]
    MultipleUniform {
        /// Ids of every uniform rule found, in list order
        ids: Vec<RuleId>,
    },

    /// The catch-all rule is not the last entry
    #[error("uniform rule {id} must be last, found at position {position}")]
    UniformNotLast {
        /// Uniform rule id
        id: RuleId,
        /// Zero-based position in the list
        position: usize,
    },

    /// Two persisted rules share an id
    #[error("duplicate rule id {0}")]
    DuplicateId(RuleId),
}

/// Partitioning failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    /// The list carries more than one uniform rule
    #[error("rule list holds {} uniform rules", ids.len())]
    MultipleUniform {
        /// Ids of the offending rules
        ids: Vec<RuleId>,
    },
}

impl From<PartitionError> for ValidationError {
    fn from(err: PartitionError) -> Self {
        match err {
            PartitionError::MultipleUniform { ids } => Self::MultipleUniform { ids },
        }
    }
}

/// Editor route parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Segment after `rules/` is neither `new` nor a rule id
    #[error("invalid rule id in route: {0:?}")]
    InvalidRuleId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::MultipleUniform {
            ids: vec![RuleId::new(1), RuleId::new(2)],
        };
        assert!(err.to_string().contains("found 2"));

        let err = ValidationError::UniformNotLast {
            id: RuleId::new(7),
            position: 0,
        };
        assert_eq!(err.to_string(), "uniform rule 7 must be last, found at position 0");
    }

    #[test]
    fn rule_error_display() {
        let err = RuleError::InvalidSampleRate(1.5);
        assert!(err.to_string().contains("1.5"));
    }
}
