//! Error types for the rule list controller
//!
//! Failures fall into four groups:
//! - Precondition errors: rejected locally, no network call
//! - Remote errors: the gateway call failed, local state rolled back
//! - Consistency errors: the local list does not hold what the caller expected
//! - Invariant errors: the candidate list would break a list invariant

use dsr_gateway::GatewayError;
use dsr_rules::{PartitionError, RouteError, RuleId, ValidationError};

/// Main controller error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControllerError {
    /// Operation not allowed in the current project state
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Gateway call failed
    #[error("remote request failed: {0}")]
    Remote(#[from] GatewayError),

    /// Local list does not match the request
    #[error("inconsistent rule list: {0}")]
    Consistency(#[from] ConsistencyError),

    /// Candidate list breaks an invariant
    #[error("invalid rule list: {0}")]
    Invalid(#[from] ValidationError),

    /// Editor route could not be parsed
    #[error("invalid editor route: {0}")]
    Route(#[from] RouteError),
}

impl From<PartitionError> for ControllerError {
    fn from(err: PartitionError) -> Self {
        Self::Invalid(err.into())
    }
}

/// Coarse classification of controller failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected before any network call
    Precondition,
    /// Gateway failure
    Remote,
    /// Local data did not match
    Consistency,
    /// List invariant violated
    Invariant,
}

impl ControllerError {
    /// Classify the error
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::Remote(_) => ErrorKind::Remote,
            Self::Consistency(_) | Self::Route(_) => ErrorKind::Consistency,
            Self::Invalid(_) => ErrorKind::Invariant,
        }
    }

    /// Whether a gateway call was attempted
    #[inline]
    #[must_use]
    pub fn reached_server(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Text for the user-visible notification
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Precondition(PreconditionError::Incompatible) => {
                "This project is incompatible with dynamic sampling".to_string()
            }
            Self::Precondition(PreconditionError::NoConditions) => {
                "Add at least one condition to the sampling rule".to_string()
            }
            Self::Remote(err) => err.user_message(),
            Self::Consistency(ConsistencyError::RuleNotFound(_)) | Self::Route(_) => {
                "Unable to find sampling rule".to_string()
            }
            Self::Consistency(ConsistencyError::UniformToggle(_)) => {
                "The uniform sampling rule is always active".to_string()
            }
            Self::Consistency(_) => {
                "Sampling rules changed since the list was loaded, reload and try again".to_string()
            }
            Self::Invalid(err) => format!("Sampling rules are invalid: {err}"),
        }
    }
}

/// Local preconditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    /// Project flagged incompatible with dynamic sampling
    #[error("project is incompatible with dynamic sampling")]
    Incompatible,

    /// Specific rule submitted without conditions
    #[error("specific rules need at least one condition")]
    NoConditions,
}

/// Mismatch between the request and the local list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    /// Referenced rule is not in the list
    #[error("rule {0} not found")]
    RuleNotFound(RuleId),

    /// Rule named twice in a reorder request
    #[error("rule {0} appears more than once in the requested order")]
    DuplicateInOrder(RuleId),

    /// The uniform rule has no active flag to flip
    #[error("rule {0} is the uniform rule and cannot be toggled")]
    UniformToggle(RuleId),

    /// Reorder request does not name every rule
    #[error("requested order covers {got} of {expected} rules")]
    IncompleteOrder {
        /// Rules in the list
        expected: usize,
        /// Rules in the resolved order
        got: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            ControllerError::from(PreconditionError::Incompatible).kind(),
            ErrorKind::Precondition
        );
        assert_eq!(
            ControllerError::from(GatewayError::Transport("x".into())).kind(),
            ErrorKind::Remote
        );
        assert_eq!(
            ControllerError::from(ConsistencyError::RuleNotFound(RuleId::new(1))).kind(),
            ErrorKind::Consistency
        );
        assert_eq!(
            ControllerError::from(ValidationError::DuplicateId(RuleId::new(1))).kind(),
            ErrorKind::Invariant
        );
    }

    #[test]
    fn partition_errors_are_invariant_errors() {
        let err = ControllerError::from(PartitionError::MultipleUniform {
            ids: vec![RuleId::new(1), RuleId::new(2)],
        });
        assert!(matches!(
            err,
            ControllerError::Invalid(ValidationError::MultipleUniform { .. })
        ));
    }

    #[test]
    fn only_remote_errors_reached_server() {
        assert!(ControllerError::from(GatewayError::rejected(400, "no")).reached_server());
        assert!(!ControllerError::from(PreconditionError::Incompatible).reached_server());
    }

    #[test]
    fn user_messages() {
        let err = ControllerError::from(GatewayError::rejected(400, "Rate too high"));
        assert_eq!(err.user_message(), "Rate too high");

        let err = ControllerError::from(ConsistencyError::RuleNotFound(RuleId::new(9)));
        assert_eq!(err.user_message(), "Unable to find sampling rule");
    }
}
