//! DSR Rules - dynamic sampling rule model
//!
//! The leaf crate of the workspace:
//! - [`Rule`] and its conditions, in the wire shape of the project endpoint
//! - [`RuleStore`]: the in-memory ordered list with snapshot/restore
//! - [`partition`]: catch-all vs. specific split with a checked invariant
//! - [`validate_rules`]: list invariants checked before every save
//! - [`EditorState`] / [`RulesRoute`]: editor state derived from navigation
//!
//! # Example
//!
//! ```rust
//! use dsr_rules::{partition, Condition, Rule, SampleRate};
//!
//! let rules = vec![
//!     Rule::specific(1, SampleRate::new(0.5)?, vec![Condition::eq("event.environment", ["prod"])]),
//!     Rule::uniform(2, SampleRate::new(0.1)?),
//! ];
//!
//! let part = partition(&rules)?;
//! assert_eq!(part.specific.len(), 1);
//! assert!(part.uniform.is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod partition;
pub mod project;
pub mod route;
pub mod rule;
pub mod store;
pub mod validation;

pub use error::{PartitionError, RouteError, RuleError, ValidationError};
pub use partition::{is_uniform_rule, partition, partition_by, partition_with, Partition};
pub use project::{DynamicSampling, ProjectRef, ProjectState};
pub use route::{EditorState, RulesRoute};
pub use rule::{
    names, Condition, ConditionOp, ConditionOptions, LogicalOp, Rule, RuleCondition, RuleId,
    RuleType, SampleRate,
};
pub use store::{RuleSnapshot, RuleStore};
pub use validation::validate_rules;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
