//! Rule partitioning
//!
//! Splits a rule list into the catch-all rule and the ordered specific
//! rules. [`partition_by`] is the raw split; [`partition`] validates that at
//! most one catch-all rule exists.

use crate::error::PartitionError;
use crate::rule::Rule;

/// Default catch-all predicate: the rule's type tag
#[inline]
#[must_use]
pub fn is_uniform_rule(rule: &Rule) -> bool {
    rule.is_uniform()
}

/// Split `rules` by `is_uniform`, preserving relative order on both sides
///
/// No count is enforced: a malformed list yields several uniform rules.
pub fn partition_by<'a, P>(rules: &'a [Rule], mut is_uniform: P) -> (Vec<&'a Rule>, Vec<&'a Rule>)
where
    P: FnMut(&Rule) -> bool,
{
    rules.iter().partition(|rule| is_uniform(*rule))
}

/// Validated split of a rule list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Catch-all rule, if the project has one
    pub uniform: Option<Rule>,
    /// Conditional rules in evaluation order
    pub specific: Vec<Rule>,
}

impl Partition {
    /// Whether the list had no rules at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uniform.is_none() && self.specific.is_empty()
    }

    /// Active specific rules, in order
    pub fn active_specific(&self) -> impl Iterator<Item = &Rule> {
        self.specific.iter().filter(|r| r.active)
    }
}

/// Partition with the default predicate
///
/// # Errors
/// `PartitionError::MultipleUniform` when more than one rule is uniform.
pub fn partition(rules: &[Rule]) -> Result<Partition, PartitionError> {
    partition_with(rules, is_uniform_rule)
}

/// Partition with a caller-supplied predicate
///
/// # Errors
/// `PartitionError::MultipleUniform` when the predicate selects more than
/// one rule.
pub fn partition_with<P>(rules: &[Rule], is_uniform: P) -> Result<Partition, PartitionError>
where
    P: FnMut(&Rule) -> bool,
{
    let (uniform, specific) = partition_by(rules, is_uniform);

    if uniform.len() > 1 {
        return Err(PartitionError::MultipleUniform {
            ids: uniform.iter().map(|r| r.id).collect(),
        });
    }

    Ok(Partition {
        uniform: uniform.first().map(|r| (*r).clone()),
        specific: specific.into_iter().cloned().collect(),
    })
}
