//! Rule list invariants
//!
//! A well-formed list has at most one uniform rule, placed last, and no two
//! persisted rules sharing an id. Sample rate bounds are guaranteed by
//! [`SampleRate`](crate::SampleRate) itself.

use crate::error::ValidationError;
use crate::rule::Rule;
use std::collections::HashSet;

/// Check every list invariant, reporting the first violation
///
/// # Errors
/// - `ValidationError::MultipleUniform` for more than one catch-all rule
/// - `ValidationError::UniformNotLast` when the catch-all rule is misplaced
/// - `ValidationError::DuplicateId` when two persisted rules share an id
pub fn validate_rules(rules: &[Rule]) -> Result<(), ValidationError> {
    let uniform: Vec<(usize, &Rule)> = rules
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_uniform())
        .collect();

    if uniform.len() > 1 {
        return Err(ValidationError::MultipleUniform {
            ids: uniform.iter().map(|(_, r)| r.id).collect(),
        });
    }

    if let Some((position, rule)) = uniform.first() {
        if *position + 1 != rules.len() {
            return Err(ValidationError::UniformNotLast {
                id: rule.id,
                position: *position,
            });
        }
    }

    // Pending ids (0) may repeat
    let mut seen = HashSet::new();
    for rule in rules.iter().filter(|r| !r.id.is_pending()) {
        if !seen.insert(rule.id) {
            return Err(ValidationError::DuplicateId(rule.id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{RuleId, SampleRate};

    fn specific(id: u64) -> Rule {
        Rule::specific(id, SampleRate::ALL, vec![])
    }

    #[test]
    fn well_formed_lists() {
        assert!(validate_rules(&[]).is_ok());
        assert!(validate_rules(&[specific(1), specific(2)]).is_ok());
        assert!(validate_rules(&[specific(1), Rule::uniform(2, SampleRate::ALL)]).is_ok());
        assert!(validate_rules(&[specific(0), specific(0), specific(3)]).is_ok());
    }

    #[test]
    fn uniform_must_be_last() {
        let rules = vec![Rule::uniform(2, SampleRate::ALL), specific(1)];
        assert_eq!(
            validate_rules(&rules),
            Err(ValidationError::UniformNotLast {
                id: RuleId::new(2),
                position: 0
            })
        );
    }

    #[test]
    fn at_most_one_uniform() {
        let rules = vec![Rule::uniform(1, SampleRate::ALL), Rule::uniform(2, SampleRate::ALL)];
        assert!(matches!(
            validate_rules(&rules),
            Err(ValidationError::MultipleUniform { .. })
        ));
    }

    #[test]
    fn duplicate_ids() {
        assert_eq!(
            validate_rules(&[specific(5), specific(5)]),
            Err(ValidationError::DuplicateId(RuleId::new(5)))
        );
    }
}
