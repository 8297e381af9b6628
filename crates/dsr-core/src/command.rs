//! Rule list commands
//!
//! Every mutation is a tagged [`Command`]. Lowering a command against the
//! current list yields the complete candidate list the gateway will receive;
//! all commands share that one wire representation.

use crate::error::{ConsistencyError, ControllerError, PreconditionError};
use dsr_rules::{partition, validate_rules, Condition, Rule, RuleCondition, RuleId, SampleRate};
use std::collections::HashSet;

/// Editor submission for a specific rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDraft {
    /// Rule being edited, `None` to create a new one
    pub existing: Option<RuleId>,
    /// Conditions in evaluation order
    pub conditions: Vec<Condition>,
    /// Sample rate
    pub sample_rate: SampleRate,
}

impl RuleDraft {
    /// Draft for a new rule
    #[inline]
    #[must_use]
    pub fn create(conditions: Vec<Condition>, sample_rate: SampleRate) -> Self {
        Self {
            existing: None,
            conditions,
            sample_rate,
        }
    }

    /// Draft replacing an existing rule
    #[inline]
    #[must_use]
    pub fn update(id: RuleId, conditions: Vec<Condition>, sample_rate: SampleRate) -> Self {
        Self {
            existing: Some(id),
            conditions,
            sample_rate,
        }
    }
}

/// A mutation of the rule list
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Flip a rule's active flag
    ToggleActive(RuleId),
    /// Put the rules in the given order
    Reorder(Vec<RuleId>),
    /// Remove a rule
    Delete(RuleId),
    /// Create or edit a specific rule
    Upsert(RuleDraft),
    /// Change the catch-all sample rate
    SetUniformRate(SampleRate),
}

/// What a committed command did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// Specific rule switched on
    Activate,
    /// Specific rule switched off
    Deactivate,
    /// Specific rule removed
    Delete,
    /// Specific rules reordered
    Reorder,
    /// Specific rule added
    Create,
    /// Specific rule edited
    Update,
    /// Uniform sample rate changed
    UniformUpdate,
}

impl MutationKind {
    /// Analytics event name
    #[must_use]
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Activate => "sampling.settings.rule.specific_activate",
            Self::Deactivate => "sampling.settings.rule.specific_deactivate",
            Self::Delete => "sampling.settings.rule.specific_delete",
            Self::Reorder => "sampling.settings.rule.specific_reorder",
            Self::Create => "sampling.settings.rule.specific_create",
            Self::Update => "sampling.settings.rule.specific_update",
            Self::UniformUpdate => "sampling.settings.rule.uniform_update",
        }
    }

    /// Success notification text
    #[must_use]
    pub fn success_message(self) -> &'static str {
        match self {
            Self::Activate => "Successfully activated sampling rule",
            Self::Deactivate => "Successfully deactivated sampling rule",
            Self::Delete => "Successfully deleted sampling rule",
            Self::Reorder => "Successfully sorted sampling rules",
            Self::Create => "Successfully added sampling rule",
            Self::Update => "Successfully edited sampling rule",
            Self::UniformUpdate => "Successfully updated uniform sample rate",
        }
    }
}

/// Candidate list produced by lowering a command
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    /// Complete list to send
    pub rules: Vec<Rule>,
    /// What the command does
    pub kind: MutationKind,
    /// Rule the command is about, as sent
    pub subject: Option<Rule>,
}

impl Command {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToggleActive(_) => "toggle_active",
            Self::Reorder(_) => "reorder",
            Self::Delete(_) => "delete",
            Self::Upsert(_) => "upsert",
            Self::SetUniformRate(_) => "set_uniform_rate",
        }
    }

    /// Whether an incompatible project must reject the command
    #[inline]
    #[must_use]
    pub fn requires_compatible(&self) -> bool {
        matches!(self, Self::ToggleActive(_) | Self::Upsert(_))
    }

    /// Build the candidate list from `current`
    ///
    /// The result is checked against every list invariant before it is
    /// returned, so nothing invalid reaches the gateway.
    ///
    /// # Errors
    /// - `ControllerError::Consistency` when a referenced rule is missing or a
    ///   reorder does not cover the list exactly
    /// - `ControllerError::Precondition` for a draft without conditions
    /// - `ControllerError::Invalid` when the candidate breaks an invariant
    pub fn lower(&self, current: &[Rule]) -> Result<Lowered, ControllerError> {
        let lowered = match self {
            Self::ToggleActive(id) => toggle(current, *id)?,
            Self::Reorder(order) => reorder(current, order)?,
            Self::Delete(id) => delete(current, *id)?,
            Self::Upsert(draft) => upsert(current, draft)?,
            Self::SetUniformRate(rate) => set_uniform_rate(current, *rate)?,
        };

        validate_rules(&lowered.rules)?;
        Ok(lowered)
    }
}

fn position(rules: &[Rule], id: RuleId) -> Result<usize, ConsistencyError> {
    rules
        .iter()
        .position(|r| r.id == id)
        .ok_or(ConsistencyError::RuleNotFound(id))
}

fn toggle(current: &[Rule], id: RuleId) -> Result<Lowered, ControllerError> {
    let idx = position(current, id)?;
    if current[idx].is_uniform() {
        return Err(ConsistencyError::UniformToggle(id).into());
    }
    let mut rules = current.to_vec();

    // Toggled rules are re-created server-side and get a fresh id
    let rule = &mut rules[idx];
    rule.active = !rule.active;
    rule.id = RuleId::PENDING;

    let kind = if rule.active {
        MutationKind::Activate
    } else {
        MutationKind::Deactivate
    };
    let subject = Some(rule.clone());

    Ok(Lowered {
        rules,
        kind,
        subject,
    })
}

fn reorder(current: &[Rule], order: &[RuleId]) -> Result<Lowered, ControllerError> {
    let part = partition(current)?;

    let mut seen = HashSet::with_capacity(order.len());
    let mut rules = Vec::with_capacity(current.len());
    for &id in order {
        if !seen.insert(id) {
            return Err(ConsistencyError::DuplicateInOrder(id).into());
        }
        let idx = position(current, id)?;
        rules.push(current[idx].clone());
    }

    if let Some(uniform) = part.uniform {
        if !seen.contains(&uniform.id) {
            rules.push(uniform);
        }
    }

    if rules.len() != current.len() {
        return Err(ConsistencyError::IncompleteOrder {
            expected: current.len(),
            got: rules.len(),
        }
        .into());
    }

    Ok(Lowered {
        rules,
        kind: MutationKind::Reorder,
        subject: None,
    })
}

fn delete(current: &[Rule], id: RuleId) -> Result<Lowered, ControllerError> {
    let idx = position(current, id)?;
    let mut rules = current.to_vec();
    let removed = rules.remove(idx);

    Ok(Lowered {
        rules,
        kind: MutationKind::Delete,
        subject: Some(removed),
    })
}

fn upsert(current: &[Rule], draft: &RuleDraft) -> Result<Lowered, ControllerError> {
    if draft.conditions.is_empty() {
        return Err(PreconditionError::NoConditions.into());
    }

    let mut rules = current.to_vec();

    let (rule, kind) = match draft.existing {
        Some(id) => {
            let idx = position(current, id)?;
            let rule = &mut rules[idx];
            rule.condition = RuleCondition::all(draft.conditions.clone());
            rule.sample_rate = draft.sample_rate;
            (rule.clone(), MutationKind::Update)
        }
        None => {
            let rule = Rule::specific(RuleId::PENDING, draft.sample_rate, draft.conditions.clone());
            // New rules go last among the specific rules
            let at = rules
                .iter()
                .position(Rule::is_uniform)
                .unwrap_or(rules.len());
            rules.insert(at, rule.clone());
            (rule, MutationKind::Create)
        }
    };

    Ok(Lowered {
        rules,
        kind,
        subject: Some(rule),
    })
}

fn set_uniform_rate(current: &[Rule], rate: SampleRate) -> Result<Lowered, ControllerError> {
    partition(current)?;

    let mut rules = current.to_vec();
    let subject = match rules.iter_mut().find(|r| r.is_uniform()) {
        Some(uniform) => {
            uniform.sample_rate = rate;
            uniform.clone()
        }
        None => {
            let uniform = Rule::uniform(RuleId::PENDING, rate);
            rules.push(uniform.clone());
            uniform
        }
    };

    Ok(Lowered {
        rules,
        kind: MutationKind::UniformUpdate,
        subject: Some(subject),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsr_rules::{names, ValidationError};

    fn rate(v: f64) -> SampleRate {
        SampleRate::new(v).unwrap()
    }

    fn specific(id: u64, active: bool) -> Rule {
        Rule::specific(id, rate(0.5), vec![Condition::eq(names::EVENT_RELEASE, ["1.0"])])
            .with_active(active)
    }

    fn ids(rules: &[Rule]) -> Vec<u64> {
        rules.iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn toggle_flips_flag_and_resets_id() {
        let current = vec![specific(1, true), specific(2, false)];
        let lowered = Command::ToggleActive(RuleId::new(2)).lower(&current).unwrap();

        assert_eq!(lowered.rules[0], current[0]);
        assert_eq!(lowered.rules[1].id, RuleId::PENDING);
        assert!(lowered.rules[1].active);
        assert_eq!(lowered.kind, MutationKind::Activate);
    }

    #[test]
    fn toggle_unknown_rule() {
        let err = Command::ToggleActive(RuleId::new(3))
            .lower(&[specific(1, true)])
            .unwrap_err();
        assert_eq!(
            err,
            ControllerError::Consistency(ConsistencyError::RuleNotFound(RuleId::new(3)))
        );
    }

    #[test]
    fn toggle_rejects_uniform_rule() {
        let current = vec![specific(1, true), Rule::uniform(9, rate(0.1))];
        let err = Command::ToggleActive(RuleId::new(9)).lower(&current).unwrap_err();
        assert_eq!(
            err,
            ControllerError::Consistency(ConsistencyError::UniformToggle(RuleId::new(9)))
        );
    }

    #[test]
    fn reorder_appends_uniform() {
        let current = vec![specific(1, true), specific(2, true), Rule::uniform(9, rate(0.1))];
        let lowered = Command::Reorder(vec![RuleId::new(2), RuleId::new(1)])
            .lower(&current)
            .unwrap();
        assert_eq!(ids(&lowered.rules), vec![2, 1, 9]);
    }

    #[test]
    fn reorder_rejects_uniform_not_last() {
        let current = vec![specific(1, true), Rule::uniform(9, rate(0.1))];
        let err = Command::Reorder(vec![RuleId::new(9), RuleId::new(1)])
            .lower(&current)
            .unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Invalid(ValidationError::UniformNotLast { .. })
        ));
    }

    #[test]
    fn reorder_consistency_errors() {
        let current = vec![specific(1, true), specific(2, true)];

        let err = Command::Reorder(vec![RuleId::new(1)]).lower(&current).unwrap_err();
        assert_eq!(
            err,
            ControllerError::Consistency(ConsistencyError::IncompleteOrder {
                expected: 2,
                got: 1
            })
        );

        let err = Command::Reorder(vec![RuleId::new(1), RuleId::new(1)])
            .lower(&current)
            .unwrap_err();
        assert_eq!(
            err,
            ControllerError::Consistency(ConsistencyError::DuplicateInOrder(RuleId::new(1)))
        );

        let err = Command::Reorder(vec![RuleId::new(2), RuleId::new(7)])
            .lower(&current)
            .unwrap_err();
        assert_eq!(
            err,
            ControllerError::Consistency(ConsistencyError::RuleNotFound(RuleId::new(7)))
        );
    }

    #[test]
    fn delete_removes_only_target() {
        let current = vec![specific(1, true), specific(2, true), specific(3, false)];
        let lowered = Command::Delete(RuleId::new(2)).lower(&current).unwrap();
        assert_eq!(ids(&lowered.rules), vec![1, 3]);
        assert_eq!(lowered.subject.map(|r| r.id), Some(RuleId::new(2)));
    }

    #[test]
    fn create_inserts_before_uniform() {
        let current = vec![specific(1, true), Rule::uniform(9, rate(0.1))];
        let draft = RuleDraft::create(
            vec![Condition::glob(names::TRACE_TRANSACTION, ["/api/*"])],
            rate(0.3),
        );
        let lowered = Command::Upsert(draft).lower(&current).unwrap();

        assert_eq!(ids(&lowered.rules), vec![1, 0, 9]);
        assert_eq!(lowered.kind, MutationKind::Create);
        assert!(!lowered.rules[1].active);
    }

    #[test]
    fn update_keeps_id_and_position() {
        let current = vec![specific(1, true), specific(2, true)];
        let draft = RuleDraft::update(
            RuleId::new(1),
            vec![Condition::eq(names::EVENT_ENVIRONMENT, ["prod"])],
            rate(0.9),
        );
        let lowered = Command::Upsert(draft).lower(&current).unwrap();

        assert_eq!(ids(&lowered.rules), vec![1, 2]);
        assert_eq!(lowered.rules[0].sample_rate, rate(0.9));
        assert!(lowered.rules[0].active);
        assert_eq!(lowered.kind, MutationKind::Update);
    }

    #[test]
    fn draft_without_conditions() {
        let err = Command::Upsert(RuleDraft::create(vec![], rate(0.3)))
            .lower(&[])
            .unwrap_err();
        assert_eq!(err, ControllerError::Precondition(PreconditionError::NoConditions));
    }

    #[test]
    fn uniform_rate_updates_or_creates() {
        let current = vec![specific(1, true), Rule::uniform(9, rate(0.1))];
        let lowered = Command::SetUniformRate(rate(0.4)).lower(&current).unwrap();
        assert_eq!(lowered.rules[1].sample_rate, rate(0.4));
        assert_eq!(lowered.rules[1].id, RuleId::new(9));

        let lowered = Command::SetUniformRate(rate(0.4))
            .lower(&[specific(1, true)])
            .unwrap();
        assert_eq!(ids(&lowered.rules), vec![1, 0]);
        assert!(lowered.rules[1].is_uniform());
    }

    #[test]
    fn compatibility_requirement() {
        assert!(Command::ToggleActive(RuleId::new(1)).requires_compatible());
        assert!(!Command::Delete(RuleId::new(1)).requires_compatible());
        assert!(!Command::Reorder(vec![]).requires_compatible());
    }
}
