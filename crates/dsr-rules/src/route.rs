//! Editor routes
//!
//! The rule editor is addressed by URL: `.../dynamic-sampling/rules/new/`
//! creates a rule, `.../dynamic-sampling/rules/{id}/` edits one, anything
//! else is the plain list view. [`EditorState::from_path`] derives the
//! editor state once from the current path.

use crate::error::RouteError;
use crate::project::ProjectRef;
use crate::rule::RuleId;

const SECTION: &str = "dynamic-sampling";
const RULES: &str = "rules";
const NEW: &str = "new";

/// Editor modal state derived from navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorState {
    /// List view, no editor open
    Closed,
    /// Editor open for a new rule
    Creating,
    /// Editor open for an existing rule
    Editing(RuleId),
}

impl EditorState {
    /// Derive the editor state from a route path
    ///
    /// # Errors
    /// `RouteError::InvalidRuleId` when the segment after `rules/` is neither
    /// `new` nor a non-zero integer.
    pub fn from_path(path: &str) -> Result<Self, RouteError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let Some(pos) = segments
            .windows(2)
            .position(|w| w[0] == SECTION && w[1] == RULES)
        else {
            return Ok(Self::Closed);
        };

        match segments.get(pos + 2) {
            None => Ok(Self::Closed),
            Some(&NEW) => Ok(Self::Creating),
            Some(raw) => match raw.parse::<u64>() {
                Ok(id) if id != 0 => Ok(Self::Editing(RuleId::new(id))),
                _ => Err(RouteError::InvalidRuleId((*raw).to_string())),
            },
        }
    }

    /// Whether the editor modal is showing
    #[inline]
    #[must_use]
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

/// Route builder for one project's rule pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesRoute {
    project: ProjectRef,
}

impl RulesRoute {
    /// Routes for `project`
    #[inline]
    #[must_use]
    pub fn new(project: ProjectRef) -> Self {
        Self { project }
    }

    /// List view
    #[must_use]
    pub fn list_path(&self) -> String {
        format!(
            "/settings/{}/projects/{}/{SECTION}/",
            self.project.organization, self.project.project
        )
    }

    /// Editor for a new rule
    #[must_use]
    pub fn new_rule_path(&self) -> String {
        format!("{}{RULES}/{NEW}/", self.list_path())
    }

    /// Editor for an existing rule
    #[must_use]
    pub fn edit_rule_path(&self, id: RuleId) -> String {
        format!("{}{RULES}/{id}/", self.list_path())
    }

    /// Path that yields `state` when parsed back
    #[must_use]
    pub fn path_for(&self, state: EditorState) -> String {
        match state {
            EditorState::Closed => self.list_path(),
            EditorState::Creating => self.new_rule_path(),
            EditorState::Editing(id) => self.edit_rule_path(id),
        }
    }
}
