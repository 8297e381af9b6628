//! Project references and the authoritative project state

use crate::rule::Rule;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Organization + project slug pair addressing one rule list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRef {
    /// Organization slug
    pub organization: String,
    /// Project slug
    pub project: String,
}

impl ProjectRef {
    /// Create new project reference
    #[inline]
    #[must_use]
    pub fn new(organization: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            project: project.into(),
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.project)
    }
}

/// Dynamic sampling section of a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicSampling {
    /// Rules in evaluation order
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl DynamicSampling {
    /// Create section holding `rules`
    #[inline]
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

/// Project representation returned by the server after every save
///
/// Unknown fields in the response are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    /// Server-side project id
    #[serde(default)]
    pub id: String,
    /// Project slug
    #[serde(default)]
    pub slug: String,
    /// Current rule list; `null` on the wire reads as empty
    #[serde(default, deserialize_with = "null_as_default")]
    pub dynamic_sampling: DynamicSampling,
    /// Set when the project cannot use dynamic sampling
    #[serde(default)]
    pub dynamic_sampling_incompatible: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProjectState {
    /// Create project state holding `rules`
    #[must_use]
    pub fn new(id: impl Into<String>, slug: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            dynamic_sampling: DynamicSampling::new(rules),
            dynamic_sampling_incompatible: false,
        }
    }

    /// Mark the project incompatible
    #[inline]
    #[must_use]
    pub fn incompatible(mut self) -> Self {
        self.dynamic_sampling_incompatible = true;
        self
    }

    /// Rules in server order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.dynamic_sampling.rules
    }

    /// Consume into the rule list
    #[inline]
    #[must_use]
    pub fn into_rules(self) -> Vec<Rule> {
        self.dynamic_sampling.rules
    }
}
