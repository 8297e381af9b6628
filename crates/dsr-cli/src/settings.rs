//! File, environment and flag configuration for the `dsr` binary
//!
//! Precedence, lowest first: `dsr.toml`, `DSR_*` environment variables,
//! command line flags.

use anyhow::{bail, Context};
use dsr_core::ControllerConfig;
use dsr_gateway::GatewayConfig;
use dsr_rules::ProjectRef;
use serde::Deserialize;
use std::path::Path;

pub(crate) const ENV_AUTH_TOKEN: &str = "DSR_AUTH_TOKEN";
pub(crate) const ENV_BASE_URL: &str = "DSR_BASE_URL";

/// `[project]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct ProjectSection {
    pub(crate) organization: Option<String>,
    pub(crate) project: Option<String>,
    pub(crate) request_timeout_secs: Option<u64>,
}

/// Contents of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) gateway: GatewayConfig,
    pub(crate) project: ProjectSection,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) base_url: Option<String>,
    pub(crate) auth_token: Option<String>,
    pub(crate) organization: Option<String>,
    pub(crate) project: Option<String>,
    pub(crate) timeout_secs: Option<u64>,
}

impl Settings {
    /// Read `path`; a missing file is only an error when `required`
    pub(crate) fn load(path: &Path, required: bool) -> anyhow::Result<Self> {
        if !path.exists() {
            if required {
                bail!("config file {} does not exist", path.display());
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub(crate) fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `DSR_*` variables found through `lookup`
    pub(crate) fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(ENV_AUTH_TOKEN).filter(|t| !t.is_empty()) {
            self.gateway.auth_token = Some(token);
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.is_empty()) {
            self.gateway.base_url = url;
        }
    }

    pub(crate) fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.base_url {
            self.gateway.base_url = url;
        }
        if let Some(token) = overrides.auth_token {
            self.gateway.auth_token = Some(token);
        }
        if let Some(organization) = overrides.organization {
            self.project.organization = Some(organization);
        }
        if let Some(project) = overrides.project {
            self.project.project = Some(project);
        }
        if let Some(secs) = overrides.timeout_secs {
            self.gateway.timeout_secs = secs;
        }
    }

    /// Gateway configuration, validated
    pub(crate) fn gateway_config(&self) -> anyhow::Result<GatewayConfig> {
        self.gateway.validate()?;
        Ok(self.gateway.clone())
    }

    /// Controller configuration; organization and project are mandatory
    pub(crate) fn controller_config(&self) -> anyhow::Result<ControllerConfig> {
        let Some(organization) = self.project.organization.as_deref() else {
            bail!("no organization configured, set [project].organization or pass --org");
        };
        let Some(project) = self.project.project.as_deref() else {
            bail!("no project configured, set [project].project or pass --project");
        };

        let mut config = ControllerConfig::new(ProjectRef::new(organization, project));
        if let Some(secs) = self.project.request_timeout_secs {
            config = config.with_request_timeout_secs(secs);
        }
        Ok(config)
    }
}
