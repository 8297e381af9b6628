//! HTTP gateway backed by `reqwest`

use crate::config::GatewayConfig;
use crate::error::{GatewayError, DEFAULT_SAVE_MESSAGE};
use crate::gateway::RulesGateway;
use crate::wire::{error_message, SaveRulesRequest};
use async_trait::async_trait;
use dsr_rules::{ProjectRef, ProjectState, Rule};
use reqwest::Url;
use std::time::Duration;

/// Gateway talking to `/api/0/projects/{org}/{project}/`
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Build gateway from configuration
    ///
    /// # Errors
    /// `GatewayError::Config` when the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Project endpoint URL, with the slugs percent-encoded as path segments
    ///
    /// # Errors
    /// `GatewayError::Config` when the base URL cannot carry a path.
    pub fn project_url(&self, project: &ProjectRef) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GatewayError::Config(format!("invalid base_url: {e}")))?;

        url.path_segments_mut()
            .map_err(|()| GatewayError::Config("base_url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend([
                "api",
                "0",
                "projects",
                project.organization.as_str(),
                project.project.as_str(),
                "",
            ]);

        Ok(url)
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn transport_error(&self, error: &reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout {
                duration_secs: self.config.timeout_secs,
            }
        } else {
            GatewayError::Transport(error.to_string())
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<ProjectState, GatewayError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| DEFAULT_SAVE_MESSAGE.to_string());
            tracing::debug!(status = status.as_u16(), %message, "project request rejected");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RulesGateway for HttpGateway {
    async fn save(&self, project: &ProjectRef, rules: &[Rule]) -> Result<ProjectState, GatewayError> {
        let url = self.project_url(project)?;
        tracing::debug!(%url, rules = rules.len(), "saving rule list");

        let request = self.client.put(url).json(&SaveRulesRequest::new(rules));
        self.send(request).await
    }

    async fn fetch(&self, project: &ProjectRef) -> Result<ProjectState, GatewayError> {
        let url = self.project_url(project)?;
        tracing::debug!(%url, "fetching project");

        self.send(self.client.get(url)).await
    }
}
