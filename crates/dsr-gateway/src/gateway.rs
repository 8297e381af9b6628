//! Remote persistence gateway trait

use crate::error::GatewayError;
use async_trait::async_trait;
use dsr_rules::{ProjectRef, ProjectState, Rule};
use std::sync::Arc;

/// Persists rule lists on the server
///
/// Every mutation sends the complete list; the server resolves conflicts and
/// answers with the authoritative project state.
#[async_trait]
pub trait RulesGateway: Send + Sync {
    /// Replace the project's rule list (PUT semantics)
    ///
    /// # Errors
    /// Any [`GatewayError`]; the server state is then unknown to the caller.
    async fn save(&self, project: &ProjectRef, rules: &[Rule]) -> Result<ProjectState, GatewayError>;

    /// Fetch the current project state
    ///
    /// # Errors
    /// Any [`GatewayError`].
    async fn fetch(&self, project: &ProjectRef) -> Result<ProjectState, GatewayError>;
}

#[async_trait]
impl<G: RulesGateway + ?Sized> RulesGateway for Arc<G> {
    async fn save(&self, project: &ProjectRef, rules: &[Rule]) -> Result<ProjectState, GatewayError> {
        (**self).save(project, rules).await
    }

    async fn fetch(&self, project: &ProjectRef) -> Result<ProjectState, GatewayError> {
        (**self).fetch(project).await
    }
}
