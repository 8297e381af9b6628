//! Rule list controller
//!
//! Orchestrates every mutation of a project's rule list:
//! - Lowers the request to a [`Command`] and validates the candidate list
//! - Snapshots the store and applies the candidate optimistically
//! - Sends the complete list through the gateway
//! - Commits the server's answer, or restores the snapshot on failure
//!
//! Mutations are serialized: the mutation gate is held from snapshot to
//! commit/rollback, so a later mutation always starts from a settled list.

use crate::analytics::{AnalyticsEvent, AnalyticsSink, TracingAnalytics};
use crate::command::{Command, Lowered, MutationKind, RuleDraft};
use crate::config::ControllerConfig;
use crate::error::{ConsistencyError, ControllerError, PreconditionError};
use crate::navigation::{Navigator, TracingNavigator};
use crate::notify::{Notifier, TracingNotifier};
use dsr_gateway::{GatewayError, RulesGateway};
use dsr_rules::{
    partition, EditorState, Partition, ProjectRef, ProjectState, Rule, RuleId, RuleSnapshot,
    RuleStore, RulesRoute, SampleRate,
};
use parking_lot::RwLock;
use std::sync::Arc;

/// Result of a committed mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// What was done
    pub kind: MutationKind,
    /// Rule list as returned by the server
    pub rules: Vec<Rule>,
}

/// Project metadata tracked next to the rule list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ProjectMeta {
    id: String,
    incompatible: bool,
}

impl ProjectMeta {
    fn from_state(state: &ProjectState) -> Self {
        Self {
            id: state.id.clone(),
            incompatible: state.dynamic_sampling_incompatible,
        }
    }
}

/// Restores a snapshot when dropped while armed
///
/// Covers every way a mutation can end without committing, including the
/// caller dropping the future while the save is in flight.
struct Rollback {
    store: Arc<RuleStore>,
    snapshot: Option<RuleSnapshot>,
}

impl Rollback {
    fn new(store: Arc<RuleStore>, snapshot: RuleSnapshot) -> Self {
        Self {
            store,
            snapshot: Some(snapshot),
        }
    }

    /// Keep the current list
    fn disarm(mut self) {
        self.snapshot = None;
    }
}

impl Drop for Rollback {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            tracing::debug!(restored = snapshot.len(), "restoring rule list snapshot");
            self.store.restore(&snapshot);
        }
    }
}

/// Manages one project's rule list against a remote gateway
pub struct RuleListController<G> {
    config: ControllerConfig,
    route: RulesRoute,
    store: Arc<RuleStore>,
    meta: RwLock<ProjectMeta>,
    gateway: G,
    notifier: Arc<dyn Notifier>,
    analytics: Arc<dyn AnalyticsSink>,
    navigator: Arc<dyn Navigator>,
    mutation_gate: tokio::sync::Mutex<()>,
}

impl<G> std::fmt::Debug for RuleListController<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleListController")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

impl<G: RulesGateway> RuleListController<G> {
    /// Create controller with an empty store and tracing-backed collaborators
    #[must_use]
    pub fn new(config: ControllerConfig, gateway: G) -> Self {
        Self {
            route: RulesRoute::new(config.project.clone()),
            config,
            store: Arc::new(RuleStore::new()),
            meta: RwLock::new(ProjectMeta::default()),
            gateway,
            notifier: Arc::new(TracingNotifier),
            analytics: Arc::new(TracingAnalytics),
            navigator: Arc::new(TracingNavigator),
            mutation_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// With notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// With analytics sink
    #[must_use]
    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    /// With navigator
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Seed the store from an already fetched project state
    #[must_use]
    pub fn with_state(self, state: ProjectState) -> Self {
        self.commit(state);
        self
    }

    /// Project being managed
    #[inline]
    #[must_use]
    pub fn project(&self) -> &ProjectRef {
        &self.config.project
    }

    /// Shared handle to the rule store
    #[inline]
    #[must_use]
    pub fn store(&self) -> Arc<RuleStore> {
        Arc::clone(&self.store)
    }

    /// Current rule list
    #[must_use]
    pub fn rules(&self) -> Vec<Rule> {
        self.store.rules()
    }

    /// Whether the project is flagged incompatible
    #[must_use]
    pub fn is_incompatible(&self) -> bool {
        self.meta.read().incompatible
    }

    /// Split the current list into uniform and specific rules
    ///
    /// # Errors
    /// `ControllerError::Invalid` when the list holds several uniform rules.
    pub fn partition(&self) -> Result<Partition, ControllerError> {
        Ok(partition(&self.store.rules())?)
    }

    /// Flip a rule's active flag
    ///
    /// The toggled rule is sent with id `0` so the server re-creates it.
    ///
    /// # Errors
    /// See [`execute`](Self::execute).
    pub async fn toggle_active(&self, id: RuleId) -> Result<Outcome, ControllerError> {
        self.execute(Command::ToggleActive(id)).await
    }

    /// Put rules in the given order; the uniform rule may be omitted
    ///
    /// # Errors
    /// See [`execute`](Self::execute).
    pub async fn reorder(&self, order: Vec<RuleId>) -> Result<Outcome, ControllerError> {
        self.execute(Command::Reorder(order)).await
    }

    /// Remove a rule
    ///
    /// # Errors
    /// See [`execute`](Self::execute).
    pub async fn delete(&self, id: RuleId) -> Result<Outcome, ControllerError> {
        self.execute(Command::Delete(id)).await
    }

    /// Submit the rule editor
    ///
    /// # Errors
    /// See [`execute`](Self::execute).
    pub async fn save_rule(&self, draft: RuleDraft) -> Result<Outcome, ControllerError> {
        self.execute(Command::Upsert(draft)).await
    }

    /// Change the catch-all sample rate
    ///
    /// # Errors
    /// See [`execute`](Self::execute).
    pub async fn set_uniform_rate(&self, rate: SampleRate) -> Result<Outcome, ControllerError> {
        self.execute(Command::SetUniformRate(rate)).await
    }

    /// Run a command through the optimistic apply / commit-or-rollback cycle
    ///
    /// Every failure is reported to the notifier before it is returned. After
    /// an error the store holds exactly what it held before the call.
    ///
    /// # Errors
    /// - `Precondition` when the project is incompatible or the draft is empty
    /// - `Consistency` when the command references rules not in the list
    /// - `Invalid` when the candidate list breaks an invariant
    /// - `Remote` when the gateway call fails
    pub async fn execute(&self, command: Command) -> Result<Outcome, ControllerError> {
        let name = command.name();
        let result = self.run(command).await;

        match &result {
            Ok(outcome) => {
                tracing::info!(
                    project = %self.config.project,
                    command = name,
                    rules = outcome.rules.len(),
                    "rule list committed"
                );
                if self.config.notify_success {
                    self.notifier.success(outcome.kind.success_message());
                }
            }
            Err(err) => {
                tracing::error!(
                    project = %self.config.project,
                    command = name,
                    kind = ?err.kind(),
                    error = %err,
                    "rule list mutation failed"
                );
                self.notifier.error(&err.user_message());
            }
        }

        result
    }

    async fn run(&self, command: Command) -> Result<Outcome, ControllerError> {
        let _gate = self.mutation_gate.lock().await;

        // Read under the gate so a concurrent refresh is observed
        if command.requires_compatible() && self.is_incompatible() {
            return Err(PreconditionError::Incompatible.into());
        }

        let snapshot = self.store.snapshot();
        let Lowered {
            rules,
            kind,
            subject,
        } = command.lower(snapshot.rules())?;

        self.store.replace(rules.clone());
        // Declared after the gate: dropped, and so restored, before the gate is released
        let rollback = Rollback::new(self.store(), snapshot);

        match self.save(&rules).await {
            Ok(state) => {
                rollback.disarm();
                let project_id = state.id.clone();
                let committed = state.rules().to_vec();
                self.commit(state);
                self.emit(kind, &project_id, subject.as_ref());
                Ok(Outcome {
                    kind,
                    rules: committed,
                })
            }
            Err(err) => {
                tracing::warn!(
                    project = %self.config.project,
                    error = %err,
                    "save failed, restoring rule list"
                );
                drop(rollback);
                Err(err.into())
            }
        }
    }

    async fn save(&self, rules: &[Rule]) -> Result<ProjectState, GatewayError> {
        let save = self.gateway.save(&self.config.project, rules);
        match self.config.request_timeout() {
            Some(limit) => tokio::time::timeout(limit, save)
                .await
                .unwrap_or_else(|_| {
                    Err(GatewayError::Timeout {
                        duration_secs: limit.as_secs(),
                    })
                }),
            None => save.await,
        }
    }

    fn commit(&self, state: ProjectState) {
        *self.meta.write() = ProjectMeta::from_state(&state);
        self.store.replace(state.into_rules());
    }

    fn emit(&self, kind: MutationKind, project_id: &str, subject: Option<&Rule>) {
        let mut event = AnalyticsEvent::new(
            kind.event_name(),
            self.config.project.organization.clone(),
            project_id,
        );
        if let Some(rule) = subject {
            event = event.with_rule(rule.sample_rate.value(), rule.condition_names());
        }
        self.analytics.record(event);
    }

    /// Replace the store with the server's current state
    ///
    /// # Errors
    /// `ControllerError::Remote` when the fetch fails; the store is untouched.
    pub async fn refresh(&self) -> Result<(), ControllerError> {
        let _gate = self.mutation_gate.lock().await;

        match self.gateway.fetch(&self.config.project).await {
            Ok(state) => {
                tracing::debug!(project = %self.config.project, rules = state.rules().len(), "refreshed");
                self.commit(state);
                Ok(())
            }
            Err(err) => {
                let err = ControllerError::from(err);
                self.notifier.error(&err.user_message());
                Err(err)
            }
        }
    }

    /// Open the rule editor, for `rule` or for a new rule
    ///
    /// Not a mutation: the editor is a route, and this only navigates there.
    pub fn open_editor(&self, rule: Option<RuleId>) -> EditorState {
        let state = match rule {
            Some(id) if !id.is_pending() => EditorState::Editing(id),
            _ => EditorState::Creating,
        };
        self.navigator.navigate(&self.route.path_for(state));
        state
    }

    /// Close the editor and return to the list view
    pub fn close_editor(&self) {
        self.navigator.navigate(&self.route.list_path());
    }

    /// Derive the editor state from the current route path
    ///
    /// # Errors
    /// - `ControllerError::Route` when the path carries a malformed rule id
    /// - `ControllerError::Consistency` when it names a rule not in the list
    pub fn editor_state(&self, path: &str) -> Result<EditorState, ControllerError> {
        let state = EditorState::from_path(path)?;
        if let EditorState::Editing(id) = state {
            if self.store.find(id).is_none() {
                return Err(ConsistencyError::RuleNotFound(id).into());
            }
        }
        Ok(state)
    }
}
