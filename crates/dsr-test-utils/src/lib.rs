//! Testing utilities for DSR workspace
//!
//! Shared fixtures and fake collaborators.

#![allow(missing_docs)]

use async_trait::async_trait;
use dsr_core::{
    AnalyticsEvent, AnalyticsSink, ControllerConfig, Navigator, Notifier, RuleListController,
};
use dsr_gateway::{GatewayError, RulesGateway};
use dsr_rules::{names, Condition, ProjectRef, ProjectState, Rule, RuleId, SampleRate};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub const PROJECT_ID: &str = "4711";

pub fn project() -> ProjectRef {
    ProjectRef::new("acme", "web")
}

pub fn rate(value: f64) -> SampleRate {
    SampleRate::new(value).unwrap()
}

/// Specific rule matching one release
pub fn specific_rule(id: u64, active: bool) -> Rule {
    Rule::specific(
        id,
        rate(0.5),
        vec![Condition::eq(names::EVENT_RELEASE, [format!("1.{id}")])],
    )
    .with_active(active)
}

pub fn uniform_rule(id: u64, sample_rate: f64) -> Rule {
    Rule::uniform(id, rate(sample_rate))
}

pub fn state(rules: Vec<Rule>) -> ProjectState {
    ProjectState::new(PROJECT_ID, "web", rules)
}

pub fn ids(rules: &[Rule]) -> Vec<u64> {
    rules.iter().map(|r| r.id.0).collect()
}

/// Scripted reply to the next `save`
#[derive(Debug, Clone)]
pub enum Reply {
    /// Echo the payload back, assigning ids to pending rules
    Echo,
    /// Answer with this project state
    State(ProjectState),
    /// Fail with this error
    Fail(GatewayError),
}

/// In-memory gateway recording every payload
#[derive(Debug, Default)]
pub struct FakeGateway {
    replies: Mutex<VecDeque<Reply>>,
    saves: Mutex<Vec<Vec<Rule>>>,
    fetch_reply: Mutex<Option<Result<ProjectState, GatewayError>>>,
    fetches: Mutex<usize>,
    delay: Option<Duration>,
    incompatible: bool,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before answering each save or fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Flag echoed save responses as incompatible
    pub fn incompatible(mut self) -> Self {
        self.incompatible = true;
        self
    }

    pub fn push_reply(&self, reply: Reply) {
        self.replies.lock().push_back(reply);
    }

    pub fn respond_with(&self, state: ProjectState) {
        self.push_reply(Reply::State(state));
    }

    pub fn fail_with(&self, error: GatewayError) {
        self.push_reply(Reply::Fail(error));
    }

    pub fn fetch_returns(&self, reply: Result<ProjectState, GatewayError>) {
        *self.fetch_reply.lock() = Some(reply);
    }

    /// Every payload sent so far
    pub fn saves(&self) -> Vec<Vec<Rule>> {
        self.saves.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().len()
    }

    pub fn last_save(&self) -> Option<Vec<Rule>> {
        self.saves.lock().last().cloned()
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock()
    }

    fn echo(&self, rules: &[Rule]) -> ProjectState {
        let assigned = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                let mut rule = rule.clone();
                if rule.id.is_pending() {
                    rule.id = RuleId::new(1000 + i as u64);
                }
                rule
            })
            .collect();
        let mut echoed = state(assigned);
        echoed.dynamic_sampling_incompatible = self.incompatible;
        echoed
    }
}

#[async_trait]
impl RulesGateway for FakeGateway {
    async fn save(&self, _project: &ProjectRef, rules: &[Rule]) -> Result<ProjectState, GatewayError> {
        self.saves.lock().push(rules.to_vec());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().pop_front().unwrap_or(Reply::Echo);
        match reply {
            Reply::Echo => Ok(self.echo(rules)),
            Reply::State(state) => Ok(state),
            Reply::Fail(error) => Err(error),
        }
    }

    async fn fetch(&self, _project: &ProjectRef) -> Result<ProjectState, GatewayError> {
        *self.fetches.lock() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.fetch_reply
            .lock()
            .clone()
            .unwrap_or_else(|| Ok(state(Vec::new())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Error(msg) => Some(msg),
                Notice::Success(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notices.lock().push(Notice::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices.lock().push(Notice::Error(message.to_string()));
    }
}

#[derive(Debug, Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.name).collect()
    }
}

impl AnalyticsSink for RecordingAnalytics {
    fn record(&self, event: AnalyticsEvent) {
        self.events.lock().push(event);
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().push(path.to_string());
    }
}

/// Controller wired to recording collaborators
pub struct Harness {
    pub controller: RuleListController<Arc<FakeGateway>>,
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub analytics: Arc<RecordingAnalytics>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new(initial: ProjectState) -> Self {
        Self::with_gateway(initial, FakeGateway::new(), ControllerConfig::new(project()))
    }

    pub fn with_gateway(initial: ProjectState, gateway: FakeGateway, config: ControllerConfig) -> Self {
        let gateway = Arc::new(gateway);
        let notifier = Arc::new(RecordingNotifier::default());
        let analytics = Arc::new(RecordingAnalytics::default());
        let navigator = Arc::new(RecordingNavigator::default());

        let controller = RuleListController::new(config, Arc::clone(&gateway))
            .with_notifier(notifier.clone())
            .with_analytics(analytics.clone())
            .with_navigator(navigator.clone())
            .with_state(initial);

        Self {
            controller,
            gateway,
            notifier,
            analytics,
            navigator,
        }
    }
}
