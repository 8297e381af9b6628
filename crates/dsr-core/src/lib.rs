//! DSR Core - rule list controller
//!
//! The controller that:
//! - Turns UI intents into tagged commands (toggle, reorder, delete, edit)
//! - Applies them optimistically to the rule store
//! - Persists the complete list through a [`RulesGateway`](dsr_gateway::RulesGateway)
//! - Rolls back on failure and reports through notifications
//! - Emits analytics for committed mutations
//!
//! # Example
//!
//! ```rust,ignore
//! use dsr_core::{ControllerConfig, RuleListController};
//! use dsr_gateway::{GatewayConfig, HttpGateway};
//! use dsr_rules::{ProjectRef, RuleId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = HttpGateway::new(GatewayConfig::new().with_base_url("https://monitor.example.com"))?;
//! let controller = RuleListController::new(
//!     ControllerConfig::new(ProjectRef::new("acme", "web")),
//!     gateway,
//! );
//!
//! controller.refresh().await?;
//! controller.toggle_active(RuleId::new(12)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod analytics;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod navigation;
pub mod notify;

pub use analytics::{AnalyticsEvent, AnalyticsSink, TracingAnalytics};
pub use command::{Command, Lowered, MutationKind, RuleDraft};
pub use config::ControllerConfig;
pub use controller::{Outcome, RuleListController};
pub use error::{ConsistencyError, ControllerError, ErrorKind, PreconditionError};
pub use navigation::{Navigator, TracingNavigator};
pub use notify::{Notifier, TracingNotifier};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a rule list controller
    pub use crate::{
        Command, ControllerConfig, ControllerError, MutationKind, Outcome, RuleDraft,
        RuleListController,
    };
    pub use dsr_gateway::{GatewayConfig, HttpGateway, RulesGateway};
    pub use dsr_rules::{Condition, ProjectRef, Rule, RuleId, SampleRate};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
