//! DSR Gateway - remote persistence for rule lists
//!
//! One coarse endpoint serves every mutation: the client always sends the
//! complete rule list and adopts whatever project state the server returns.
//!
//! ```text
//! Controller ──save(project, rules)──▶ RulesGateway ──PUT /api/0/projects/{org}/{project}/──▶ server
//!            ◀──────ProjectState────── (authoritative list)
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod wire;

pub use config::GatewayConfig;
pub use error::{GatewayError, DEFAULT_SAVE_MESSAGE};
pub use gateway::RulesGateway;
pub use http::HttpGateway;
pub use wire::SaveRulesRequest;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
