//! Command line definition

use crate::settings::Overrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Manage a project's dynamic sampling rules
#[derive(Debug, Parser)]
#[command(name = "dsr", version, about)]
pub(crate) struct Cli {
    /// Configuration file
    #[arg(long, short = 'c', global = true, default_value = "dsr.toml")]
    pub(crate) config: PathBuf,

    /// Server base URL
    #[arg(long, global = true)]
    pub(crate) base_url: Option<String>,

    /// Bearer token
    #[arg(long, global = true)]
    pub(crate) token: Option<String>,

    /// Organization slug
    #[arg(long, global = true)]
    pub(crate) org: Option<String>,

    /// Project slug
    #[arg(long, global = true)]
    pub(crate) project: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub(crate) timeout: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub(crate) log_json: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print the rule list
    List {
        /// Print the raw rules as JSON
        #[arg(long)]
        json: bool,
    },
    /// Flip a rule's active flag
    Toggle {
        /// Rule id
        id: u64,
    },
    /// Put rules in the given order; the uniform rule may be left out
    Reorder {
        /// Rule ids, first to last
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },
    /// Delete a rule
    Delete {
        /// Rule id
        id: u64,
    },
    /// Set the sample rate of the uniform rule
    SetRate {
        /// Rate between 0 and 1
        rate: f64,
    },
}

impl Cli {
    /// Whether `--config` was left at its default
    pub(crate) fn config_is_default(&self) -> bool {
        self.config.as_os_str() == "dsr.toml"
    }

    pub(crate) fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            auth_token: self.token.clone(),
            organization: self.org.clone(),
            project: self.project.clone(),
            timeout_secs: self.timeout,
        }
    }
}
