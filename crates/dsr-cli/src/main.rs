//! `dsr`: manage dynamic sampling rules from a shell
//!
//! Configuration comes from `dsr.toml` (or `--config`), then `DSR_AUTH_TOKEN`
//! and `DSR_BASE_URL`, then flags.
//!
//! Logging: `RUST_LOG` overrides the default `info` filter; logs go to stderr.

mod cli;
mod settings;

use anyhow::Context;
use clap::Parser;
use dsr_core::{ControllerConfig, RuleListController};
use dsr_gateway::HttpGateway;
use dsr_rules::{Rule, RuleId, SampleRate};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::{Cli, Command};
use crate::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut settings = Settings::load(&cli.config, !cli.config_is_default())?;
    settings.apply_env(|key| std::env::var(key).ok());
    settings.apply_overrides(cli.overrides());

    let gateway = HttpGateway::new(settings.gateway_config()?)?;
    let config: ControllerConfig = settings.controller_config()?;
    tracing::debug!(project = %config.project, "starting");

    let controller = RuleListController::new(config, gateway);
    controller
        .refresh()
        .await
        .context("failed to load sampling rules")?;

    match cli.command {
        Command::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&controller.rules())?);
            } else {
                print_rules(&controller.rules());
            }
        }
        Command::Toggle { id } => {
            let outcome = controller.toggle_active(RuleId::new(id)).await?;
            print_rules(&outcome.rules);
        }
        Command::Reorder { ids } => {
            let order = ids.into_iter().map(RuleId::new).collect();
            let outcome = controller.reorder(order).await?;
            print_rules(&outcome.rules);
        }
        Command::Delete { id } => {
            let outcome = controller.delete(RuleId::new(id)).await?;
            print_rules(&outcome.rules);
        }
        Command::SetRate { rate } => {
            let rate = SampleRate::new(rate)?;
            let outcome = controller.set_uniform_rate(rate).await?;
            print_rules(&outcome.rules);
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(err) = result {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}

fn print_rules(rules: &[Rule]) {
    if rules.is_empty() {
        println!("no sampling rules");
        return;
    }

    println!("{:>8}  {:<8}  {:>7}  {:<6}  CONDITIONS", "ID", "TYPE", "RATE", "ACTIVE");
    for rule in rules {
        let kind = if rule.is_uniform() { "uniform" } else { "specific" };
        let conditions = if rule.is_uniform() {
            "-".to_string()
        } else {
            rule.condition_names().join(", ")
        };
        println!(
            "{:>8}  {:<8}  {:>7}  {:<6}  {}",
            rule.id.to_string(),
            kind,
            rule.sample_rate.to_string(),
            if rule.active { "yes" } else { "no" },
            conditions
        );
    }
}
