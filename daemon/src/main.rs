//! aov: command-line driver for the address ownership verification ledger.
//!
//! Each invocation loads the ledger file, applies one operation as the given
//! caller, and persists the ledger again if the operation changed it.

mod commands;
mod config;
mod error;
mod ledger_file;

use std::path::PathBuf;

use aov_ledger::MatchPolicy;
use aov_utils::LogFormat;
use anyhow::Context;
use clap::Parser;

use crate::commands::Command;
use crate::config::{parse_match_policy, DaemonConfig};
use crate::ledger_file::LedgerFile;

#[derive(Parser)]
#[command(name = "aov", about = "Address ownership verification ledger")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "AOV_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger file to load and update.
    #[arg(long, env = "AOV_LEDGER")]
    ledger: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AOV_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "AOV_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Tie-break for payments matching several requests: "earliest_request" or "reject_ambiguous".
    #[arg(long, env = "AOV_MATCH_POLICY", value_parser = parse_match_policy)]
    match_policy: Option<MatchPolicy>,

    /// Print results and events as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// File config (or defaults) with CLI flags and env vars applied on top.
    fn resolve_config(&self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DaemonConfig::default(),
        };
        if let Some(ledger) = &self.ledger {
            config.ledger_path = ledger.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(policy) = self.match_policy {
            config.match_policy = policy;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    aov_utils::init_logging(config.log_format, &config.log_level)?;

    let file = LedgerFile::new(&config.ledger_path);
    let mut ledger = file
        .load(config.ledger_config())
        .with_context(|| format!("loading ledger {}", file.path().display()))?;
    tracing::debug!(
        policy = config.match_policy.as_str(),
        path = %file.path().display(),
        "ledger ready"
    );

    let execution = commands::execute(&mut ledger, &cli.command, cli.json)?;
    if cli.command.is_mutation() && execution.mutated {
        file.save(&ledger)
            .with_context(|| format!("saving ledger {}", file.path().display()))?;
    }

    print!("{}", execution.output);
    Ok(())
}
