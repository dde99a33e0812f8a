//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};

use aov_ledger::{LedgerConfig, MatchPolicy};
use aov_utils::LogFormat;
use serde::{Deserialize, Serialize};

use crate::error::DaemonError;

/// Configuration for the `aov` binary.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; command-line
/// flags and `AOV_*` environment variables override individual fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Where the ledger snapshot is persisted between invocations.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How a payment matching several transactors' requests is resolved.
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_ledger_path() -> PathBuf {
    PathBuf::from("./aov_data/ledger.bin")
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, DaemonError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DaemonError> {
        toml::from_str(s).map_err(|e| DaemonError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DaemonError> {
        toml::to_string_pretty(self).map_err(|e| DaemonError::Config(e.to_string()))
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            match_policy: self.match_policy,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            match_policy: MatchPolicy::default(),
        }
    }
}

/// Parse a match policy name as written in config files.
pub fn parse_match_policy(s: &str) -> Result<MatchPolicy, DaemonError> {
    match s {
        "earliest_request" | "earliest" => Ok(MatchPolicy::EarliestRequest),
        "reject_ambiguous" | "reject" => Ok(MatchPolicy::RejectAmbiguous),
        other => Err(DaemonError::Config(format!(
            "unknown match policy {other:?} (expected \"earliest_request\" or \"reject_ambiguous\")"
        ))),
    }
}
