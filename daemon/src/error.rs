use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] aov_ledger::LedgerError),

    #[error("ledger file {path}: {source}")]
    LedgerFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output encoding error: {0}")]
    Output(#[from] serde_json::Error),
}
