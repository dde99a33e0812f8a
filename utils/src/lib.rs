//! Shared utilities for the AOV workspace.

pub mod logging;

pub use logging::{init_logging, LogFormat};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UtilsError {
    #[error("unknown log format {0:?} (expected \"human\" or \"json\")")]
    UnknownLogFormat(String),

    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("logging already initialised: {0}")]
    AlreadyInitialised(String),
}
