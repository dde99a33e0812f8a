//! On-disk persistence of the ledger between invocations.
//!
//! The file holds one bincode-encoded [`LedgerSnapshot`]. Writes go to a
//! sibling temp file which is then renamed over the original, so a crash
//! mid-write leaves the previous ledger intact.

use std::path::{Path, PathBuf};

use aov_ledger::{LedgerConfig, LedgerSnapshot, VerificationLedger};

use crate::error::DaemonError;

pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger, or start an empty one if the file does not exist yet.
    pub fn load(&self, config: LedgerConfig) -> Result<VerificationLedger, DaemonError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no ledger file yet, starting empty");
                return Ok(VerificationLedger::new(config));
            }
            Err(source) => return Err(self.io_error(source)),
        };

        let ledger = LedgerSnapshot::from_bytes(&bytes)?.restore(config)?;
        let summary = ledger.summary();
        tracing::debug!(
            path = %self.path.display(),
            pending = summary.pending_requests,
            verifications = summary.verifications,
            "ledger loaded"
        );
        Ok(ledger)
    }

    pub fn save(&self, ledger: &VerificationLedger) -> Result<(), DaemonError> {
        let bytes = LedgerSnapshot::capture(ledger).to_bytes()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &bytes).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "ledger saved");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> DaemonError {
        DaemonError::LedgerFile {
            path: self.path.clone(),
            source,
        }
    }
}
