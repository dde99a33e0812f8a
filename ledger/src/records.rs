//! Record shapes stored in the ledger's two tables.

use aov_types::Amount;
use serde::{Deserialize, Serialize};

/// A pending request: the exact amount that will fulfill it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Always non-zero.
    pub deposit: Amount,
    /// Creation order across the whole ledger; breaks ties in `fulfill`.
    pub sequence: u64,
}

/// A confirmed verification.
///
/// Existence is what "verified" means. The deposit is kept only so custody
/// can be accounted for when the verification is revoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub deposit: Amount,
}

/// Where a pair currently sits in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "deposit", rename_all = "snake_case")]
pub enum PairState {
    /// No request and no verification.
    None,
    /// A request is waiting for the given deposit.
    Pending(Amount),
    /// The transactee paid; the link is verified.
    Verified,
}
