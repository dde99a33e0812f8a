//! Custody totals for deposits the ledger has accepted.
//!
//! `held` is the sum of deposits behind live verifications. When a
//! verification is revoked its deposit is not paid out anywhere; it moves to
//! `forfeited` and stays in custody. `forfeited` is a saturating running
//! total, so it never blocks a revoke.

use aov_types::Amount;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Custody {
    pub held: Amount,
    pub forfeited: Amount,
}

impl Custody {
    /// Custody after accepting a deposit, or `None` on overflow.
    pub fn credit(self, deposit: Amount) -> Option<Self> {
        Some(Self {
            held: self.held.checked_add(deposit)?,
            ..self
        })
    }

    /// Custody after moving a revoked verification's deposit out of `held`.
    ///
    /// `held` always covers a live verification's deposit.
    pub fn forfeit(self, deposit: Amount) -> Self {
        Self {
            held: self.held.saturating_sub(deposit),
            forfeited: self.forfeited.saturating_add(deposit),
        }
    }

    /// Everything the ledger has accepted and still keeps, saturating at the maximum.
    pub fn total(&self) -> Amount {
        self.held.saturating_add(self.forfeited)
    }
}
