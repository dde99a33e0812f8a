//! The ordered (transactor, transactee) key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Address;

/// Identifies one request/verification lifecycle.
///
/// Keys are directional: `(A, B)` and `(B, A)` are unrelated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    /// The party that asks for proof and may remove or revoke.
    pub transactor: Address,
    /// The party that proves the link by paying the deposit.
    pub transactee: Address,
}

impl PairKey {
    pub fn new(transactor: Address, transactee: Address) -> Self {
        Self {
            transactor,
            transactee,
        }
    }

    /// The key for the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            transactor: self.transactee,
            transactee: self.transactor,
        }
    }

    /// Whether both sides name the same participant.
    pub fn is_self_pair(&self) -> bool {
        self.transactor == self.transactee
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.transactor, self.transactee)
    }
}
