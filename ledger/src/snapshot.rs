//! Ledger snapshots: capture every record so a ledger can be persisted and
//! reloaded.
//!
//! The snapshot hash is computed deterministically from the records, so a
//! reader can detect a damaged or hand-edited snapshot before trusting it.
//! Restoring re-checks every ledger invariant; a snapshot that would produce
//! an inconsistent ledger is refused.

use std::collections::{HashMap, HashSet};

use aov_types::{Amount, PairKey};
use serde::{Deserialize, Serialize};

use crate::custody::Custody;
use crate::error::LedgerError;
use crate::ledger::{LedgerConfig, VerificationLedger};
use crate::records::{RequestRecord, VerificationRecord};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEntry {
    pub pair: PairKey,
    pub deposit: Amount,
    pub sequence: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEntry {
    pub pair: PairKey,
    pub deposit: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 over everything below.
    pub hash: [u8; 32],
    pub version: u32,
    pub next_sequence: u64,
    /// Ordered by creation sequence.
    pub requests: Vec<RequestEntry>,
    /// Ordered by pair.
    pub verifications: Vec<VerificationEntry>,
    pub custody: Custody,
}

impl LedgerSnapshot {
    /// Capture the current state of a ledger.
    pub fn capture(ledger: &VerificationLedger) -> Self {
        let mut requests: Vec<RequestEntry> = ledger
            .requests
            .iter()
            .map(|(pair, record)| RequestEntry {
                pair: *pair,
                deposit: record.deposit,
                sequence: record.sequence,
            })
            .collect();
        requests.sort_unstable_by_key(|e| e.sequence);

        let mut verifications: Vec<VerificationEntry> = ledger
            .verifications
            .iter()
            .map(|(pair, record)| VerificationEntry {
                pair: *pair,
                deposit: record.deposit,
            })
            .collect();
        verifications.sort_unstable_by_key(|e| e.pair);

        let mut snap = Self {
            hash: [0u8; 32],
            version: SNAPSHOT_VERSION,
            next_sequence: ledger.next_sequence,
            requests,
            verifications,
            custody: ledger.custody,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.next_sequence.to_le_bytes());
        hasher.update((self.requests.len() as u64).to_le_bytes());
        for entry in &self.requests {
            hasher.update(entry.pair.transactor.as_bytes());
            hasher.update(entry.pair.transactee.as_bytes());
            hasher.update(entry.deposit.raw().to_le_bytes());
            hasher.update(entry.sequence.to_le_bytes());
        }
        hasher.update((self.verifications.len() as u64).to_le_bytes());
        for entry in &self.verifications {
            hasher.update(entry.pair.transactor.as_bytes());
            hasher.update(entry.pair.transactee.as_bytes());
            hasher.update(entry.deposit.raw().to_le_bytes());
        }
        hasher.update(self.custody.held.raw().to_le_bytes());
        hasher.update(self.custody.forfeited.raw().to_le_bytes());

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Whether the stored hash matches the records.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Rebuild a ledger from this snapshot.
    ///
    /// Event listeners are not part of a snapshot; subscribe again after restoring.
    pub fn restore(self, config: LedgerConfig) -> Result<VerificationLedger, LedgerError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                self.version
            )));
        }
        if !self.verify() {
            return Err(LedgerError::Snapshot("hash mismatch".into()));
        }
        if self.next_sequence == u64::MAX {
            return Err(corrupt("request sequence exhausted".into()));
        }

        let mut requests = HashMap::with_capacity(self.requests.len());
        let mut sequences = HashSet::with_capacity(self.requests.len());
        for entry in self.requests {
            if entry.pair.is_self_pair() {
                return Err(corrupt(format!("self-pair request {}", entry.pair)));
            }
            if entry.deposit.is_zero() {
                return Err(corrupt(format!("zero deposit for {}", entry.pair)));
            }
            if entry.sequence >= self.next_sequence || !sequences.insert(entry.sequence) {
                return Err(corrupt(format!(
                    "bad sequence {} for {}",
                    entry.sequence, entry.pair
                )));
            }
            let record = RequestRecord {
                deposit: entry.deposit,
                sequence: entry.sequence,
            };
            if requests.insert(entry.pair, record).is_some() {
                return Err(corrupt(format!("duplicate request {}", entry.pair)));
            }
        }

        let mut verifications = HashMap::with_capacity(self.verifications.len());
        let mut held = Amount::ZERO;
        for entry in self.verifications {
            if entry.pair.is_self_pair() {
                return Err(corrupt(format!("self-pair verification {}", entry.pair)));
            }
            if requests.contains_key(&entry.pair) {
                return Err(corrupt(format!(
                    "{} is both pending and verified",
                    entry.pair
                )));
            }
            held = held
                .checked_add(entry.deposit)
                .ok_or_else(|| corrupt("verification deposits overflow".into()))?;
            let record = VerificationRecord {
                deposit: entry.deposit,
            };
            if verifications.insert(entry.pair, record).is_some() {
                return Err(corrupt(format!("duplicate verification {}", entry.pair)));
            }
        }
        if held != self.custody.held {
            return Err(corrupt(format!(
                "held custody {} does not equal verification deposits {held}",
                self.custody.held
            )));
        }

        Ok(VerificationLedger::from_parts(
            config,
            requests,
            verifications,
            self.custody,
            self.next_sequence,
        ))
    }
}

fn corrupt(reason: String) -> LedgerError {
    LedgerError::Snapshot(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aov_types::Address;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn populated_ledger() -> VerificationLedger {
        let mut ledger = VerificationLedger::default();
        ledger.request(addr(1), addr(2), Amount::new(100)).unwrap();
        ledger.request(addr(3), addr(2), Amount::new(100)).unwrap();
        ledger.request(addr(4), addr(5), Amount::new(42)).unwrap();
        ledger.fulfill(addr(5), Amount::new(42)).unwrap();
        ledger.request(addr(6), addr(7), Amount::new(9)).unwrap();
        ledger.fulfill(addr(7), Amount::new(9)).unwrap();
        ledger.revoke(addr(6), addr(6), addr(7)).unwrap();
        ledger
    }

    #[test]
    fn capture_and_restore_preserves_state() {
        let ledger = populated_ledger();
        let snap = LedgerSnapshot::capture(&ledger);
        assert!(snap.verify());

        let bytes = snap.to_bytes().unwrap();
        let mut restored = LedgerSnapshot::from_bytes(&bytes)
            .unwrap()
            .restore(LedgerConfig::default())
            .unwrap();

        assert_eq!(restored.summary(), ledger.summary());
        assert_eq!(restored.get_request(addr(1), addr(2)), Amount::new(100));
        assert!(restored.is_verified(addr(4), addr(5)));
        assert!(!restored.is_verified(addr(6), addr(7)));

        // Creation order survives, so the earliest request still wins.
        let pair = restored.fulfill(addr(2), Amount::new(100)).unwrap();
        assert_eq!(pair, PairKey::new(addr(1), addr(2)));

        // New requests continue the sequence rather than reusing it.
        restored.request(addr(8), addr(9), Amount::new(1)).unwrap();
        assert_eq!(
            LedgerSnapshot::capture(&restored).next_sequence,
            ledger.next_sequence + 1
        );
    }

    #[test]
    fn capture_is_deterministic() {
        let ledger = populated_ledger();
        assert_eq!(
            LedgerSnapshot::capture(&ledger).hash,
            LedgerSnapshot::capture(&ledger).hash
        );
    }

    #[test]
    fn tampered_snapshot_is_refused() {
        let mut snap = LedgerSnapshot::capture(&populated_ledger());
        snap.custody.held = Amount::new(1);
        assert!(!snap.verify());
        assert!(matches!(
            snap.restore(LedgerConfig::default()),
            Err(LedgerError::Snapshot(_))
        ));
    }

    #[test]
    fn rehashed_inconsistent_snapshot_is_refused() {
        let mut snap = LedgerSnapshot::capture(&populated_ledger());
        // Mark a pending pair verified as well, and fix up the hash and custody.
        let pending = snap.requests[0].pair;
        snap.verifications.push(VerificationEntry {
            pair: pending,
            deposit: Amount::new(5),
        });
        snap.custody.held = Amount::new(47);
        snap.hash = snap.compute_hash();

        let err = snap.restore(LedgerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("both pending and verified"));
    }

    #[test]
    fn exhausted_sequence_is_refused() {
        let mut snap = LedgerSnapshot::capture(&populated_ledger());
        snap.next_sequence = u64::MAX;
        snap.hash = snap.compute_hash();

        let err = snap.restore(LedgerConfig::default()).unwrap_err();
        assert_eq!(err, LedgerError::Snapshot("request sequence exhausted".into()));
    }

    #[test]
    fn unknown_version_is_refused() {
        let mut snap = LedgerSnapshot::capture(&VerificationLedger::default());
        snap.version = 99;
        snap.hash = snap.compute_hash();
        assert!(snap.restore(LedgerConfig::default()).is_err());
    }

    #[test]
    fn garbage_bytes_are_refused() {
        assert!(LedgerSnapshot::from_bytes(&[0xFF, 0x00, 0x13]).is_err());
    }
}
