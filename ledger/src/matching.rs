//! Payment matching: which pending request does a payment satisfy?
//!
//! Requests are indexed by `(transactee, deposit)`. Within one bucket,
//! candidates are ordered by creation sequence, so the outcome never depends
//! on hash-map iteration order.

use aov_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How `fulfill` resolves a payment that matches several transactors' requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Satisfy the request that was created first.
    #[default]
    EarliestRequest,
    /// Refuse the payment when more than one request matches.
    RejectAmbiguous,
}

impl MatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EarliestRequest => "earliest_request",
            Self::RejectAmbiguous => "reject_ambiguous",
        }
    }
}

/// Outcome of looking up a payment in the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The transactor whose request the payment satisfies.
    Matched(Address),
    None,
    /// More than one candidate under `RejectAmbiguous`.
    Ambiguous(usize),
}

/// Secondary index over pending requests.
#[derive(Debug, Default)]
pub struct MatchIndex {
    buckets: HashMap<(Address, Amount), BTreeMap<u64, Address>>,
}

impl MatchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, transactee: Address, deposit: Amount, sequence: u64, transactor: Address) {
        self.buckets
            .entry((transactee, deposit))
            .or_default()
            .insert(sequence, transactor);
    }

    pub fn remove(&mut self, transactee: Address, deposit: Amount, sequence: u64) {
        let key = (transactee, deposit);
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.remove(&sequence);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
    }

    pub fn find(&self, transactee: Address, amount: Amount, policy: MatchPolicy) -> MatchOutcome {
        let Some(bucket) = self.buckets.get(&(transactee, amount)) else {
            return MatchOutcome::None;
        };
        match policy {
            MatchPolicy::RejectAmbiguous if bucket.len() > 1 => MatchOutcome::Ambiguous(bucket.len()),
            _ => bucket
                .values()
                .next()
                .copied()
                .map_or(MatchOutcome::None, MatchOutcome::Matched),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    #[test]
    fn earliest_sequence_wins() {
        let mut index = MatchIndex::new();
        index.insert(addr(9), Amount::new(5), 7, addr(2));
        index.insert(addr(9), Amount::new(5), 3, addr(1));
        index.insert(addr(9), Amount::new(5), 11, addr(3));

        assert_eq!(
            index.find(addr(9), Amount::new(5), MatchPolicy::EarliestRequest),
            MatchOutcome::Matched(addr(1))
        );
    }

    #[test]
    fn reject_ambiguous_reports_candidate_count() {
        let mut index = MatchIndex::new();
        index.insert(addr(9), Amount::new(5), 1, addr(1));
        index.insert(addr(9), Amount::new(5), 2, addr(2));

        assert_eq!(
            index.find(addr(9), Amount::new(5), MatchPolicy::RejectAmbiguous),
            MatchOutcome::Ambiguous(2)
        );
    }

    #[test]
    fn reject_ambiguous_still_matches_single_candidate() {
        let mut index = MatchIndex::new();
        index.insert(addr(9), Amount::new(5), 1, addr(1));
        assert_eq!(
            index.find(addr(9), Amount::new(5), MatchPolicy::RejectAmbiguous),
            MatchOutcome::Matched(addr(1))
        );
    }

    #[test]
    fn amount_must_match_exactly() {
        let mut index = MatchIndex::new();
        index.insert(addr(9), Amount::new(5), 1, addr(1));
        assert_eq!(
            index.find(addr(9), Amount::new(4), MatchPolicy::EarliestRequest),
            MatchOutcome::None
        );
        assert_eq!(
            index.find(addr(8), Amount::new(5), MatchPolicy::EarliestRequest),
            MatchOutcome::None
        );
    }

    #[test]
    fn remove_prunes_empty_buckets() {
        let mut index = MatchIndex::new();
        index.insert(addr(9), Amount::new(5), 1, addr(1));
        index.remove(addr(9), Amount::new(5), 1);
        assert!(index.buckets.is_empty());
        assert_eq!(
            index.find(addr(9), Amount::new(5), MatchPolicy::EarliestRequest),
            MatchOutcome::None
        );
    }
}
