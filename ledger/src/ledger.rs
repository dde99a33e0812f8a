//! The verification ledger: pending requests and confirmed verifications
//! keyed by ordered (transactor, transactee) pairs.
//!
//! Per pair the lifecycle is
//!
//! ```text
//! [none] --request--> [pending(deposit)] --fulfill(exact amount)--> [verified]
//! [pending(deposit)] --remove_request--> [none]
//! [verified] --revoke--> [none]
//! ```
//!
//! Every mutation checks all of its preconditions before touching any table,
//! so a refused call leaves the ledger, its custody totals, and the event
//! stream unchanged.

use std::collections::HashMap;
use std::fmt;

use aov_types::{Address, Amount, PairKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::custody::Custody;
use crate::error::LedgerError;
use crate::event::{EventBus, LedgerEvent, ListenerId};
use crate::matching::{MatchIndex, MatchOutcome, MatchPolicy};
use crate::records::{PairState, RequestRecord, VerificationRecord};

/// Ledger-side configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

/// Summary statistics for the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub pending_requests: u64,
    pub verifications: u64,
    pub held: Amount,
    pub forfeited: Amount,
    /// `held + forfeited`, saturating.
    pub total: Amount,
}

pub struct VerificationLedger {
    config: LedgerConfig,
    pub(crate) requests: HashMap<PairKey, RequestRecord>,
    pub(crate) verifications: HashMap<PairKey, VerificationRecord>,
    pub(crate) custody: Custody,
    pub(crate) next_sequence: u64,
    index: MatchIndex,
    events: EventBus,
}

fn rejected(op: &'static str, err: LedgerError) -> LedgerError {
    debug!(op, error = %err, "ledger operation rejected");
    err
}

impl VerificationLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            requests: HashMap::new(),
            verifications: HashMap::new(),
            custody: Custody::default(),
            next_sequence: 0,
            index: MatchIndex::new(),
            events: EventBus::new(),
        }
    }

    /// Rebuild a ledger from validated tables. Used by snapshot restore.
    pub(crate) fn from_parts(
        config: LedgerConfig,
        requests: HashMap<PairKey, RequestRecord>,
        verifications: HashMap<PairKey, VerificationRecord>,
        custody: Custody,
        next_sequence: u64,
    ) -> Self {
        let mut index = MatchIndex::new();
        for (pair, record) in &requests {
            index.insert(pair.transactee, record.deposit, record.sequence, pair.transactor);
        }
        Self {
            config,
            requests,
            verifications,
            custody,
            next_sequence,
            index,
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Register a listener for every future successful mutation.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }

    // ── Mutations ──────────────────────────────────────────────────────

    /// Ask `transactee` to prove the link by paying exactly `deposit`.
    ///
    /// `transactor` is the authenticated caller.
    pub fn request(
        &mut self,
        transactor: Address,
        transactee: Address,
        deposit: Amount,
    ) -> Result<(), LedgerError> {
        let _span = info_span!("request", %transactor, %transactee, %deposit).entered();
        let pair = PairKey::new(transactor, transactee);

        if pair.is_self_pair() {
            return Err(rejected("request", LedgerError::InvalidParticipants(transactor)));
        }
        if deposit.is_zero() {
            return Err(rejected("request", LedgerError::InvalidDeposit { pair }));
        }
        if let Some(existing) = self.requests.get(&pair) {
            return Err(rejected(
                "request",
                LedgerError::DuplicateRequest {
                    pair,
                    existing: existing.deposit,
                },
            ));
        }
        if self.verifications.contains_key(&pair) {
            return Err(rejected("request", LedgerError::AlreadyVerified { pair }));
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.requests.insert(pair, RequestRecord { deposit, sequence });
        self.index.insert(transactee, deposit, sequence, transactor);

        info!(sequence, "verification requested");
        self.events.emit(&LedgerEvent::RequestCreated {
            transactor,
            transactee,
            deposit,
        });
        Ok(())
    }

    /// Apply a payment of `amount` from `payer` to the ledger.
    ///
    /// The payment fulfills the pending request addressed to `payer` whose
    /// deposit equals `amount` exactly. On success the payment stays in
    /// custody and the verified pair is returned; on any error nothing is
    /// retained.
    pub fn fulfill(&mut self, payer: Address, amount: Amount) -> Result<PairKey, LedgerError> {
        let _span = info_span!("fulfill", %payer, %amount).entered();

        let transactor = match self.index.find(payer, amount, self.config.match_policy) {
            MatchOutcome::Matched(transactor) => transactor,
            MatchOutcome::None => {
                return Err(rejected(
                    "fulfill",
                    LedgerError::NoMatchingRequest { payer, amount },
                ))
            }
            MatchOutcome::Ambiguous(candidates) => {
                return Err(rejected(
                    "fulfill",
                    LedgerError::AmbiguousMatch {
                        payer,
                        amount,
                        candidates,
                    },
                ))
            }
        };

        let pair = PairKey::new(transactor, payer);
        let record = match self.requests.get(&pair) {
            Some(record) if record.deposit == amount => *record,
            _ => {
                return Err(rejected(
                    "fulfill",
                    LedgerError::NoMatchingRequest { payer, amount },
                ))
            }
        };
        let Some(custody) = self.custody.credit(amount) else {
            return Err(rejected("fulfill", LedgerError::CustodyOverflow { amount }));
        };

        self.requests.remove(&pair);
        self.index.remove(payer, amount, record.sequence);
        self.verifications
            .insert(pair, VerificationRecord { deposit: amount });
        self.custody = custody;

        info!(%transactor, sequence = record.sequence, held = %self.custody.held, "verification created");
        self.events.emit(&LedgerEvent::VerificationCreated {
            transactor,
            transactee: payer,
            deposit: amount,
        });
        Ok(pair)
    }

    /// Dissolve a verification. Only the transactor may do this.
    ///
    /// The deposit is not paid out; it moves to the forfeited custody total.
    pub fn revoke(
        &mut self,
        caller: Address,
        transactor: Address,
        transactee: Address,
    ) -> Result<(), LedgerError> {
        let _span = info_span!("revoke", %caller, %transactor, %transactee).entered();
        let pair = PairKey::new(transactor, transactee);

        if caller != transactor {
            return Err(rejected("revoke", LedgerError::Unauthorized { caller, pair }));
        }
        let Some(record) = self.verifications.get(&pair).copied() else {
            return Err(rejected("revoke", LedgerError::NotVerified { pair }));
        };
        self.verifications.remove(&pair);
        self.custody = self.custody.forfeit(record.deposit);

        info!(forfeited = %record.deposit, "verification revoked");
        self.events.emit(&LedgerEvent::VerificationRevoked {
            transactor,
            transactee,
        });
        Ok(())
    }

    /// Withdraw a pending request. Only the transactor may do this.
    pub fn remove_request(
        &mut self,
        caller: Address,
        transactor: Address,
        transactee: Address,
    ) -> Result<(), LedgerError> {
        let _span = info_span!("remove_request", %caller, %transactor, %transactee).entered();
        let pair = PairKey::new(transactor, transactee);

        if caller != transactor {
            return Err(rejected(
                "remove_request",
                LedgerError::Unauthorized { caller, pair },
            ));
        }
        let Some(record) = self.requests.remove(&pair) else {
            return Err(rejected("remove_request", LedgerError::NoSuchRequest { pair }));
        };
        self.index.remove(transactee, record.deposit, record.sequence);

        info!(deposit = %record.deposit, "request removed");
        self.events.emit(&LedgerEvent::RequestRemoved {
            transactor,
            transactee,
        });
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// The pending deposit for the pair, or zero when nothing is pending.
    pub fn get_request(&self, transactor: Address, transactee: Address) -> Amount {
        self.requests
            .get(&PairKey::new(transactor, transactee))
            .map_or(Amount::ZERO, |r| r.deposit)
    }

    pub fn is_verified(&self, transactor: Address, transactee: Address) -> bool {
        self.verifications
            .contains_key(&PairKey::new(transactor, transactee))
    }

    pub fn status(&self, transactor: Address, transactee: Address) -> PairState {
        let pair = PairKey::new(transactor, transactee);
        if self.verifications.contains_key(&pair) {
            PairState::Verified
        } else if let Some(record) = self.requests.get(&pair) {
            PairState::Pending(record.deposit)
        } else {
            PairState::None
        }
    }

    /// Pending requests addressed to `transactee`, oldest first.
    pub fn requests_for(&self, transactee: Address) -> Vec<(Address, Amount)> {
        let mut found: Vec<(u64, Address, Amount)> = self
            .requests
            .iter()
            .filter(|(pair, _)| pair.transactee == transactee)
            .map(|(pair, record)| (record.sequence, pair.transactor, record.deposit))
            .collect();
        found.sort_unstable_by_key(|(sequence, _, _)| *sequence);
        found
            .into_iter()
            .map(|(_, transactor, deposit)| (transactor, deposit))
            .collect()
    }

    pub fn custody(&self) -> Custody {
        self.custody
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            pending_requests: self.requests.len() as u64,
            verifications: self.verifications.len() as u64,
            held: self.custody.held,
            forfeited: self.custody.forfeited,
            total: self.custody.total(),
        }
    }
}

impl fmt::Debug for VerificationLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationLedger")
            .field("config", &self.config)
            .field("pending_requests", &self.requests.len())
            .field("verifications", &self.verifications.len())
            .field("custody", &self.custody)
            .field("listeners", &self.events.listener_count())
            .finish()
    }
}

impl Default for VerificationLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
