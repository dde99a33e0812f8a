use aov_types::{Address, Amount, PairKey};
use thiserror::Error;

/// Every way a ledger operation can be refused.
///
/// All variants are precondition failures: when one is returned the ledger,
/// its custody totals and its event stream are exactly as they were before
/// the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("transactor and transactee are the same address {0}")]
    InvalidParticipants(Address),

    #[error("deposit for {pair} must be greater than zero")]
    InvalidDeposit { pair: PairKey },

    #[error("a request for {pair} is already pending (deposit {existing})")]
    DuplicateRequest { pair: PairKey, existing: Amount },

    #[error("{pair} is already verified")]
    AlreadyVerified { pair: PairKey },

    #[error("no pending request addressed to {payer} for exactly {amount}")]
    NoMatchingRequest { payer: Address, amount: Amount },

    #[error("{candidates} pending requests addressed to {payer} ask for {amount}; refusing to pick one")]
    AmbiguousMatch {
        payer: Address,
        amount: Amount,
        candidates: usize,
    },

    #[error("{caller} is not the transactor of {pair}")]
    Unauthorized { caller: Address, pair: PairKey },

    #[error("{pair} is not verified")]
    NotVerified { pair: PairKey },

    #[error("no pending request for {pair}")]
    NoSuchRequest { pair: PairKey },

    #[error("accepting {amount} would overflow ledger custody")]
    CustodyOverflow { amount: Amount },

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
