//! Address ownership verification ledger.
//!
//! A transactor asks a transactee to prove a link between their addresses;
//! the transactee proves it by paying an exact, pre-agreed deposit. The
//! ledger records pending requests and confirmed verifications per ordered
//! (transactor, transactee) pair, gates every mutation on the caller's role,
//! and emits one event per successful mutation.

pub mod custody;
pub mod error;
pub mod event;
pub mod ledger;
pub mod matching;
pub mod records;
pub mod snapshot;

pub use custody::Custody;
pub use error::LedgerError;
pub use event::{EventBus, LedgerEvent, ListenerId};
pub use ledger::{LedgerConfig, LedgerSummary, VerificationLedger};
pub use matching::{MatchIndex, MatchOutcome, MatchPolicy};
pub use records::{PairState, RequestRecord, VerificationRecord};
pub use snapshot::{LedgerSnapshot, RequestEntry, VerificationEntry, SNAPSHOT_VERSION};
