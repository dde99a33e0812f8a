//! Events emitted after every successful ledger mutation.

use aov_types::{Address, Amount, PairKey};
use serde::{Deserialize, Serialize};

/// One event per successful mutation, emitted after the state change is applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    /// A transactor asked a transactee to pay `deposit`.
    RequestCreated {
        transactor: Address,
        transactee: Address,
        deposit: Amount,
    },
    /// The transactee paid the exact deposit; the pair is verified.
    VerificationCreated {
        transactor: Address,
        transactee: Address,
        deposit: Amount,
    },
    /// The transactor dissolved a verification.
    VerificationRevoked {
        transactor: Address,
        transactee: Address,
    },
    /// The transactor withdrew a pending request.
    RequestRemoved {
        transactor: Address,
        transactee: Address,
    },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestCreated { .. } => "RequestCreated",
            Self::VerificationCreated { .. } => "VerificationCreated",
            Self::VerificationRevoked { .. } => "VerificationRevoked",
            Self::RequestRemoved { .. } => "RequestRemoved",
        }
    }

    /// The pair this event concerns.
    pub fn pair(&self) -> PairKey {
        match *self {
            Self::RequestCreated {
                transactor,
                transactee,
                ..
            }
            | Self::VerificationCreated {
                transactor,
                transactee,
                ..
            }
            | Self::VerificationRevoked {
                transactor,
                transactee,
            }
            | Self::RequestRemoved {
                transactor,
                transactee,
            } => PairKey::new(transactor, transactee),
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&LedgerEvent) + Send + Sync>;

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners run inline on the mutating call; keep them fast.
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Drop a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
