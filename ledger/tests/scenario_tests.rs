//! End-to-end lifecycle scenarios driven through the public ledger API,
//! the way a UI or audit consumer would see them (results plus the event
//! stream).

use std::sync::{Arc, Mutex};

use aov_ledger::{
    LedgerConfig, LedgerError, LedgerEvent, LedgerSnapshot, PairState, VerificationLedger,
};
use aov_types::{Address, Amount, PairKey};

const DEFAULT_DEPOSIT: Amount = Amount::new(1234);

struct Accounts {
    transactor: Address,
    transactee: Address,
    uninvolved: Address,
}

fn accounts() -> Accounts {
    Accounts {
        transactor: "0x1111111111111111111111111111111111111111".parse().unwrap(),
        transactee: "0x2222222222222222222222222222222222222222".parse().unwrap(),
        uninvolved: "0x3333333333333333333333333333333333333333".parse().unwrap(),
    }
}

fn ledger_with_log() -> (VerificationLedger, Arc<Mutex<Vec<LedgerEvent>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let mut ledger = VerificationLedger::new(LedgerConfig::default());
    ledger.subscribe(Box::new(move |event| sink.lock().unwrap().push(event.clone())));
    (ledger, log)
}

fn event_names(log: &Arc<Mutex<Vec<LedgerEvent>>>) -> Vec<&'static str> {
    log.lock().unwrap().iter().map(LedgerEvent::name).collect()
}

#[test]
fn full_lifecycle_request_pay_revoke_rerequest() {
    let Accounts {
        transactor,
        transactee,
        uninvolved,
    } = accounts();
    let (mut ledger, log) = ledger_with_log();

    ledger.request(transactor, transactee, DEFAULT_DEPOSIT).unwrap();
    assert_eq!(ledger.get_request(transactor, transactee), DEFAULT_DEPOSIT);

    // Underpayment is refused and nothing changes.
    assert!(matches!(
        ledger.fulfill(transactee, Amount::new(1233)),
        Err(LedgerError::NoMatchingRequest { .. })
    ));
    assert_eq!(ledger.status(transactor, transactee), PairState::Pending(DEFAULT_DEPOSIT));

    ledger.fulfill(transactee, DEFAULT_DEPOSIT).unwrap();
    assert!(ledger.is_verified(transactor, transactee));
    assert!(!ledger.is_verified(transactor, uninvolved));

    assert_eq!(
        ledger.request(transactor, transactee, DEFAULT_DEPOSIT),
        Err(LedgerError::AlreadyVerified {
            pair: PairKey::new(transactor, transactee),
        })
    );

    assert!(matches!(
        ledger.revoke(uninvolved, transactor, transactee),
        Err(LedgerError::Unauthorized { .. })
    ));
    ledger.revoke(transactor, transactor, transactee).unwrap();
    assert!(!ledger.is_verified(transactor, transactee));

    ledger.request(transactor, transactee, DEFAULT_DEPOSIT).unwrap();

    assert!(matches!(
        ledger.remove_request(uninvolved, transactor, transactee),
        Err(LedgerError::Unauthorized { .. })
    ));
    ledger.remove_request(transactor, transactor, transactee).unwrap();
    assert_eq!(ledger.status(transactor, transactee), PairState::None);

    assert_eq!(
        event_names(&log),
        [
            "RequestCreated",
            "VerificationCreated",
            "VerificationRevoked",
            "RequestCreated",
            "RequestRemoved",
        ]
    );

    let summary = ledger.summary();
    assert_eq!(summary.pending_requests, 0);
    assert_eq!(summary.verifications, 0);
    assert_eq!(summary.held, Amount::ZERO);
    assert_eq!(summary.forfeited, DEFAULT_DEPOSIT);
    assert_eq!(summary.total, DEFAULT_DEPOSIT);
}

#[test]
fn two_transactors_same_amount_resolve_in_request_order() {
    let Accounts {
        transactor,
        transactee,
        uninvolved,
    } = accounts();
    let (mut ledger, log) = ledger_with_log();

    ledger.request(uninvolved, transactee, DEFAULT_DEPOSIT).unwrap();
    ledger.request(transactor, transactee, DEFAULT_DEPOSIT).unwrap();
    assert_eq!(
        ledger.requests_for(transactee),
        vec![(uninvolved, DEFAULT_DEPOSIT), (transactor, DEFAULT_DEPOSIT)]
    );

    ledger.fulfill(transactee, DEFAULT_DEPOSIT).unwrap();
    assert!(ledger.is_verified(uninvolved, transactee));
    assert!(!ledger.is_verified(transactor, transactee));

    let last = log.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.pair(), PairKey::new(uninvolved, transactee));
}

#[test]
fn snapshot_round_trip_keeps_lifecycle_going() {
    let Accounts {
        transactor,
        transactee,
        ..
    } = accounts();
    let mut ledger = VerificationLedger::default();
    ledger.request(transactor, transactee, DEFAULT_DEPOSIT).unwrap();

    let bytes = LedgerSnapshot::capture(&ledger).to_bytes().unwrap();
    let mut reloaded = LedgerSnapshot::from_bytes(&bytes)
        .unwrap()
        .restore(LedgerConfig::default())
        .unwrap();

    reloaded.fulfill(transactee, DEFAULT_DEPOSIT).unwrap();
    assert!(reloaded.is_verified(transactor, transactee));
    assert_eq!(reloaded.custody().held, DEFAULT_DEPOSIT);
}
