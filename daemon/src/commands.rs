//! One subcommand per ledger operation.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use aov_ledger::{LedgerEvent, PairState, VerificationLedger};
use aov_types::{Address, Amount};
use serde::Serialize;

use crate::error::DaemonError;

#[derive(clap::Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Ask a transactee to prove the link by paying an exact deposit.
    Request {
        /// Transactor (the authenticated caller).
        #[arg(long)]
        from: Address,
        /// Transactee that must pay.
        #[arg(long)]
        to: Address,
        /// Exact deposit the transactee must pay.
        #[arg(long)]
        deposit: Amount,
    },
    /// Pay a deposit into the ledger, fulfilling the matching request.
    Pay {
        /// Paying transactee.
        #[arg(long)]
        from: Address,
        #[arg(long)]
        amount: Amount,
    },
    /// Revoke a verification (transactor only).
    Revoke {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        transactor: Address,
        #[arg(long)]
        transactee: Address,
    },
    /// Remove a pending request (transactor only).
    RemoveRequest {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        transactor: Address,
        #[arg(long)]
        transactee: Address,
    },
    /// Show the pending deposit and verification state of a pair.
    Status {
        #[arg(long)]
        transactor: Address,
        #[arg(long)]
        transactee: Address,
    },
    /// List pending requests addressed to a transactee, oldest first.
    Pending {
        #[arg(long)]
        transactee: Address,
    },
    /// Show custody totals and record counts.
    Custody,
}

impl Command {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Request { .. } | Self::Pay { .. } | Self::Revoke { .. } | Self::RemoveRequest { .. }
        )
    }
}

/// What a command produced: text for stdout, and whether the ledger changed.
#[derive(Debug)]
pub struct Execution {
    pub output: String,
    pub mutated: bool,
}

/// Apply `command` to `ledger`.
///
/// Events emitted during the call are logged and included in the output.
/// The collecting listener is removed before returning, so the same ledger
/// can be driven by many calls.
pub fn execute(
    ledger: &mut VerificationLedger,
    command: &Command,
    json: bool,
) -> Result<Execution, DaemonError> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let listener = ledger.subscribe(Box::new(move |event: &LedgerEvent| {
        tracing::info!(event = event.name(), pair = %event.pair(), "ledger event");
        if let Ok(mut seen) = sink.lock() {
            seen.push(event.clone());
        }
    }));

    let result = apply(ledger, command, json);
    ledger.unsubscribe(listener);
    let mut output = result?;

    let events = events.lock().map(|e| e.clone()).unwrap_or_default();
    for event in &events {
        if json {
            output.push_str(&serde_json::to_string(event)?);
            output.push('\n');
        } else {
            let _ = writeln!(output, "{}", describe(event));
        }
    }

    Ok(Execution {
        output,
        mutated: !events.is_empty(),
    })
}

fn apply(ledger: &mut VerificationLedger, command: &Command, json: bool) -> Result<String, DaemonError> {
    Ok(match *command {
        Command::Request { from, to, deposit } => {
            ledger.request(from, to, deposit)?;
            String::new()
        }
        Command::Pay { from, amount } => {
            ledger.fulfill(from, amount)?;
            String::new()
        }
        Command::Revoke {
            caller,
            transactor,
            transactee,
        } => {
            ledger.revoke(caller, transactor, transactee)?;
            String::new()
        }
        Command::RemoveRequest {
            caller,
            transactor,
            transactee,
        } => {
            ledger.remove_request(caller, transactor, transactee)?;
            String::new()
        }
        Command::Status {
            transactor,
            transactee,
        } => render_status(ledger.status(transactor, transactee), json)?,
        Command::Pending { transactee } => render_pending(&ledger.requests_for(transactee), json)?,
        Command::Custody => {
            let summary = ledger.summary();
            if json {
                format!("{}\n", serde_json::to_string(&summary)?)
            } else {
                format!(
                    "held: {}\nforfeited: {}\ntotal: {}\npending requests: {}\nverifications: {}\n",
                    summary.held,
                    summary.forfeited,
                    summary.total,
                    summary.pending_requests,
                    summary.verifications
                )
            }
        }
    })
}

fn render_status(state: PairState, json: bool) -> Result<String, DaemonError> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string(&state)?));
    }
    Ok(match state {
        PairState::None => "no pending request; not verified\n".to_string(),
        PairState::Pending(deposit) => {
            format!("pending: transactee must pay exactly {deposit} to verify\n")
        }
        PairState::Verified => "verified\n".to_string(),
    })
}

fn render_pending(requests: &[(Address, Amount)], json: bool) -> Result<String, DaemonError> {
    if json {
        #[derive(Serialize)]
        struct PendingEntry {
            transactor: Address,
            deposit: Amount,
        }

        let entries: Vec<PendingEntry> = requests
            .iter()
            .map(|&(transactor, deposit)| PendingEntry {
                transactor,
                deposit,
            })
            .collect();
        return Ok(format!("{}\n", serde_json::to_string(&entries)?));
    }
    if requests.is_empty() {
        return Ok("no pending requests\n".to_string());
    }
    let mut out = String::new();
    for (transactor, deposit) in requests {
        let _ = writeln!(out, "{transactor} requests {deposit}");
    }
    Ok(out)
}

fn describe(event: &LedgerEvent) -> String {
    match event {
        LedgerEvent::RequestCreated {
            transactor,
            transactee,
            deposit,
        } => format!("RequestCreated {transactor} -> {transactee} deposit {deposit}"),
        LedgerEvent::VerificationCreated {
            transactor,
            transactee,
            deposit,
        } => format!("VerificationCreated {transactor} -> {transactee} deposit {deposit}"),
        LedgerEvent::VerificationRevoked {
            transactor,
            transactee,
        } => format!("VerificationRevoked {transactor} -> {transactee}"),
        LedgerEvent::RequestRemoved {
            transactor,
            transactee,
        } => format!("RequestRemoved {transactor} -> {transactee}"),
    }
}
