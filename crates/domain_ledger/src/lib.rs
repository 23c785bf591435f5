//! Ledger Domain - Append-Only Participant Ledger
//!
//! Every movement of money for an investor or partner is one immutable
//! ledger entry: a deposit, a withdrawal, or a profit credit. Amounts are
//! always positive; the entry kind carries the direction.
//!
//! # Balance
//!
//! A participant's balance is never stored. It is always the fold
//!
//! ```text
//! balance = Σ deposit + Σ profit − Σ withdrawal
//! ```
//!
//! over the participant's entries, computed by [`balance::compute_balance`].
//!
//! # Approvals
//!
//! Deposits and withdrawals requested by participants become ledger entries
//! only when an administrator approves them (see [`approval`]). Mistakes in
//! those entries are fixed through [`correction`].

pub mod entry;
pub mod balance;
pub mod request;
pub mod approval;
pub mod correction;
pub mod ports;
pub mod error;

pub use entry::{LedgerEntry, NewLedgerEntry, EntryKind};
pub use balance::{
    BalanceCalculator, BalanceSummary, CapitalSummary, ParticipantBalance, Statement,
    compute_balance,
};
pub use request::{ApprovalRequest, RequestKind, RequestStatus};
pub use approval::ApprovalService;
pub use correction::CorrectionService;
pub use ports::{LedgerPort, RequestPort, RequestQuery};
pub use error::LedgerError;
