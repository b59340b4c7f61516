//! Double-entry ledger for FinArch.
//!
//! This crate owns account balances and the append-only transaction history.
//! It provides:
//! - `Transaction` / `TransactionLine` records with the zero-sum invariant
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryLedger`, an atomic all-or-nothing implementation
//! - `PostingGate` / `PostingObserver` seams for pre-post screening and
//!   post-post notification
//! - Deterministic replay and balance/audit projections
//! - Ledger-wide validation (balance, conservation, replay convergence)

pub mod error;
pub mod memory;
pub mod projection;
pub mod records;
pub mod replay;
pub mod traits;
pub mod validation;

pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use projection::{AuditIndexEntry, BalanceRow, BalanceSheet, ProjectionBuilder};
pub use records::{PostingReceipt, Transaction, TransactionLine};
pub use replay::{ReplayEngine, ReplayResult};
pub use traits::{GateVerdict, LedgerReader, LedgerWriter, PostingGate, PostingObserver};
pub use validation::{is_balanced, LedgerValidator, ValidationReport, Violation, ViolationKind};
