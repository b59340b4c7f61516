//! High-level SDK for FinArch.
//!
//! [`FinArch`] owns a double-entry ledger and a proof-of-work audit chain and
//! keeps them in step: every transfer is posted to the ledger first and only
//! then queued for the next block. Optional AML screening and event
//! recording hook into the ledger's posting path.

pub mod config;
pub mod error;
pub mod finarch;
pub mod report;

pub use config::FinArchConfig;
pub use error::{SdkError, SdkResult};
pub use finarch::FinArch;
pub use report::{Summary, TransferReceipt, VerifyReport};

// Re-export key types
pub use finarch_chain::{Block, ChainConfig, ChainPayload, ChainValidationError};
pub use finarch_crypto::{CancellationFlag, ProofOutcome};
pub use finarch_gate::{AmlConfig, RiskLevel, ScreeningRequest, ScreeningResult};
pub use finarch_ledger::{
    AuditIndexEntry, BalanceSheet, PostingReceipt, ReplayResult, Transaction, ValidationReport,
};
pub use finarch_types::{AccountId, Amount, TransactionId};
