//! Foundation types for FinArch.
//!
//! This crate provides the identifier, amount, and time types shared by the
//! ledger and the audit chain. Every other FinArch crate depends on
//! `finarch-types`.
//!
//! # Key Types
//!
//! - [`AccountId`]: String key identifying a ledger account
//! - [`TransactionId`]: Random UUID v4 transaction identifier
//! - [`Amount`]: Signed exact decimal (debit positive, credit negative)
//! - [`Timestamp`]: UTC milliseconds since the Unix epoch

pub mod amount;
pub mod error;
pub mod identity;
pub mod temporal;

pub use amount::Amount;
pub use error::TypeError;
pub use identity::{AccountId, TransactionId};
pub use temporal::Timestamp;
