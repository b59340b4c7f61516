//! Hash-chained audit log for FinArch.
//!
//! Payloads accumulate in a pending buffer until a proof of work is found,
//! then they are sealed into a [`Block`] that links to its predecessor by
//! SHA-256 hash. Anyone holding the blocks can re-verify every link and
//! every proof with [`validate_chain`].
//!
//! # Key Types
//!
//! - [`Blockchain`]: owned chain plus pending buffer
//! - [`Block`] / [`ChainPayload`]: sealed records
//! - [`ChainConfig`]: difficulty, genesis parameters, search workers
//! - [`ChainValidationError`]: first invalid block and why

pub mod block;
pub mod chain;
pub mod config;
pub mod error;
pub mod validation;

pub use block::{hash, Block, ChainPayload};
pub use chain::Blockchain;
pub use config::ChainConfig;
pub use error::ChainError;
pub use validation::{is_chain_valid, validate_chain, ChainFailureKind, ChainValidationError};
