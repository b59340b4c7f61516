use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid transaction id: {0}")]
    InvalidTransactionId(String),

    #[error("account id must not be empty")]
    EmptyAccountId,
}
