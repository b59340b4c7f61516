use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] finarch_ledger::LedgerError),

    #[error("chain error: {0}")]
    Chain(#[from] finarch_chain::ChainError),

    #[error("chain invalid: {0}")]
    ChainInvalid(#[from] finarch_chain::ChainValidationError),

    #[error("screening error: {0}")]
    Gate(#[from] finarch_gate::GateError),

    #[error("encoding error: {0}")]
    Encoding(#[from] finarch_crypto::CanonicalError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("event error: {0}")]
    Events(#[from] finarch_events::EventError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
