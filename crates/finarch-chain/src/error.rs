use finarch_crypto::CanonicalError;

/// Errors that can occur while building or checking the chain.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("block could not be hashed: {0}")]
    Hash(#[from] CanonicalError),

    #[error("proof search cancelled")]
    Cancelled,

    #[error("no proof found for last proof {last_proof}")]
    ProofSpaceExhausted { last_proof: u64 },

    #[error("a chain needs at least a genesis block")]
    EmptyChain,
}
