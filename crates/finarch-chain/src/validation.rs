use finarch_crypto::{Difficulty, LinkError, LinkFailure, LinkVerifier};

use crate::block::Block;

/// Why a block failed validation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChainFailureKind {
    #[error("previous_hash does not match the hash of the preceding block")]
    BrokenLink,

    #[error("proof does not satisfy the proof-of-work predicate")]
    InvalidProof,

    #[error("preceding block could not be hashed: {0}")]
    Unhashable(String),
}

/// The first invalid block of a chain.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("block {index} is invalid: {kind}")]
pub struct ChainValidationError {
    /// 1-based position of the offending block.
    pub index: usize,
    pub kind: ChainFailureKind,
}

impl From<LinkError> for ChainValidationError {
    fn from(err: LinkError) -> Self {
        let kind = match err.failure {
            LinkFailure::BrokenLink => ChainFailureKind::BrokenLink,
            LinkFailure::InvalidProof => ChainFailureKind::InvalidProof,
            LinkFailure::Unhashable(reason) => ChainFailureKind::Unhashable(reason),
        };
        Self {
            index: err.position + 1,
            kind,
        }
    }
}

/// Check every link and every proof, reporting the first failure.
///
/// Empty and genesis-only chains are valid.
pub fn validate_chain(blocks: &[Block], difficulty: Difficulty) -> Result<(), ChainValidationError> {
    LinkVerifier::verify_chain(blocks, difficulty).map_err(ChainValidationError::from)
}

pub fn is_chain_valid(blocks: &[Block], difficulty: Difficulty) -> bool {
    validate_chain(blocks, difficulty).is_ok()
}
