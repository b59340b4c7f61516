use crate::canonical::CanonicalError;
use crate::proof::{valid_proof, Difficulty};

/// Trait for records that participate in a proof-carrying hash chain.
pub trait HashLinked {
    /// The record's own hash (hex), derived from its content.
    fn link_hash(&self) -> Result<String, CanonicalError>;
    /// The hash (hex or sentinel) of the record this one extends.
    fn previous_hash(&self) -> &str;
    /// The proof-of-work value carried by the record.
    fn proof(&self) -> u64;
}

/// Hash chain integrity verifier.
///
/// Verifies that a sequence of records forms a valid chain: for every record
/// after the first, `previous_hash` equals the hash of its predecessor and
/// `(predecessor.proof, own.proof)` satisfies the proof-of-work predicate.
/// The first record is the chain's anchor and is not checked against anything.
pub struct LinkVerifier;

impl LinkVerifier {
    /// Verify a chain, stopping at the first violation.
    pub fn verify_chain(
        records: &[impl HashLinked],
        difficulty: Difficulty,
    ) -> Result<(), LinkError> {
        for position in 1..records.len() {
            let prev = &records[position - 1];
            let current = &records[position];

            let expected = prev.link_hash().map_err(|e| LinkError {
                position: position - 1,
                failure: LinkFailure::Unhashable(e.to_string()),
            })?;
            if current.previous_hash() != expected {
                return Err(LinkError {
                    position,
                    failure: LinkFailure::BrokenLink,
                });
            }

            if !valid_proof(prev.proof(), current.proof(), difficulty) {
                return Err(LinkError {
                    position,
                    failure: LinkFailure::InvalidProof,
                });
            }
        }
        Ok(())
    }
}

/// A chain violation at a zero-based position in the verified slice.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("chain violation at position {position}: {failure}")]
pub struct LinkError {
    pub position: usize,
    pub failure: LinkFailure,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LinkFailure {
    #[error("previous hash does not match predecessor")]
    BrokenLink,

    #[error("proof does not satisfy the proof-of-work predicate")]
    InvalidProof,

    #[error("record could not be hashed: {0}")]
    Unhashable(String),
}
