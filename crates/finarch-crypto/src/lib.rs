//! Cryptographic primitives for FinArch.
//!
//! Provides SHA-256 content hashing over a canonical JSON encoding, the
//! proof-of-work predicate with a cancellable (optionally parallel) search,
//! and a generic verifier for hash-linked sequences.
//!
//! All hashing wraps the `sha2` crate.

pub mod canonical;
pub mod digest;
pub mod hasher;
pub mod link;
pub mod proof;

pub use canonical::{canonical_json, CanonicalError};
pub use digest::Sha256Digest;
pub use hasher::Sha256Hasher;
pub use link::{HashLinked, LinkError, LinkFailure, LinkVerifier};
pub use proof::{
    valid_proof, CancellationFlag, Difficulty, ProofOutcome, ProofSearch, DEFAULT_DIFFICULTY,
};
