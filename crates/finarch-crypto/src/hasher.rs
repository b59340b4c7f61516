use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical::{canonical_json, CanonicalError};
use crate::digest::Sha256Digest;

/// SHA-256 content hasher.
///
/// No domain tag is mixed in: digests must match any other implementation
/// that hashes the same canonical bytes.
pub struct Sha256Hasher;

impl Sha256Hasher {
    /// Hash raw bytes.
    pub fn hash(data: &[u8]) -> Sha256Digest {
        Sha256Digest::from_bytes(Sha256::digest(data).into())
    }

    /// Hash raw bytes and return the lowercase hex digest.
    pub fn hash_hex(data: &[u8]) -> String {
        Self::hash(data).to_hex()
    }

    /// Hash the canonical JSON encoding of a value.
    pub fn hash_canonical<T: Serialize + ?Sized>(value: &T) -> Result<Sha256Digest, CanonicalError> {
        let bytes = canonical_json(value)?;
        Ok(Self::hash(&bytes))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(data: &[u8], expected: &Sha256Digest) -> bool {
        Self::hash(data) == *expected
    }
}
