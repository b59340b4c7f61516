use finarch_crypto::{canonical_json, CanonicalError, HashLinked, Sha256Hasher};
use finarch_types::{Amount, Timestamp};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ChainError;

/// A value transfer recorded on the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainPayload {
    pub sender: String,
    pub recipient: String,
    #[serde(serialize_with = "canonical_amount")]
    pub amount: Amount,
}

impl ChainPayload {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: Amount) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}

fn canonical_amount<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&amount.to_canonical_string())
}

/// A sealed block. Its own hash is derived on demand, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain.
    pub index: u64,
    pub timestamp: Timestamp,
    pub transactions: Vec<ChainPayload>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Canonical encoding: compact JSON with keys sorted at every level.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CanonicalError> {
        canonical_json(self)
    }

    /// Lowercase hex SHA-256 of the canonical encoding.
    pub fn hash(&self) -> Result<String, ChainError> {
        Ok(Sha256Hasher::hash_canonical(self)?.to_hex())
    }
}

impl HashLinked for Block {
    fn link_hash(&self) -> Result<String, CanonicalError> {
        Ok(Sha256Hasher::hash_canonical(self)?.to_hex())
    }

    fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    fn proof(&self) -> u64 {
        self.proof
    }
}

/// Hash of a block; see [`Block::hash`].
pub fn hash(block: &Block) -> Result<String, ChainError> {
    block.hash()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Block {
        Block {
            index: 2,
            timestamp: Timestamp::from_millis(1_700_000_000_000),
            transactions: vec![ChainPayload::new("a", "b", "5.50".parse().unwrap())],
            proof: 35_293,
            previous_hash: "abc".into(),
        }
    }

    #[test]
    fn canonical_form_is_pinned() {
        let bytes = sample().canonical_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"index":2,"previous_hash":"abc","proof":35293,"timestamp":1700000000000,"transactions":[{"amount":"5.5","recipient":"b","sender":"a"}]}"#
        );
    }

    #[test]
    fn hash_is_deterministic_hex() {
        let h1 = sample().hash().unwrap();
        let h2 = hash(&sample()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn equal_amounts_hash_equal_regardless_of_scale() {
        let mut other = sample();
        other.transactions[0].amount = "5.5000".parse().unwrap();
        assert_eq!(sample().hash().unwrap(), other.hash().unwrap());
    }

    #[test]
    fn any_field_change_changes_hash() {
        let base = sample().hash().unwrap();
        let mut b = sample();
        b.proof += 1;
        assert_ne!(b.hash().unwrap(), base);
        let mut b = sample();
        b.transactions[0].recipient = "c".into();
        assert_ne!(b.hash().unwrap(), base);
    }

    #[test]
    fn block_survives_json_export() {
        let json = serde_json::to_string(&sample()).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hash().unwrap(), sample().hash().unwrap());
    }
}
