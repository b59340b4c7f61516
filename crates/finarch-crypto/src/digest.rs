use std::fmt;

use serde::{Deserialize, Serialize};

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sha256Digest([u8; 32]);

impl Sha256Digest {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Number of leading `'0'` characters in the hex encoding.
    pub fn leading_zero_nibbles(&self) -> u32 {
        let mut count = 0;
        for byte in self.0 {
            if byte == 0 {
                count += 2;
                continue;
            }
            if byte >> 4 == 0 {
                count += 1;
            }
            break;
        }
        count
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.short_hex())
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for Sha256Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let d = Sha256Digest::from_bytes([0xab; 32]);
        assert_eq!(Sha256Digest::from_hex(&d.to_hex()), Some(d));
        assert_eq!(d.to_hex().len(), 64);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(Sha256Digest::from_hex("abcd").is_none());
        assert!(Sha256Digest::from_hex("zz").is_none());
    }

    #[test]
    fn leading_zero_nibbles_counts_hex_zeros() {
        let mut bytes = [0xff; 32];
        assert_eq!(Sha256Digest::from_bytes(bytes).leading_zero_nibbles(), 0);
        bytes[0] = 0x0f;
        assert_eq!(Sha256Digest::from_bytes(bytes).leading_zero_nibbles(), 1);
        bytes[0] = 0x00;
        bytes[1] = 0x00;
        bytes[2] = 0x1f;
        assert_eq!(Sha256Digest::from_bytes(bytes).leading_zero_nibbles(), 4);
        assert_eq!(Sha256Digest::from_bytes([0; 32]).leading_zero_nibbles(), 64);
    }

    #[test]
    fn leading_zero_nibbles_matches_hex_prefix() {
        let mut bytes = [0x12; 32];
        bytes[0] = 0x00;
        bytes[1] = 0x03;
        let d = Sha256Digest::from_bytes(bytes);
        let hex = d.to_hex();
        let prefix = hex.chars().take_while(|c| *c == '0').count() as u32;
        assert_eq!(d.leading_zero_nibbles(), prefix);
    }
}
