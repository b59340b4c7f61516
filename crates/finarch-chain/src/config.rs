use finarch_crypto::{Difficulty, DEFAULT_DIFFICULTY};
use serde::{Deserialize, Serialize};

/// Configuration for a [`Blockchain`](crate::Blockchain).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Leading zero hex characters a proof digest must carry.
    pub difficulty: u8,
    /// Proof stored in the genesis block.
    pub genesis_proof: u64,
    /// Previous-hash sentinel stored in the genesis block.
    pub genesis_previous_hash: String,
    /// Threads used by the proof search; 1 searches on the calling thread.
    pub workers: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            genesis_proof: 100,
            genesis_previous_hash: "1".to_string(),
            workers: 1,
        }
    }
}

impl ChainConfig {
    pub fn difficulty(&self) -> Difficulty {
        Difficulty::new(self.difficulty)
    }

    /// Low difficulty for tests and demos.
    pub fn fast() -> Self {
        Self {
            difficulty: 2,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ChainConfig::default();
        assert_eq!(config.difficulty().zeros(), 4);
        assert_eq!(config.genesis_proof, 100);
        assert_eq!(config.genesis_previous_hash, "1");
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ChainConfig = serde_json::from_str(r#"{"workers":4}"#).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.genesis_proof, 100);
    }
}
