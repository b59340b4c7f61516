use finarch_crypto::{valid_proof, CancellationFlag, ProofOutcome, ProofSearch};
use finarch_types::{Amount, Timestamp};
use tracing::{debug, info, warn};

use crate::block::{Block, ChainPayload};
use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::validation::{validate_chain, ChainValidationError};

/// An owned proof-of-work chain and its pending payload buffer.
///
/// The chain always holds at least the genesis block.
#[derive(Clone, Debug)]
pub struct Blockchain {
    config: ChainConfig,
    blocks: Vec<Block>,
    pending: Vec<ChainPayload>,
}

impl Blockchain {
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    pub fn with_config(config: ChainConfig) -> Self {
        let genesis = Block {
            index: 1,
            timestamp: Timestamp::now(),
            transactions: Vec::new(),
            proof: config.genesis_proof,
            previous_hash: config.genesis_previous_hash.clone(),
        };
        debug!(proof = genesis.proof, "genesis block created");
        Self {
            config,
            blocks: vec![genesis],
            pending: Vec::new(),
        }
    }

    /// Adopt previously exported blocks without validating them.
    ///
    /// Call [`Self::validate`] to check the result.
    pub fn restore(config: ChainConfig, blocks: Vec<Block>) -> Result<Self, ChainError> {
        if blocks.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        Ok(Self {
            config,
            blocks,
            pending: Vec::new(),
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Queue a payload for the next block; returns that block's index.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: Amount,
    ) -> u64 {
        self.pending.push(ChainPayload::new(sender, recipient, amount));
        let next = self.last_block().index + 1;
        debug!(pending = self.pending.len(), block = next, "payload queued");
        next
    }

    /// Seal every pending payload into a new block.
    ///
    /// `previous_hash` defaults to the hash of the current last block. The
    /// proof is stored as given; use [`Self::mine`] to search for one.
    pub fn new_block(
        &mut self,
        proof: u64,
        previous_hash: Option<String>,
    ) -> Result<&Block, ChainError> {
        let previous_hash = match previous_hash {
            Some(h) => h,
            None => self.last_block().hash()?,
        };
        let block = Block {
            index: self.blocks.len() as u64 + 1,
            timestamp: Timestamp::now(),
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        info!(
            index = block.index,
            proof,
            payloads = block.transactions.len(),
            "block sealed"
        );
        self.blocks.push(block);
        Ok(self.last_block())
    }

    pub fn last_block(&self) -> &Block {
        // Never empty: construction inserts genesis and `restore` rejects empty input.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pending(&self) -> &[ChainPayload] {
        &self.pending
    }

    /// Number of sealed blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn search(&self, workers: usize) -> ProofSearch {
        ProofSearch::new(self.config.difficulty()).with_workers(workers)
    }

    /// Lowest proof `p` such that `valid_proof(last_proof, p)` holds.
    pub fn proof_of_work(&self, last_proof: u64) -> Result<u64, ChainError> {
        match self.search(1).run(last_proof, &CancellationFlag::new()) {
            ProofOutcome::Found(proof) => Ok(proof),
            ProofOutcome::Cancelled => Err(ChainError::Cancelled),
            ProofOutcome::Exhausted => Err(ChainError::ProofSpaceExhausted { last_proof }),
        }
    }

    /// Sequential search that stops early once `cancel` is raised.
    pub fn proof_of_work_cancellable(
        &self,
        last_proof: u64,
        cancel: &CancellationFlag,
    ) -> ProofOutcome {
        self.search(1).run(last_proof, cancel)
    }

    /// Search across `workers` threads; the result equals the sequential one.
    pub fn proof_of_work_parallel(
        &self,
        last_proof: u64,
        workers: usize,
        cancel: &CancellationFlag,
    ) -> ProofOutcome {
        self.search(workers).run(last_proof, cancel)
    }

    pub fn valid_proof(&self, last_proof: u64, proof: u64) -> bool {
        valid_proof(last_proof, proof, self.config.difficulty())
    }

    /// Find the next proof and seal the pending payloads with it.
    pub fn mine(&mut self) -> Result<&Block, ChainError> {
        self.mine_cancellable(&CancellationFlag::new())
    }

    /// [`Self::mine`] using the configured worker count; the chain is left
    /// unchanged if `cancel` fires first.
    pub fn mine_cancellable(&mut self, cancel: &CancellationFlag) -> Result<&Block, ChainError> {
        let last_proof = self.last_block().proof;
        match self.proof_of_work_parallel(last_proof, self.config.workers, cancel) {
            ProofOutcome::Found(proof) => self.new_block(proof, None),
            ProofOutcome::Cancelled => {
                warn!(last_proof, pending = self.pending.len(), "mining cancelled");
                Err(ChainError::Cancelled)
            }
            ProofOutcome::Exhausted => Err(ChainError::ProofSpaceExhausted { last_proof }),
        }
    }

    pub fn validate(&self) -> Result<(), ChainValidationError> {
        validate_chain(&self.blocks, self.config.difficulty())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ChainFailureKind;

    fn fast() -> Blockchain {
        Blockchain::with_config(ChainConfig::fast())
    }

    #[test]
    fn starts_with_genesis() {
        let chain = Blockchain::new();
        assert_eq!(chain.len(), 1);
        let genesis = chain.last_block();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, 100);
        assert_eq!(genesis.previous_hash, "1");
        assert!(genesis.transactions.is_empty());
        assert!(chain.pending().is_empty());
    }

    #[test]
    fn two_payloads_then_mine() {
        let mut chain = fast();
        assert_eq!(chain.new_transaction("alice", "bob", Amount::from(50)), 2);
        assert_eq!(chain.new_transaction("bob", "carol", Amount::from(25)), 2);

        let genesis_hash = chain.last_block().hash().unwrap();
        let block = chain.mine().unwrap().clone();

        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.transactions[0].sender, "alice");
        assert_eq!(block.previous_hash, genesis_hash);
        assert!(chain.valid_proof(100, block.proof));
        assert!(chain.pending().is_empty());
        assert!(chain.is_valid());
        assert_eq!(chain.new_transaction("x", "y", Amount::from(1)), 3);
    }

    #[test]
    fn two_payloads_sealed_with_genesis_proof_at_default_difficulty() {
        let mut chain = Blockchain::new();
        chain.new_transaction("alice", "bob", Amount::from(50));
        chain.new_transaction("bob", "carol", Amount::from(25));

        let genesis = chain.last_block().clone();
        let proof = chain.proof_of_work(genesis.proof).unwrap();
        assert_eq!(proof, 35_293);

        let block = chain.new_block(proof, None).unwrap().clone();
        assert_eq!(block.index, 2);
        assert_eq!(block.proof, proof);
        assert_eq!(block.previous_hash, genesis.hash().unwrap());
        assert_eq!(block.transactions.len(), 2);
        assert!(chain.pending().is_empty());
        assert!(chain.is_valid());
    }

    #[test]
    fn proof_of_work_is_first_fit() {
        let chain = fast();
        let proof = chain.proof_of_work(100).unwrap();
        assert!(chain.valid_proof(100, proof));
        assert!((0..proof).all(|p| !chain.valid_proof(100, p)));
    }

    #[test]
    fn parallel_search_matches_sequential() {
        let chain = fast();
        let flag = CancellationFlag::new();
        for last in [100u64, 7, 35_293] {
            let seq = chain.proof_of_work(last).unwrap();
            for workers in [2, 3, 8] {
                assert_eq!(
                    chain.proof_of_work_parallel(last, workers, &flag),
                    ProofOutcome::Found(seq)
                );
            }
        }
    }

    #[test]
    fn cancelled_search_reports_cancelled() {
        let chain = Blockchain::with_config(ChainConfig {
            difficulty: 64,
            ..ChainConfig::default()
        });
        let flag = CancellationFlag::new();
        flag.cancel();
        assert_eq!(
            chain.proof_of_work_cancellable(100, &flag),
            ProofOutcome::Cancelled
        );
        assert_eq!(
            chain.proof_of_work_parallel(100, 4, &flag),
            ProofOutcome::Cancelled
        );
    }

    #[test]
    fn cancelled_mining_leaves_chain_unchanged() {
        let mut chain = Blockchain::with_config(ChainConfig {
            difficulty: 64,
            ..ChainConfig::default()
        });
        chain.new_transaction("a", "b", Amount::from(1));
        let flag = CancellationFlag::new();
        flag.cancel();
        assert!(matches!(chain.mine_cancellable(&flag), Err(ChainError::Cancelled)));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.pending().len(), 1);
    }

    #[test]
    fn new_block_stores_proof_unchecked() {
        let mut chain = fast();
        let bad = (0..).find(|p| !chain.valid_proof(100, *p)).unwrap();
        chain.new_block(bad, None).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain.validate().unwrap_err().kind,
            ChainFailureKind::InvalidProof
        );
    }

    #[test]
    fn explicit_previous_hash_is_kept() {
        let mut chain = fast();
        let block = chain.new_block(5, Some("deadbeef".into())).unwrap();
        assert_eq!(block.previous_hash, "deadbeef");
        assert_eq!(chain.validate().unwrap_err().index, 2);
    }

    #[test]
    fn restore_round_trips_export() {
        let mut chain = fast();
        chain.new_transaction("a", "b", Amount::from(3));
        chain.mine().unwrap();
        let json = serde_json::to_string(chain.blocks()).unwrap();
        let blocks: Vec<Block> = serde_json::from_str(&json).unwrap();
        let restored = Blockchain::restore(ChainConfig::fast(), blocks).unwrap();
        assert!(restored.is_valid());
        assert_eq!(restored.len(), 2);
        assert!(matches!(
            Blockchain::restore(ChainConfig::fast(), Vec::new()),
            Err(ChainError::EmptyChain)
        ));
    }
}
