use std::sync::{Arc, Mutex, MutexGuard};

use finarch_chain::{Block, Blockchain, ChainConfig, ChainError};
use finarch_crypto::{canonical_json, CancellationFlag, ProofOutcome, ProofSearch};
use finarch_events::{AccountAggregate, EventRecorder, EventStore};
use finarch_gate::{AmlGate, AmlScreener, ScreeningRequest, ScreeningResult};
use finarch_ledger::{
    AuditIndexEntry, BalanceSheet, InMemoryLedger, LedgerReader, LedgerValidator, LedgerWriter,
    ProjectionBuilder, ReplayEngine, ReplayResult, Transaction,
};
use finarch_types::{AccountId, Amount};
use tracing::{debug, info};

use crate::config::FinArchConfig;
use crate::error::{SdkError, SdkResult};
use crate::report::{Summary, TransferReceipt, VerifyReport};

/// One ledger and one audit chain, kept in step.
///
/// Transfers hold the chain lock while they post, so the order of payloads
/// in the chain matches the order of postings in the ledger.
pub struct FinArch {
    config: FinArchConfig,
    ledger: InMemoryLedger,
    chain: Mutex<Blockchain>,
    screener: AmlScreener,
    events: Option<Arc<EventStore>>,
}

impl FinArch {
    pub fn new(config: FinArchConfig) -> SdkResult<Self> {
        config.aml.validate()?;

        let mut ledger = InMemoryLedger::new();
        if config.screening {
            ledger.add_gate(Box::new(AmlGate::new(config.aml.clone())));
        }
        let events = if config.record_events {
            let store = Arc::new(EventStore::new());
            ledger.add_observer(Box::new(EventRecorder::new(store.clone())));
            Some(store)
        } else {
            None
        };

        info!(
            difficulty = config.chain.difficulty,
            workers = config.chain.workers,
            screening = config.screening,
            events = config.record_events,
            "finarch instance created"
        );

        Ok(Self {
            chain: Mutex::new(Blockchain::with_config(config.chain.clone())),
            screener: AmlScreener::with_default_rules(config.aml.clone()),
            ledger,
            events,
            config,
        })
    }

    fn chain(&self) -> SdkResult<MutexGuard<'_, Blockchain>> {
        self.chain
            .lock()
            .map_err(|_| SdkError::Internal("chain lock poisoned".into()))
    }

    // ---- Ledger operations ----

    /// Create `id` with `initial_balance`, overwriting any prior balance.
    pub fn open_account(&self, id: impl Into<AccountId>, initial_balance: Amount) -> SdkResult<()> {
        self.ledger.create_account(&id.into(), initial_balance)?;
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// The posting is committed to the ledger first; only on success is a
    /// payload queued for the next block.
    pub fn transfer(
        &self,
        from: impl Into<AccountId>,
        to: impl Into<AccountId>,
        amount: Amount,
        description: impl Into<String>,
    ) -> SdkResult<TransferReceipt> {
        if !amount.is_debit() {
            return Err(SdkError::InvalidOperation(format!(
                "transfer amount must be positive, got {amount}"
            )));
        }
        let (from, to) = (from.into(), to.into());
        let tx = Transaction::transfer(from.clone(), to.clone(), amount, description);

        let mut chain = self.chain()?;
        let receipt = self.ledger.post_transaction(tx)?;
        let block_index = chain.new_transaction(from.as_str(), to.as_str(), amount);
        debug!(tx = %receipt.transaction_id, block = block_index, "transfer queued for sealing");

        Ok(TransferReceipt {
            transaction_id: receipt.transaction_id,
            sequence: receipt.sequence,
            flags: receipt.flags,
            block_index,
        })
    }

    pub fn balance(&self, id: &AccountId) -> SdkResult<Option<Amount>> {
        Ok(self.ledger.balance(id)?)
    }

    pub fn balance_sheet(&self) -> SdkResult<BalanceSheet> {
        Ok(ProjectionBuilder::balance_sheet(&self.ledger)?)
    }

    pub fn audit_index(&self) -> SdkResult<Vec<AuditIndexEntry>> {
        Ok(ProjectionBuilder::audit_index(&self.ledger)?)
    }

    /// Recompute balances from opening balances and history.
    pub fn replay(&self) -> SdkResult<ReplayResult> {
        Ok(ReplayEngine::replay_ledger(&self.ledger)?)
    }

    // ---- Chain operations ----

    /// Mine a proof and seal all pending payloads.
    pub fn seal_block(&self) -> SdkResult<Block> {
        self.seal_block_cancellable(&CancellationFlag::new())
    }

    /// [`Self::seal_block`], giving up when `cancel` is raised.
    ///
    /// The proof search runs without the chain lock, so transfers keep
    /// queueing meanwhile and land in the sealed block. If another seal
    /// advanced the chain during the search, the search restarts from the
    /// new tip.
    pub fn seal_block_cancellable(&self, cancel: &CancellationFlag) -> SdkResult<Block> {
        loop {
            let (height, last_proof, search) = {
                let chain = self.chain()?;
                let config = chain.config();
                let search = ProofSearch::new(config.difficulty()).with_workers(config.workers);
                (chain.len(), chain.last_block().proof, search)
            };

            let proof = match search.run(last_proof, cancel) {
                ProofOutcome::Found(proof) => proof,
                ProofOutcome::Cancelled => return Err(ChainError::Cancelled.into()),
                ProofOutcome::Exhausted => {
                    return Err(ChainError::ProofSpaceExhausted { last_proof }.into())
                }
            };

            let mut chain = self.chain()?;
            if chain.len() == height {
                return Ok(chain.new_block(proof, None)?.clone());
            }
            debug!(height, last_proof, "chain advanced during proof search, retrying");
        }
    }

    pub fn blocks(&self) -> SdkResult<Vec<Block>> {
        Ok(self.chain()?.blocks().to_vec())
    }

    pub fn pending_payloads(&self) -> SdkResult<usize> {
        Ok(self.chain()?.pending().len())
    }

    /// Blocks as canonical JSON, the same encoding their hashes cover.
    pub fn export_chain(&self) -> SdkResult<Vec<u8>> {
        let chain = self.chain()?;
        Ok(canonical_json(chain.blocks())?)
    }

    /// Rebuild a chain from an export without validating it.
    pub fn restore_chain(json: &[u8], config: ChainConfig) -> SdkResult<Blockchain> {
        let blocks: Vec<Block> = serde_json::from_slice(json)?;
        Ok(Blockchain::restore(config, blocks)?)
    }

    // ---- Screening and events ----

    /// Screen a transfer without touching the ledger.
    pub fn screen(&self, request: &ScreeningRequest) -> SdkResult<ScreeningResult> {
        Ok(self.screener.screen(request)?)
    }

    pub fn events(&self) -> Option<&Arc<EventStore>> {
        self.events.as_ref()
    }

    /// Fold the recorded events of one account.
    pub fn rebuild_account(&self, id: &AccountId) -> SdkResult<AccountAggregate> {
        let store = self.events.as_ref().ok_or_else(|| {
            SdkError::InvalidOperation("event recording is disabled".into())
        })?;
        let events = store.events_for(id.as_str())?;
        Ok(AccountAggregate::from_events(id.as_str(), &events)?)
    }

    // ---- Integrity ----

    pub fn verify(&self) -> SdkResult<VerifyReport> {
        let chain = self.chain()?.validate().err();
        let ledger = LedgerValidator::validate(&self.ledger)?;
        info!(
            chain_valid = chain.is_none(),
            ledger_valid = ledger.is_valid(),
            "integrity verified"
        );
        Ok(VerifyReport { chain, ledger })
    }

    pub fn summary(&self) -> SdkResult<Summary> {
        let chain = self.chain()?;
        Ok(Summary {
            accounts: self.ledger.account_count()?,
            transactions: self.ledger.history_len()?,
            total_balance: self.ledger.total_balance()?,
            blocks: chain.len(),
            pending_payloads: chain.pending().len(),
            last_proof: chain.last_block().proof,
            difficulty: self.config.chain.difficulty,
            events: match &self.events {
                Some(store) => Some(store.len()?),
                None => None,
            },
        })
    }

    pub fn config(&self) -> &FinArchConfig {
        &self.config
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> FinArch {
        FinArch::new(FinArchConfig {
            chain: ChainConfig::fast(),
            ..FinArchConfig::full()
        })
        .unwrap()
    }

    #[test]
    fn transfer_posts_then_queues() {
        let fa = fast();
        fa.open_account("RESERVE", Amount::from(1000)).unwrap();
        let receipt = fa.transfer("RESERVE", "WALLET", Amount::from(200), "fund").unwrap();
        assert_eq!(receipt.sequence, 1);
        assert_eq!(receipt.block_index, 2);
        assert_eq!(fa.pending_payloads().unwrap(), 1);
        assert_eq!(fa.balance(&"WALLET".into()).unwrap(), Some(Amount::from(200)));
    }

    #[test]
    fn rejected_transfer_queues_nothing() {
        let fa = fast();
        let err = fa.transfer("A", "B", Amount::from(150_000), "big").unwrap_err();
        assert!(matches!(err, SdkError::Ledger(_)));
        assert_eq!(fa.pending_payloads().unwrap(), 0);
        assert_eq!(fa.summary().unwrap().transactions, 0);
    }

    #[test]
    fn non_positive_transfer_is_invalid() {
        let fa = fast();
        assert!(matches!(
            fa.transfer("A", "B", Amount::ZERO, "nothing"),
            Err(SdkError::InvalidOperation(_))
        ));
        assert!(matches!(
            fa.transfer("A", "B", Amount::from(-5), "backwards"),
            Err(SdkError::InvalidOperation(_))
        ));
    }

    #[test]
    fn sealing_drains_pending() {
        let fa = fast();
        fa.transfer("A", "B", Amount::from(1), "t").unwrap();
        fa.transfer("B", "C", Amount::from(1), "t").unwrap();
        let block = fa.seal_block().unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(fa.pending_payloads().unwrap(), 0);
        assert!(fa.verify().unwrap().is_valid());
    }

    #[test]
    fn cancelled_seal_keeps_pending() {
        let fa = FinArch::new(FinArchConfig {
            chain: ChainConfig {
                difficulty: 64,
                ..ChainConfig::default()
            },
            ..FinArchConfig::default()
        })
        .unwrap();
        fa.transfer("A", "B", Amount::from(1), "t").unwrap();
        let flag = CancellationFlag::new();
        flag.cancel();
        assert!(fa.seal_block_cancellable(&flag).is_err());
        assert_eq!(fa.pending_payloads().unwrap(), 1);
        assert_eq!(fa.blocks().unwrap().len(), 1);
    }

    #[test]
    fn transfers_proceed_while_a_seal_is_searching() {
        let fa = FinArch::new(FinArchConfig {
            chain: ChainConfig {
                difficulty: 64,
                ..ChainConfig::default()
            },
            ..FinArchConfig::default()
        })
        .unwrap();
        let flag = CancellationFlag::new();

        std::thread::scope(|scope| {
            let sealer = scope.spawn(|| fa.seal_block_cancellable(&flag));
            std::thread::sleep(std::time::Duration::from_millis(20));
            let receipt = fa.transfer("A", "B", Amount::from(3), "t").unwrap();
            assert_eq!(receipt.block_index, 2);
            flag.cancel();
            assert!(matches!(
                sealer.join().unwrap(),
                Err(SdkError::Chain(ChainError::Cancelled))
            ));
        });

        assert_eq!(fa.pending_payloads().unwrap(), 1);
        assert_eq!(fa.blocks().unwrap().len(), 1);
    }

    #[test]
    fn seal_includes_transfers_queued_before_it_locks() {
        let fa = fast();
        fa.transfer("A", "B", Amount::from(2), "t").unwrap();
        let block = fa.seal_block().unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 1);
        assert!(fa.verify().unwrap().is_valid());
    }

    #[test]
    fn events_disabled_by_default() {
        let fa = FinArch::new(FinArchConfig::default()).unwrap();
        assert!(fa.events().is_none());
        assert!(fa.summary().unwrap().events.is_none());
        assert!(matches!(
            fa.rebuild_account(&"A".into()),
            Err(SdkError::InvalidOperation(_))
        ));
    }

    #[test]
    fn invalid_aml_config_is_refused() {
        let mut config = FinArchConfig::default();
        config.aml.structuring_floor = Amount::from(20_000);
        assert!(matches!(FinArch::new(config), Err(SdkError::Gate(_))));
    }
}
