use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use finarch_types::{AccountId, Amount, TransactionId};
use tracing::{debug, info, warn};

use crate::error::LedgerError;
use crate::records::{PostingReceipt, Transaction};
use crate::traits::{GateVerdict, LedgerReader, LedgerWriter, PostingGate, PostingObserver};

/// In-memory double-entry ledger.
///
/// All state sits behind one `RwLock`; a post holds the write lock across the
/// duplicate check, the balance computation, and the commit, so concurrent
/// posts are serialized and no partial application is ever visible.
///
/// Observers are notified in commit order: a writer takes the notification
/// lock before it releases the state lock and holds it until every observer
/// has returned.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
    notify: Mutex<()>,
    gates: Vec<Box<dyn PostingGate>>,
    observers: Vec<Box<dyn PostingObserver>>,
}

#[derive(Default)]
struct LedgerState {
    accounts: BTreeMap<AccountId, Amount>,
    openings: BTreeMap<AccountId, Amount>,
    history: Vec<Transaction>,
    index: HashMap<TransactionId, usize>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
            notify: Mutex::new(()),
            gates: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Builder-style [`Self::add_gate`].
    pub fn with_gate(mut self, gate: Box<dyn PostingGate>) -> Self {
        self.add_gate(gate);
        self
    }

    /// Builder-style [`Self::add_observer`].
    pub fn with_observer(mut self, observer: Box<dyn PostingObserver>) -> Self {
        self.add_observer(observer);
        self
    }

    /// Append a gate; gates are consulted in insertion order.
    pub fn add_gate(&mut self, gate: Box<dyn PostingGate>) {
        self.gates.push(gate);
    }

    pub fn add_observer(&mut self, observer: Box<dyn PostingObserver>) {
        self.observers.push(observer);
    }

    /// Checks that need no ledger state. A transaction without lines is
    /// balanced and posts as a no-op.
    fn check_structure(tx: &Transaction) -> Result<(), LedgerError> {
        let net = tx
            .net()
            .ok_or(LedgerError::LineSumOverflow { id: tx.id() })?;
        if !net.is_zero() {
            return Err(LedgerError::Unbalanced {
                id: tx.id(),
                imbalance: net,
            });
        }
        Ok(())
    }

    /// Run every gate; the first rejection wins, flags accumulate.
    fn run_gates(&self, tx: &Transaction) -> Result<Vec<String>, LedgerError> {
        let mut flags = Vec::new();
        for gate in &self.gates {
            match gate.screen(tx) {
                GateVerdict::Allow => {}
                GateVerdict::Flag { flags: raised } => {
                    warn!(tx = %tx.id(), gate = gate.name(), ?raised, "transaction flagged");
                    flags.extend(raised);
                }
                GateVerdict::Reject { reason } => {
                    return Err(LedgerError::GateRejected {
                        id: tx.id(),
                        gate: gate.name().to_string(),
                        reason,
                    });
                }
            }
        }
        Ok(flags)
    }

    /// Compute every touched account's new balance without mutating anything.
    fn staged_balances(
        state: &LedgerState,
        tx: &Transaction,
    ) -> Result<BTreeMap<AccountId, Amount>, LedgerError> {
        let mut staged: BTreeMap<AccountId, Amount> = BTreeMap::new();
        for line in tx.lines() {
            let current = match staged.get(&line.account) {
                Some(b) => *b,
                None => state
                    .accounts
                    .get(&line.account)
                    .copied()
                    .unwrap_or(Amount::ZERO),
            };
            let next = current
                .checked_add(line.amount)
                .ok_or_else(|| LedgerError::BalanceOverflow {
                    account: line.account.clone(),
                })?;
            staged.insert(line.account.clone(), next);
        }
        Ok(staged)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    // Called with the state write lock held. A panicking observer must not
    // fail later commits, so poisoning is ignored.
    fn notify_lock(&self) -> MutexGuard<'_, ()> {
        self.notify.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerWriter for InMemoryLedger {
    fn create_account(&self, id: &AccountId, initial_balance: Amount) -> Result<(), LedgerError> {
        let _notify = {
            let mut state = self.write()?;
            let previous = state.accounts.get(id).copied().unwrap_or(Amount::ZERO);
            let delta = initial_balance
                .checked_sub(previous)
                .ok_or_else(|| LedgerError::BalanceOverflow { account: id.clone() })?;
            let opening = state.openings.get(id).copied().unwrap_or(Amount::ZERO);
            let opening = opening
                .checked_add(delta)
                .ok_or_else(|| LedgerError::BalanceOverflow { account: id.clone() })?;

            state.openings.insert(id.clone(), opening);
            state.accounts.insert(id.clone(), initial_balance);
            self.notify_lock()
        };
        debug!(account = %id, balance = %initial_balance, "account balance set");

        for observer in &self.observers {
            observer.on_account_created(id, initial_balance);
        }
        Ok(())
    }

    fn post_transaction(&self, tx: Transaction) -> Result<PostingReceipt, LedgerError> {
        if let Err(e) = Self::check_structure(&tx) {
            warn!(tx = %tx.id(), error = %e, "transaction rejected");
            return Err(e);
        }
        let flags = match self.run_gates(&tx) {
            Ok(flags) => flags,
            Err(e) => {
                warn!(tx = %tx.id(), error = %e, "transaction rejected");
                return Err(e);
            }
        };

        let (receipt, _notify) = {
            let mut state = self.write()?;
            if state.index.contains_key(&tx.id()) {
                return Err(LedgerError::DuplicateTransaction { id: tx.id() });
            }

            let staged = Self::staged_balances(&state, &tx)?;

            // Nothing below can fail: commit.
            state.accounts.extend(staged);
            let position = state.history.len();
            state.index.insert(tx.id(), position);
            state.history.push(tx.clone());

            let receipt = PostingReceipt {
                transaction_id: tx.id(),
                sequence: (position + 1) as u64,
                flags,
            };
            (receipt, self.notify_lock())
        };

        info!(
            tx = %receipt.transaction_id,
            seq = receipt.sequence,
            lines = tx.lines().len(),
            "transaction posted"
        );

        for observer in &self.observers {
            observer.on_posted(&tx, &receipt);
        }
        Ok(receipt)
    }
}

impl LedgerReader for InMemoryLedger {
    fn balance(&self, id: &AccountId) -> Result<Option<Amount>, LedgerError> {
        Ok(self.read()?.accounts.get(id).copied())
    }

    fn balances(&self) -> Result<BTreeMap<AccountId, Amount>, LedgerError> {
        Ok(self.read()?.accounts.clone())
    }

    fn opening_balances(&self) -> Result<BTreeMap<AccountId, Amount>, LedgerError> {
        Ok(self.read()?.openings.clone())
    }

    fn history(&self) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.read()?.history.clone())
    }

    fn history_len(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.history.len())
    }

    fn transaction(&self, id: &TransactionId) -> Result<Option<Transaction>, LedgerError> {
        let state = self.read()?;
        Ok(state
            .index
            .get(id)
            .and_then(|&i| state.history.get(i))
            .cloned())
    }

    fn account_count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.accounts.len())
    }
}
