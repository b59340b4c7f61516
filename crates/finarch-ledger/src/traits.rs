use std::collections::BTreeMap;

use finarch_types::{AccountId, Amount, TransactionId};

use crate::error::LedgerError;
use crate::records::{PostingReceipt, Transaction};

/// Write boundary for ledger mutations.
pub trait LedgerWriter: Send + Sync {
    /// Set an account's balance, creating the account if needed.
    ///
    /// Overwrites any prior balance; repeated calls are not additive.
    fn create_account(&self, id: &AccountId, initial_balance: Amount) -> Result<(), LedgerError>;

    /// Open an account with a zero balance.
    fn open_account(&self, id: &AccountId) -> Result<(), LedgerError> {
        self.create_account(id, Amount::ZERO)
    }

    /// Atomically apply a balanced transaction and append it to history.
    fn post_transaction(&self, tx: Transaction) -> Result<PostingReceipt, LedgerError>;
}

/// Read boundary for ledger queries.
pub trait LedgerReader: Send + Sync {
    fn balance(&self, id: &AccountId) -> Result<Option<Amount>, LedgerError>;

    /// All balances, ordered by account id.
    fn balances(&self) -> Result<BTreeMap<AccountId, Amount>, LedgerError>;

    /// Net amount introduced per account through `create_account`.
    ///
    /// For an account opened once before any posting this is its initial
    /// balance. Replaying history on top of these yields the live balances.
    fn opening_balances(&self) -> Result<BTreeMap<AccountId, Amount>, LedgerError>;

    /// Posted transactions in posting order.
    fn history(&self) -> Result<Vec<Transaction>, LedgerError>;

    fn history_len(&self) -> Result<usize, LedgerError>;

    fn transaction(&self, id: &TransactionId) -> Result<Option<Transaction>, LedgerError>;

    fn account_count(&self) -> Result<usize, LedgerError> {
        Ok(self.balances()?.len())
    }

    /// Sum of every account balance.
    fn total_balance(&self) -> Result<Amount, LedgerError> {
        Amount::checked_sum(self.balances()?.values().copied()).ok_or(LedgerError::TotalOverflow)
    }
}

/// Decision of a posting gate about one transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateVerdict {
    /// Post normally.
    Allow,
    /// Post, but attach these flags to the receipt.
    Flag { flags: Vec<String> },
    /// Refuse the post; the ledger is left untouched.
    Reject { reason: String },
}

/// Screening hook consulted before a transaction is applied.
///
/// Gates run after the structural checks (non-empty, balanced) and before the
/// ledger is locked for writing.
pub trait PostingGate: Send + Sync {
    fn name(&self) -> &str;

    fn screen(&self, tx: &Transaction) -> GateVerdict;
}

/// Notification hook called after a mutation has been committed.
///
/// Observers run outside the state lock, in commit order, and cannot undo
/// the mutation. They must not call back into the ledger that notifies them.
pub trait PostingObserver: Send + Sync {
    fn on_account_created(&self, _id: &AccountId, _balance: Amount) {}

    fn on_posted(&self, tx: &Transaction, receipt: &PostingReceipt);
}
