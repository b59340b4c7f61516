use finarch_types::{AccountId, Amount, TransactionId};

/// Errors produced by ledger operations.
///
/// Every rejection leaves the ledger exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("transaction {id} is unbalanced: lines sum to {imbalance}")]
    Unbalanced { id: TransactionId, imbalance: Amount },

    #[error("transaction {id} is already in history")]
    DuplicateTransaction { id: TransactionId },

    #[error("transaction {id} rejected by gate '{gate}': {reason}")]
    GateRejected {
        id: TransactionId,
        gate: String,
        reason: String,
    },

    #[error("line amounts of transaction {id} overflow")]
    LineSumOverflow { id: TransactionId },

    #[error("arithmetic overflow on account {account}")]
    BalanceOverflow { account: AccountId },

    #[error("sum of account balances overflows")]
    TotalOverflow,

    #[error("ledger lock poisoned")]
    LockPoisoned,
}
