use finarch_chain::ChainValidationError;
use finarch_ledger::ValidationReport;
use finarch_types::{Amount, TransactionId};
use serde::Serialize;

/// Result of a successful [`FinArch::transfer`](crate::FinArch::transfer).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub transaction_id: TransactionId,
    /// 1-based position in ledger history.
    pub sequence: u64,
    /// Screening flags raised on the posting.
    pub flags: Vec<String>,
    /// Index of the block the chain payload will be sealed into.
    pub block_index: u64,
}

/// Point-in-time overview of an instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub accounts: usize,
    pub transactions: usize,
    pub total_balance: Amount,
    pub blocks: usize,
    pub pending_payloads: usize,
    pub last_proof: u64,
    pub difficulty: u8,
    /// `None` when event recording is off.
    pub events: Option<usize>,
}

/// Combined integrity check of chain and ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyReport {
    /// First invalid block, if any.
    pub chain: Option<ChainValidationError>,
    pub ledger: ValidationReport,
}

impl VerifyReport {
    pub fn is_valid(&self) -> bool {
        self.chain.is_none() && self.ledger.is_valid()
    }
}
