use chrono::{DateTime, Utc};
use finarch_types::{AccountId, Amount, TransactionId};
use serde::{Deserialize, Serialize};

/// One leg of a transaction: a signed amount applied to one account.
///
/// Positive amounts are debits, negative amounts are credits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLine {
    pub account: AccountId,
    pub amount: Amount,
    pub description: String,
}

impl TransactionLine {
    pub fn new(
        account: impl Into<AccountId>,
        amount: impl Into<Amount>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            amount: amount.into(),
            description: description.into(),
        }
    }
}

/// A set of lines posted to the ledger as one atomic unit.
///
/// A transaction may be built unbalanced; the zero-sum rule is enforced when
/// it is posted, not here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    created_at: DateTime<Utc>,
    lines: Vec<TransactionLine>,
}

impl Transaction {
    /// An empty transaction with a fresh id and the current time.
    pub fn new() -> Self {
        Self::with_lines(Vec::new())
    }

    pub fn with_lines(lines: Vec<TransactionLine>) -> Self {
        Self {
            id: TransactionId::new(),
            created_at: Utc::now(),
            lines,
        }
    }

    /// Two-line transfer: credits `from`, debits `to`.
    pub fn transfer(
        from: impl Into<AccountId>,
        to: impl Into<AccountId>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        let description = description.into();
        Self::new()
            .credit(from, amount, description.clone())
            .debit(to, amount, description)
    }

    /// Append a line with the amount exactly as given.
    pub fn line(
        mut self,
        account: impl Into<AccountId>,
        amount: impl Into<Amount>,
        description: impl Into<String>,
    ) -> Self {
        self.lines
            .push(TransactionLine::new(account, amount, description));
        self
    }

    /// Append a debit (positive) line of `amount`'s magnitude.
    pub fn debit(
        self,
        account: impl Into<AccountId>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        self.line(account, amount.abs(), description)
    }

    /// Append a credit (negative) line of `amount`'s magnitude.
    pub fn credit(
        self,
        account: impl Into<AccountId>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        self.line(account, -amount.abs(), description)
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn lines(&self) -> &[TransactionLine] {
        &self.lines
    }

    /// Sum of all line amounts, or `None` on overflow.
    pub fn net(&self) -> Option<Amount> {
        Amount::checked_sum(self.lines.iter().map(|l| l.amount))
    }

    /// Sum of the debit lines, saturating at [`Amount::MAX`].
    pub fn gross_volume(&self) -> Amount {
        Amount::checked_sum(
            self.lines
                .iter()
                .filter(|l| l.amount.is_debit())
                .map(|l| l.amount),
        )
        .unwrap_or(Amount::MAX)
    }

    pub fn is_balanced(&self) -> bool {
        crate::validation::is_balanced(self)
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

/// Acknowledgement returned by a successful post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostingReceipt {
    pub transaction_id: TransactionId,
    /// 1-based position of the transaction in ledger history.
    pub sequence: u64,
    /// Non-blocking flags raised by posting gates.
    pub flags: Vec<String>,
}
