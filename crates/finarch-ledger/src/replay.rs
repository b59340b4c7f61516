use std::collections::BTreeMap;

use finarch_types::{AccountId, Amount};

use crate::error::LedgerError;
use crate::records::Transaction;
use crate::traits::LedgerReader;

/// Balances rebuilt from opening balances and history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub applied_transactions: u64,
    pub balances: BTreeMap<AccountId, Amount>,
}

/// Deterministic replay of ledger history.
pub struct ReplayEngine;

impl ReplayEngine {
    /// Apply `history` in order on top of `openings`.
    ///
    /// Accounts referenced only by lines start at zero, matching implicit
    /// creation at post time.
    pub fn replay(
        openings: &BTreeMap<AccountId, Amount>,
        history: &[Transaction],
    ) -> Result<ReplayResult, LedgerError> {
        let mut balances = openings.clone();
        for tx in history {
            for line in tx.lines() {
                let balance = balances.entry(line.account.clone()).or_insert(Amount::ZERO);
                *balance = balance
                    .checked_add(line.amount)
                    .ok_or_else(|| LedgerError::BalanceOverflow {
                        account: line.account.clone(),
                    })?;
            }
        }
        Ok(ReplayResult {
            applied_transactions: history.len() as u64,
            balances,
        })
    }

    /// Replay everything a reader holds.
    pub fn replay_ledger<R: LedgerReader>(reader: &R) -> Result<ReplayResult, LedgerError> {
        Self::replay(&reader.opening_balances()?, &reader.history()?)
    }

    /// Whether replay reproduces the reader's live balances.
    pub fn verify_convergence<R: LedgerReader>(reader: &R) -> Result<bool, LedgerError> {
        Ok(Self::replay_ledger(reader)?.balances == reader.balances()?)
    }
}
