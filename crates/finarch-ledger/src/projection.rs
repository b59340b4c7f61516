use chrono::{DateTime, Utc};
use finarch_types::{AccountId, Amount, TransactionId};
use serde::Serialize;

use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// One account's balance in a [`BalanceSheet`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceRow {
    pub account: AccountId,
    pub balance: Amount,
}

/// Point-in-time balances, ordered by account id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceSheet {
    pub rows: Vec<BalanceRow>,
    pub total: Amount,
    /// Sum of opening balances; equals `total` on a healthy ledger.
    pub opening_total: Amount,
}

impl BalanceSheet {
    pub fn is_conserved(&self) -> bool {
        self.total == self.opening_total
    }
}

/// Row in the audit index for compliance/audit workflows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditIndexEntry {
    pub sequence: u64,
    pub transaction_id: TransactionId,
    pub created_at: DateTime<Utc>,
    pub line_count: usize,
    pub gross_volume: Amount,
    pub summary: String,
}

/// Deterministic projection builders.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    pub fn balance_sheet<R: LedgerReader>(reader: &R) -> Result<BalanceSheet, LedgerError> {
        let balances = reader.balances()?;
        let opening_total = Amount::checked_sum(reader.opening_balances()?.values().copied())
            .ok_or(LedgerError::TotalOverflow)?;
        let total =
            Amount::checked_sum(balances.values().copied()).ok_or(LedgerError::TotalOverflow)?;
        let rows = balances
            .into_iter()
            .map(|(account, balance)| BalanceRow { account, balance })
            .collect();

        Ok(BalanceSheet {
            rows,
            total,
            opening_total,
        })
    }

    pub fn audit_index<R: LedgerReader>(reader: &R) -> Result<Vec<AuditIndexEntry>, LedgerError> {
        let history = reader.history()?;
        Ok(history
            .iter()
            .enumerate()
            .map(|(i, tx)| {
                let summary = tx
                    .lines()
                    .iter()
                    .map(|l| format!("{} {}", l.account, l.amount))
                    .collect::<Vec<_>>()
                    .join(", ");
                AuditIndexEntry {
                    sequence: (i + 1) as u64,
                    transaction_id: tx.id(),
                    created_at: tx.created_at(),
                    line_count: tx.lines().len(),
                    gross_volume: tx.gross_volume(),
                    summary,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;
    use crate::records::Transaction;
    use crate::traits::LedgerWriter;

    fn seeded() -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        ledger.create_account(&"RESERVE".into(), Amount::from(1000)).unwrap();
        ledger.create_account(&"WALLET".into(), Amount::ZERO).unwrap();
        ledger
            .post_transaction(Transaction::transfer("RESERVE", "WALLET", Amount::from(200), "fund"))
            .unwrap();
        ledger
            .post_transaction(Transaction::transfer("WALLET", "SHOP", Amount::from(50), "buy"))
            .unwrap();
        ledger
    }

    #[test]
    fn balance_sheet_is_sorted_and_conserved() {
        let sheet = ProjectionBuilder::balance_sheet(&seeded()).unwrap();
        let names: Vec<&str> = sheet.rows.iter().map(|r| r.account.as_str()).collect();
        assert_eq!(names, vec!["RESERVE", "SHOP", "WALLET"]);
        assert_eq!(sheet.total, Amount::from(1000));
        assert!(sheet.is_conserved());
    }

    #[test]
    fn audit_index_follows_posting_order() {
        let index = ProjectionBuilder::audit_index(&seeded()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[0].sequence, 1);
        assert_eq!(index[1].sequence, 2);
        assert_eq!(index[0].gross_volume, Amount::from(200));
        assert_eq!(index[1].line_count, 2);
        assert!(index[1].summary.contains("SHOP 50"));
    }

    #[test]
    fn empty_ledger_projects_empty() {
        let ledger = InMemoryLedger::new();
        let sheet = ProjectionBuilder::balance_sheet(&ledger).unwrap();
        assert!(sheet.rows.is_empty());
        assert_eq!(sheet.total, Amount::ZERO);
        assert!(ProjectionBuilder::audit_index(&ledger).unwrap().is_empty());
    }
}
