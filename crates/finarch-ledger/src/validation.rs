use finarch_types::{Amount, TransactionId};

use crate::error::LedgerError;
use crate::records::Transaction;
use crate::replay::ReplayEngine;
use crate::traits::LedgerReader;

/// Double-entry predicate: the line amounts sum to exactly zero.
///
/// Amounts are exact decimals, so no tolerance is applied. A sum that
/// overflows is not balanced.
pub fn is_balanced(tx: &Transaction) -> bool {
    tx.net().is_some_and(|net| net.is_zero())
}

/// Result of validating a whole ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub transaction_count: u64,
    pub all_balanced: bool,
    /// Sum of balances equals sum of opening balances.
    pub conserved: bool,
    /// Replaying history reproduces the live balances.
    pub replay_converges: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub transaction: Option<TransactionId>,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    UnbalancedHistory,
    DuplicateId,
    ConservationBroken,
    ReplayDivergence,
}

/// Ledger-wide integrity validator.
pub struct LedgerValidator;

impl LedgerValidator {
    pub fn validate<R: LedgerReader>(reader: &R) -> Result<ValidationReport, LedgerError> {
        let history = reader.history()?;
        let mut violations = Vec::new();
        let mut all_balanced = true;
        let mut seen = std::collections::HashSet::new();

        for tx in &history {
            if !is_balanced(tx) {
                all_balanced = false;
                violations.push(Violation {
                    transaction: Some(tx.id()),
                    kind: ViolationKind::UnbalancedHistory,
                    description: format!("lines sum to {:?}", tx.net()),
                });
            }
            if !seen.insert(tx.id()) {
                violations.push(Violation {
                    transaction: Some(tx.id()),
                    kind: ViolationKind::DuplicateId,
                    description: "transaction id appears more than once".into(),
                });
            }
        }

        let openings = reader.opening_balances()?;
        let balances = reader.balances()?;
        let opening_total = Amount::checked_sum(openings.values().copied())
            .ok_or(LedgerError::TotalOverflow)?;
        let live_total = Amount::checked_sum(balances.values().copied())
            .ok_or(LedgerError::TotalOverflow)?;
        let conserved = opening_total == live_total;
        if !conserved {
            violations.push(Violation {
                transaction: None,
                kind: ViolationKind::ConservationBroken,
                description: format!("opening total {opening_total}, live total {live_total}"),
            });
        }

        let replayed = ReplayEngine::replay(&openings, &history)?;
        let replay_converges = replayed.balances == balances;
        if !replay_converges {
            violations.push(Violation {
                transaction: None,
                kind: ViolationKind::ReplayDivergence,
                description: "replayed balances differ from live balances".into(),
            });
        }

        Ok(ValidationReport {
            transaction_count: history.len() as u64,
            all_balanced,
            conserved,
            replay_converges,
            violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;
    use crate::traits::LedgerWriter;

    #[test]
    fn empty_transaction_is_balanced_by_predicate() {
        assert!(is_balanced(&Transaction::new()));
    }

    #[test]
    fn float_trap_values_balance_exactly() {
        let tx = Transaction::new()
            .line("A", "0.1".parse::<Amount>().unwrap(), "")
            .line("B", "0.2".parse::<Amount>().unwrap(), "")
            .line("C", "-0.3".parse::<Amount>().unwrap(), "");
        assert!(is_balanced(&tx));
    }

    #[test]
    fn off_by_one_cent_is_unbalanced() {
        let tx = Transaction::new()
            .line("A", "-10.00".parse::<Amount>().unwrap(), "")
            .line("B", "9.99".parse::<Amount>().unwrap(), "");
        assert!(!is_balanced(&tx));
    }

    #[test]
    fn healthy_ledger_validates() {
        let ledger = InMemoryLedger::new();
        ledger.create_account(&"RESERVE".into(), Amount::from(1000)).unwrap();
        ledger
            .post_transaction(Transaction::transfer("RESERVE", "WALLET", Amount::from(200), "t"))
            .unwrap();
        ledger
            .post_transaction(Transaction::transfer("WALLET", "SHOP", Amount::from(50), "t"))
            .unwrap();

        let report = LedgerValidator::validate(&ledger).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.transaction_count, 2);
        assert!(report.all_balanced);
        assert!(report.conserved);
        assert!(report.replay_converges);
    }

    #[test]
    fn empty_ledger_validates() {
        let report = LedgerValidator::validate(&InMemoryLedger::new()).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.transaction_count, 0);
    }
}
