use finarch_ledger::{GateVerdict, PostingGate, Transaction};
use finarch_types::Amount;
use tracing::warn;

use crate::config::AmlConfig;
use crate::rule::ScreeningRequest;
use crate::screener::AmlScreener;

/// Ledger gate that screens every posting with an [`AmlScreener`].
///
/// A posting is screened as one transfer of its gross debit volume from the
/// first credited account to the first debited account, in the configured
/// default country. Critical risk rejects the posting; any other flags are
/// passed through to the receipt.
pub struct AmlGate {
    screener: AmlScreener,
}

impl AmlGate {
    pub fn new(config: AmlConfig) -> Self {
        Self::from_screener(AmlScreener::with_default_rules(config))
    }

    pub fn from_screener(screener: AmlScreener) -> Self {
        Self { screener }
    }

    pub fn screener(&self) -> &AmlScreener {
        &self.screener
    }

    pub fn request_for(&self, tx: &Transaction) -> ScreeningRequest {
        let config = self.screener.config();
        let first = |pred: fn(&Amount) -> bool| {
            tx.lines()
                .iter()
                .find(|l| pred(&l.amount))
                .map(|l| l.account.to_string())
                .unwrap_or_default()
        };
        ScreeningRequest {
            amount: tx.gross_volume(),
            currency: config.currency.clone(),
            sender: first(Amount::is_credit),
            receiver: first(Amount::is_debit),
            country_code: config.default_country.clone(),
        }
    }
}

impl PostingGate for AmlGate {
    fn name(&self) -> &str {
        "aml"
    }

    fn screen(&self, tx: &Transaction) -> GateVerdict {
        let request = self.request_for(tx);
        let result = match self.screener.screen(&request) {
            Ok(result) => result,
            Err(e) => return GateVerdict::Reject { reason: e.to_string() },
        };

        if !result.is_valid {
            warn!(tx = %tx.id(), risk = %result.risk_level, "posting refused by AML screening");
            return GateVerdict::Reject {
                reason: format!("{} risk: {}", result.risk_level, result.flags.join(", ")),
            };
        }
        if result.flags.is_empty() {
            GateVerdict::Allow
        } else {
            GateVerdict::Flag {
                flags: result.flags,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use finarch_ledger::{InMemoryLedger, LedgerError, LedgerReader, LedgerWriter};

    use super::*;

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::new().with_gate(Box::new(AmlGate::new(AmlConfig::default())))
    }

    #[test]
    fn request_uses_credit_side_as_sender() {
        let gate = AmlGate::new(AmlConfig::default());
        let tx = Transaction::transfer("RESERVE", "WALLET", Amount::from(200), "fund");
        let req = gate.request_for(&tx);
        assert_eq!(req.sender, "RESERVE");
        assert_eq!(req.receiver, "WALLET");
        assert_eq!(req.amount, Amount::from(200));
        assert_eq!(req.country_code, "TR");
    }

    #[test]
    fn clean_posting_allowed() {
        let ledger = ledger();
        let receipt = ledger
            .post_transaction(Transaction::transfer("A", "B", Amount::from(100), "t"))
            .unwrap();
        assert!(receipt.flags.is_empty());
    }

    #[test]
    fn structuring_posting_is_flagged_but_posted() {
        let ledger = ledger();
        let receipt = ledger
            .post_transaction(Transaction::transfer("A", "B", Amount::from(9_500), "t"))
            .unwrap();
        assert_eq!(receipt.flags, vec!["POTENTIAL_STRUCTURING"]);
        assert_eq!(ledger.history_len().unwrap(), 1);
    }

    #[test]
    fn critical_posting_is_rejected() {
        let ledger = ledger();
        let err = ledger
            .post_transaction(Transaction::transfer("A", "B", Amount::from(150_000), "t"))
            .unwrap_err();
        match err {
            LedgerError::GateRejected { gate, reason, .. } => {
                assert_eq!(gate, "aml");
                assert!(reason.contains("EXCEEDS_DAILY_LIMIT"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ledger.history_len().unwrap(), 0);
    }

    #[test]
    fn high_risk_default_country_flags_everything() {
        let config = AmlConfig {
            default_country: "XX".into(),
            ..Default::default()
        };
        let ledger = InMemoryLedger::new().with_gate(Box::new(AmlGate::new(config)));
        let receipt = ledger
            .post_transaction(Transaction::transfer("A", "B", Amount::from(1), "t"))
            .unwrap();
        assert_eq!(receipt.flags, vec!["HIGH_RISK_JURISDICTION"]);
    }
}
