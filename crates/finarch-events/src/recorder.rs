use std::sync::Arc;

use finarch_ledger::{PostingObserver, PostingReceipt, Transaction};
use finarch_types::{AccountId, Amount};
use serde_json::json;
use tracing::warn;

use crate::error::Result;
use crate::event::EventKind;
use crate::store::EventStore;

/// Ledger observer that mirrors every committed mutation into an
/// [`EventStore`].
///
/// Account events use the account id as aggregate; the `TransactionPosted`
/// event uses the transaction id.
pub struct EventRecorder {
    store: Arc<EventStore>,
}

impl EventRecorder {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    fn record_posting(&self, tx: &Transaction, receipt: &PostingReceipt) -> Result<()> {
        let id = tx.id().to_string();
        for line in tx.lines() {
            let kind = if line.amount.is_debit() {
                EventKind::MoneyDeposited
            } else if line.amount.is_credit() {
                EventKind::MoneyWithdrawn
            } else {
                continue;
            };
            self.store.append_next(
                kind,
                line.account.as_str(),
                json!({
                    "amount": line.amount.abs().to_canonical_string(),
                    "transaction_id": id,
                    "description": line.description,
                }),
            )?;
        }
        self.store.append_next(
            EventKind::TransactionPosted,
            id,
            json!({
                "sequence": receipt.sequence,
                "lines": tx.lines().len(),
                "gross_volume": tx.gross_volume().to_canonical_string(),
                "flags": receipt.flags,
            }),
        )?;
        Ok(())
    }
}

impl PostingObserver for EventRecorder {
    fn on_account_created(&self, id: &AccountId, balance: Amount) {
        let payload = json!({ "initial_balance": balance.to_canonical_string() });
        if let Err(e) = self
            .store
            .append_next(EventKind::AccountCreated, id.as_str(), payload)
        {
            warn!(account = %id, error = %e, "failed to record account event");
        }
    }

    fn on_posted(&self, tx: &Transaction, receipt: &PostingReceipt) {
        if let Err(e) = self.record_posting(tx, receipt) {
            warn!(tx = %tx.id(), error = %e, "failed to record posting events");
        }
    }
}
