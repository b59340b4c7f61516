use finarch_types::Amount;
use serde_json::Value;

use crate::error::{EventError, Result};
use crate::event::{Event, EventKind};

/// Account state rebuilt from its events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountAggregate {
    pub account_id: String,
    pub balance: Amount,
    /// Version of the last applied event; 0 before any.
    pub version: u64,
}

impl AccountAggregate {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            balance: Amount::ZERO,
            version: 0,
        }
    }

    /// Fold one event into the state.
    ///
    /// `AccountCreated` sets the balance (a missing `initial_balance` means
    /// zero), deposits add, withdrawals subtract. `TransactionPosted` only
    /// advances the version.
    pub fn apply(&mut self, event: &Event) -> Result<()> {
        if event.aggregate_id != self.account_id {
            return Err(EventError::AggregateMismatch {
                aggregate_id: self.account_id.clone(),
                event_aggregate: event.aggregate_id.clone(),
            });
        }
        match event.event_type {
            EventKind::AccountCreated => {
                self.balance = match event.payload.get("initial_balance") {
                    Some(v) => parse_amount(v)?,
                    None => Amount::ZERO,
                };
            }
            EventKind::MoneyDeposited => {
                self.balance += required_amount(event)?;
            }
            EventKind::MoneyWithdrawn => {
                self.balance -= required_amount(event)?;
            }
            EventKind::TransactionPosted => {}
        }
        self.version = event.version;
        Ok(())
    }

    pub fn rebuild_from_events(&mut self, events: &[Event]) -> Result<()> {
        for event in events {
            self.apply(event)?;
        }
        Ok(())
    }

    /// Fresh aggregate folded over `events`.
    pub fn from_events(account_id: impl Into<String>, events: &[Event]) -> Result<Self> {
        let mut aggregate = Self::new(account_id);
        aggregate.rebuild_from_events(events)?;
        Ok(aggregate)
    }
}

fn required_amount(event: &Event) -> Result<Amount> {
    let value = event
        .payload
        .get("amount")
        .ok_or_else(|| EventError::MissingField {
            kind: event.event_type.to_string(),
            field: "amount",
        })?;
    parse_amount(value)
}

fn parse_amount(value: &Value) -> Result<Amount> {
    Ok(serde_json::from_value(value.clone())?)
}
