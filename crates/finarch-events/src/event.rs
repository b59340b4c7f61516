use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// Unique identifier for an event (random UUID v4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First 8 characters of the hyphenated form.
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of stored events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// An account was opened or its balance was reset.
    AccountCreated,
    /// A debit line increased an account's balance.
    MoneyDeposited,
    /// A credit line decreased an account's balance.
    MoneyWithdrawn,
    /// A transaction was committed to the ledger.
    TransactionPosted,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AccountCreated => "AccountCreated",
            Self::MoneyDeposited => "MoneyDeposited",
            Self::MoneyWithdrawn => "MoneyWithdrawn",
            Self::TransactionPosted => "TransactionPosted",
        };
        write!(f, "{s}")
    }
}

/// A single immutable event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub event_type: EventKind,
    /// Account id, transaction id, or any other aggregate key.
    pub aggregate_id: String,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
    /// Position of this event within its aggregate, starting at 1.
    pub version: u64,
}

impl Event {
    pub fn new(
        event_type: EventKind,
        aggregate_id: impl Into<String>,
        payload: Value,
        version: u64,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            event_type,
            aggregate_id: aggregate_id.into(),
            timestamp: Utc::now(),
            payload,
            version,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
