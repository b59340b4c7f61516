/// Errors produced by the event store and aggregates.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An append did not advance the aggregate's version.
    #[error("version conflict on {aggregate_id}: current {current}, got {attempted}")]
    VersionConflict {
        aggregate_id: String,
        current: u64,
        attempted: u64,
    },

    /// An event was applied to an aggregate it does not belong to.
    #[error("event for {event_aggregate} applied to {aggregate_id}")]
    AggregateMismatch {
        aggregate_id: String,
        event_aggregate: String,
    },

    /// A payload is missing a field its event kind requires.
    #[error("{kind} payload is missing '{field}'")]
    MissingField { kind: String, field: &'static str },

    #[error("lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, EventError>;
