//! Event sourcing for FinArch.
//!
//! Every ledger mutation can be mirrored as an immutable [`Event`] in an
//! [`EventStore`]. Account state is recovered by folding an aggregate's
//! events into an [`AccountAggregate`]; doing so for every account must
//! reproduce the ledger's balances.

pub mod aggregate;
pub mod error;
pub mod event;
pub mod recorder;
pub mod store;

pub use aggregate::AccountAggregate;
pub use error::{EventError, Result};
pub use event::{Event, EventId, EventKind};
pub use recorder::EventRecorder;
pub use store::EventStore;
