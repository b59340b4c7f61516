use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use tracing::debug;

use crate::error::{EventError, Result};
use crate::event::{Event, EventKind};

/// Append-only, in-memory event log.
///
/// Versions are tracked per aggregate: an append must carry a version
/// strictly greater than the aggregate's current one.
#[derive(Default)]
pub struct EventStore {
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    events: Vec<Event>,
    versions: HashMap<String, u64>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, event: Event) -> Result<()> {
        let mut state = self.inner.write().map_err(|_| EventError::LockPoisoned)?;
        let current = state
            .versions
            .get(&event.aggregate_id)
            .copied()
            .unwrap_or(0);
        if event.version <= current {
            return Err(EventError::VersionConflict {
                aggregate_id: event.aggregate_id,
                current,
                attempted: event.version,
            });
        }
        debug!(
            kind = %event.event_type,
            aggregate = %event.aggregate_id,
            version = event.version,
            id = %event.event_id.short_id(),
            "event stored"
        );
        state
            .versions
            .insert(event.aggregate_id.clone(), event.version);
        state.events.push(event);
        Ok(())
    }

    /// Build and append an event at the aggregate's next version.
    pub fn append_next(
        &self,
        kind: EventKind,
        aggregate_id: impl Into<String>,
        payload: Value,
    ) -> Result<Event> {
        let aggregate_id = aggregate_id.into();
        let mut state = self.inner.write().map_err(|_| EventError::LockPoisoned)?;
        let version = state.versions.get(&aggregate_id).copied().unwrap_or(0) + 1;
        let event = Event::new(kind, aggregate_id, payload, version);
        debug!(
            kind = %event.event_type,
            aggregate = %event.aggregate_id,
            version,
            id = %event.event_id.short_id(),
            "event stored"
        );
        state
            .versions
            .insert(event.aggregate_id.clone(), version);
        state.events.push(event.clone());
        Ok(event)
    }

    /// Every event in append order.
    pub fn events(&self) -> Result<Vec<Event>> {
        Ok(self
            .inner
            .read()
            .map_err(|_| EventError::LockPoisoned)?
            .events
            .clone())
    }

    /// Events of one aggregate in append order.
    pub fn events_for(&self, aggregate_id: &str) -> Result<Vec<Event>> {
        let state = self.inner.read().map_err(|_| EventError::LockPoisoned)?;
        Ok(state
            .events
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect())
    }

    pub fn version_of(&self, aggregate_id: &str) -> Result<u64> {
        let state = self.inner.read().map_err(|_| EventError::LockPoisoned)?;
        Ok(state.versions.get(aggregate_id).copied().unwrap_or(0))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self
            .inner
            .read()
            .map_err(|_| EventError::LockPoisoned)?
            .events
            .len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn append_and_filter_by_aggregate() {
        let store = EventStore::new();
        store
            .append(Event::new(EventKind::AccountCreated, "A", json!({}), 1))
            .unwrap();
        store
            .append(Event::new(EventKind::AccountCreated, "B", json!({}), 1))
            .unwrap();
        store
            .append(Event::new(EventKind::MoneyDeposited, "A", json!({"amount": "1"}), 2))
            .unwrap();

        assert_eq!(store.len().unwrap(), 3);
        let a = store.events_for("A").unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a[1].event_type, EventKind::MoneyDeposited);
        assert!(store.events_for("C").unwrap().is_empty());
    }

    #[test]
    fn stale_version_is_rejected() {
        let store = EventStore::new();
        store
            .append(Event::new(EventKind::AccountCreated, "A", json!({}), 1))
            .unwrap();
        let err = store
            .append(Event::new(EventKind::MoneyDeposited, "A", json!({}), 1))
            .unwrap_err();
        assert!(matches!(
            err,
            EventError::VersionConflict {
                current: 1,
                attempted: 1,
                ..
            }
        ));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn append_next_assigns_increasing_versions() {
        let store = EventStore::new();
        let first = store.append_next(EventKind::AccountCreated, "A", json!({})).unwrap();
        let second = store.append_next(EventKind::MoneyDeposited, "A", json!({})).unwrap();
        let other = store.append_next(EventKind::AccountCreated, "B", json!({})).unwrap();
        assert_eq!((first.version, second.version, other.version), (1, 2, 1));
        assert_eq!(store.version_of("A").unwrap(), 2);
    }

    #[test]
    fn empty_store() {
        let store = EventStore::new();
        assert!(store.is_empty().unwrap());
        assert!(store.events().unwrap().is_empty());
    }
}
