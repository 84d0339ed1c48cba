//! In-memory application state container for the external backend

use std::collections::HashMap;
use std::sync::Arc;

use baton_core::{BatonError, Result, StateContainer};
use baton_store::ExternalSlot;
use parking_lot::RwLock;
use serde_json::Value;

/// Command name the container accepts by default
pub const SET_ROUTE_DATA: &str = "setRouteData";

#[derive(Debug, Default)]
struct Inner {
    slots: HashMap<String, Value>,
    commits: Vec<(String, Value)>,
}

/// Container applying `{ key, data }` commits to a slot map; clones share state
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    command: String,
    inner: Arc<RwLock<Inner>>,
}

impl Default for MemoryContainer {
    fn default() -> Self {
        Self::new(SET_ROUTE_DATA)
    }
}

impl MemoryContainer {
    /// Container accepting only `command`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            inner: Arc::default(),
        }
    }

    /// Payload committed under `key`
    pub fn slot(&self, key: &str) -> Option<Value> {
        self.inner.read().slots.get(key).cloned()
    }

    /// Every accepted commit, oldest first
    pub fn commits(&self) -> Vec<(String, Value)> {
        self.inner.read().commits.clone()
    }

    /// External backend committing to a clone of this container
    pub fn external_slot(&self) -> ExternalSlot<MemoryContainer> {
        ExternalSlot::new(self.clone(), self.command.clone(), |container: &MemoryContainer, key| {
            container.slot(key)
        })
    }
}

impl StateContainer for MemoryContainer {
    fn commit(&self, command: &str, payload: Value) -> Result<()> {
        if command != self.command {
            return Err(BatonError::storage(format!("Unknown command `{command}`")));
        }
        let key = payload
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| BatonError::storage("Commit payload has no string `key`"))?
            .to_string();
        let data = payload.get("data").cloned().unwrap_or(Value::Null);

        let mut inner = self.inner.write();
        inner.slots.insert(key, data);
        inner.commits.push((command.to_string(), payload));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_core::StorageBackend;
    use serde_json::json;

    #[test]
    fn external_slot_round_trips_through_container() {
        let container = MemoryContainer::default();
        let slot = container.external_slot();
        slot.set("a-b", json!({"x": 1})).unwrap();
        assert_eq!(container.slot("a-b"), Some(json!({"x": 1})));
        assert_eq!(slot.get("a-b").unwrap(), Some(json!({"x": 1})));
        assert_eq!(container.commits().len(), 1);
    }

    #[test]
    fn unknown_command_is_storage_error() {
        let container = MemoryContainer::new("save");
        let err = container.commit("other", json!({"key": "k"})).unwrap_err();
        assert!(matches!(err, BatonError::Storage { .. }));
        assert!(container.commits().is_empty());
    }
}
