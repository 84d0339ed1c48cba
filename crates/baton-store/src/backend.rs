//! Storage backends
//!
//! - [`LocalSlot`]: the whole payload map lives as one JSON item in a
//!   [`KeyValueMedium`]; each write reads the map, updates one entry and writes
//!   the map back while holding the slot's write lock.
//! - [`ExternalSlot`]: the application's own state container owns the payloads.
//!   Writes become a named command; reads go through an application reader.

use std::fmt;
use std::sync::Arc;

use baton_core::{
    BatonError, KeyValueMedium, Result, RouteContext, StateContainer, StorageBackend,
};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tracing::trace;

/// Where a local slot looks up the name of its map item
#[derive(Debug, Clone)]
enum MapKey {
    Fixed(String),
    Live(RouteContext),
}

/// Backend keeping every payload in one map item of a key-value medium.
///
/// Clones share the medium handle and the write lock.
#[derive(Debug, Clone)]
pub struct LocalSlot<M> {
    medium: M,
    map_key: MapKey,
    write_lock: Arc<Mutex<()>>,
}

impl<M: KeyValueMedium> LocalSlot<M> {
    /// Store the payload map under a fixed `map_key` in `medium`
    pub fn new(medium: M, map_key: impl Into<String>) -> Self {
        Self::with_map_key(medium, MapKey::Fixed(map_key.into()))
    }

    /// Store the payload map under the context's current `routeDataMapKey`,
    /// looked up on every access
    pub fn for_context(medium: M, context: &RouteContext) -> Self {
        Self::with_map_key(medium, MapKey::Live(context.clone()))
    }

    fn with_map_key(medium: M, map_key: MapKey) -> Self {
        Self {
            medium,
            map_key,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Name of the map item
    pub fn map_key(&self) -> String {
        match &self.map_key {
            MapKey::Fixed(key) => key.clone(),
            MapKey::Live(context) => context.route_data_map_key(),
        }
    }

    /// Underlying medium
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Read the whole payload map; a missing item is an empty map
    pub fn read_map(&self) -> Result<Map<String, Value>> {
        self.read_map_at(&self.map_key())
    }

    fn read_map_at(&self, map_key: &str) -> Result<Map<String, Value>> {
        let Some(text) = self.medium.get_item(map_key)? else {
            return Ok(Map::new());
        };
        match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(Value::Null) => Ok(Map::new()),
            Ok(other) => Err(BatonError::storage(format!(
                "Payload map `{map_key}` is not an object: {other}"
            ))),
            Err(e) => Err(BatonError::storage(format!(
                "Payload map `{map_key}` is corrupt: {e}"
            ))),
        }
    }
}

impl<M: KeyValueMedium> StorageBackend for LocalSlot<M> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock();
        let map_key = self.map_key();
        let mut map = self.read_map_at(&map_key)?;
        map.insert(key.to_string(), value);
        trace!(map_key = %map_key, entries = map.len(), "Writing payload map");
        let text = serde_json::to_string(&map)?;
        self.medium.set_item(&map_key, &text)
    }

    fn backend_type(&self) -> &'static str {
        "local"
    }
}

/// Reads one payload out of an application state container
pub type SlotReader<C> = Box<dyn Fn(&C, &str) -> Option<Value> + Send + Sync>;

/// Backend delegating to an application-managed state container.
///
/// Each write commits `set_command` with a `{ "key": .., "data": .. }` payload.
pub struct ExternalSlot<C> {
    container: C,
    set_command: String,
    reader: SlotReader<C>,
}

impl<C: StateContainer> ExternalSlot<C> {
    /// Delegate writes to `set_command` on `container` and reads to `reader`
    pub fn new<F>(container: C, set_command: impl Into<String>, reader: F) -> Self
    where
        F: Fn(&C, &str) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            container,
            set_command: set_command.into(),
            reader: Box::new(reader),
        }
    }

    /// Command committed on every write
    pub fn set_command(&self) -> &str {
        &self.set_command
    }

    /// Underlying container
    pub fn container(&self) -> &C {
        &self.container
    }
}

impl<C> fmt::Debug for ExternalSlot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalSlot")
            .field("set_command", &self.set_command)
            .finish_non_exhaustive()
    }
}

impl<C: StateContainer> StorageBackend for ExternalSlot<C> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok((self.reader)(&self.container, key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.container
            .commit(&self.set_command, json!({ "key": key, "data": value }))
    }

    fn backend_type(&self) -> &'static str {
        "external"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::MemoryMedium;
    use std::collections::HashMap;

    #[test]
    fn local_slot_keeps_all_payloads_in_one_item() {
        let medium = MemoryMedium::new();
        let slot = LocalSlot::new(medium.clone(), "routeDataMap");
        slot.set("a-b", json!({"x": 1})).unwrap();
        slot.set("c-d", json!([1, 2])).unwrap();

        assert_eq!(medium.len(), 1);
        let stored: Value =
            serde_json::from_str(&medium.get_item("routeDataMap").unwrap().unwrap()).unwrap();
        assert_eq!(stored, json!({"a-b": {"x": 1}, "c-d": [1, 2]}));
        assert_eq!(slot.get("a-b").unwrap(), Some(json!({"x": 1})));
        assert_eq!(slot.get("missing").unwrap(), None);
    }

    #[test]
    fn local_slot_overwrites_same_key() {
        let slot = LocalSlot::new(MemoryMedium::new(), "m");
        slot.set("k", json!(1)).unwrap();
        slot.set("k", json!(2)).unwrap();
        assert_eq!(slot.get("k").unwrap(), Some(json!(2)));
    }

    #[test]
    fn local_slot_reports_corrupt_map() {
        let medium = MemoryMedium::new();
        medium.set_item("m", "not json").unwrap();
        let slot = LocalSlot::new(medium, "m");
        assert!(matches!(slot.get("k"), Err(BatonError::Storage { .. })));
        assert!(slot.set("k", json!(1)).is_err());
    }

    #[test]
    fn concurrent_writes_are_not_lost() {
        let medium = MemoryMedium::new();
        let slot = LocalSlot::new(medium.clone(), "m");
        std::thread::scope(|scope| {
            for thread in 0..8 {
                let slot = slot.clone();
                scope.spawn(move || {
                    for i in 0..50 {
                        slot.set(&format!("t{thread}-{i}"), json!(i)).unwrap();
                    }
                });
            }
        });
        assert_eq!(LocalSlot::new(medium, "m").read_map().unwrap().len(), 400);
    }

    #[test]
    fn context_slot_follows_map_key_changes() {
        let medium = MemoryMedium::new();
        let ctx = RouteContext::default();
        let slot = LocalSlot::for_context(medium.clone(), &ctx);
        slot.set("a-b", json!(1)).unwrap();
        assert_eq!(slot.map_key(), "routeDataMap");

        ctx.update_config(|config| config.set_route_data_map_key("payloads"))
            .unwrap();
        slot.set("c-d", json!(2)).unwrap();

        assert_eq!(slot.map_key(), "payloads");
        assert!(medium.get_item("payloads").unwrap().is_some());
        assert_eq!(slot.get("c-d").unwrap(), Some(json!(2)));
        assert_eq!(slot.get("a-b").unwrap(), None);
    }

    #[derive(Clone, Default)]
    struct Commits {
        log: Arc<Mutex<Vec<(String, Value)>>>,
        slots: Arc<Mutex<HashMap<String, Value>>>,
    }

    impl StateContainer for Commits {
        fn commit(&self, command: &str, payload: Value) -> Result<()> {
            self.log.lock().push((command.to_string(), payload.clone()));
            let key = payload["key"].as_str().unwrap_or_default().to_string();
            self.slots.lock().insert(key, payload["data"].clone());
            Ok(())
        }
    }

    #[test]
    fn external_slot_commits_key_and_data() {
        let commits = Commits::default();
        let slot = ExternalSlot::new(commits.clone(), "setRouteData", |c: &Commits, key| {
            c.slots.lock().get(key).cloned()
        });

        slot.set("home-profile", json!({"tab": "posts"})).unwrap();
        assert_eq!(
            commits.log.lock().as_slice(),
            [(
                "setRouteData".to_string(),
                json!({"key": "home-profile", "data": {"tab": "posts"}})
            )]
        );
        assert_eq!(slot.get("home-profile").unwrap(), Some(json!({"tab": "posts"})));
        assert_eq!(slot.backend_type(), "external");
    }
}
