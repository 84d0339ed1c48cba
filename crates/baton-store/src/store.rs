//! Keyed payload store
//!
//! [`DataStore`] sits between callers and the router's single storage backend.
//! Besides persisting a payload, every write records its key as the router's
//! last transfer key and moves the phase to `send`; retrieval relies on that.
//! The backend write and that record happen under one lock, so concurrent
//! writers leave the last transfer key naming the last payload stored.

use std::fmt;

use baton_core::{RouteContext, Result, SharedNavState, StorageBackend, TransferKey};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

/// Payload store bound to one backend for its whole lifetime
pub struct DataStore {
    backend: Box<dyn StorageBackend>,
    state: SharedNavState,
    send_lock: Mutex<()>,
}

impl DataStore {
    /// Store writing to `backend` and reporting sends to the context's state
    pub fn new(context: &RouteContext, backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend,
            state: context.state().clone(),
            send_lock: Mutex::new(()),
        }
    }

    /// Serialize `payload` and store it under `key`
    pub fn set<P: Serialize + ?Sized>(&self, key: &TransferKey, payload: &P) -> Result<()> {
        let value = serde_json::to_value(payload)?;
        self.set_value(key, value)
    }

    /// Store an already-encoded payload under `key`
    pub fn set_value(&self, key: &TransferKey, value: Value) -> Result<()> {
        {
            let _guard = self.send_lock.lock();
            self.backend.set(key.as_str(), value)?;
            self.state.record_send(key.clone());
        }
        debug!(
            key = %key,
            backend = self.backend.backend_type(),
            "Stored route data; phase is send"
        );
        Ok(())
    }

    /// Read and decode the payload stored under `key`
    pub fn get<P: DeserializeOwned>(&self, key: &TransferKey) -> Result<Option<P>> {
        match self.get_value(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Read the raw payload stored under `key`
    pub fn get_value(&self, key: &TransferKey) -> Result<Option<Value>> {
        let value = self.backend.get(key.as_str())?;
        trace!(key = %key, found = value.is_some(), "Read route data");
        Ok(value)
    }

    /// Label of the active backend
    pub fn backend_type(&self) -> &'static str {
        self.backend.backend_type()
    }
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("backend", &self.backend.backend_type())
            .finish_non_exhaustive()
    }
}
