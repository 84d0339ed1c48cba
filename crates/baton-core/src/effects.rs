//! Seams to the outside world
//!
//! The navigation engine, the payload storage backend, the key-value medium
//! behind the local backend, and the application state container behind the
//! external backend are all supplied by the host. Baton only depends on these
//! traits.

use serde_json::Value;

use crate::errors::Result;
use crate::location::Location;
use crate::route::{ResolvedRoute, Route};

/// Read-only half of the navigation engine: matching and the current route
pub trait RouteResolver {
    /// Resolve a location through the engine's matcher
    fn resolve(&self, target: &Location) -> ResolvedRoute;

    /// Route the engine is currently on
    fn current_route(&self) -> Route;
}

/// Navigation primitives wrapped by the interceptor.
///
/// Failures are reported as [`crate::BatonError::Navigation`] and are passed
/// through untouched by every wrapper.
pub trait NavigationEngine: RouteResolver {
    /// Traverse history by a relative offset
    fn step(&mut self, offset: i32) -> Result<()>;

    /// Navigate to `target`, adding a history entry
    fn push_to(&mut self, target: Location) -> Result<()>;

    /// Navigate to `target`, replacing the current history entry
    fn replace_with(&mut self, target: Location) -> Result<()>;
}

/// Keyed payload persistence.
///
/// A router has exactly one backend for its whole lifetime. Payloads written
/// through one backend are invisible to any other.
pub trait StorageBackend: Send + Sync {
    /// Read the payload stored under `key`
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous payload
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Short backend label for logs
    fn backend_type(&self) -> &'static str;
}

/// String slot storage of the kind browsers expose as local storage
pub trait KeyValueMedium: Send + Sync {
    /// Read the item stored under `name`
    fn get_item(&self, name: &str) -> Result<Option<String>>;

    /// Write the item stored under `name`
    fn set_item(&self, name: &str, value: &str) -> Result<()>;
}

/// Application-managed state container that owns payload persistence
pub trait StateContainer: Send + Sync {
    /// Apply a named command carrying `payload`
    fn commit(&self, command: &str, payload: Value) -> Result<()>;
}
