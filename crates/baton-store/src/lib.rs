//! # Baton Store - Route-Data Persistence
//!
//! **Purpose**: Persist route payloads outside the URL behind a single
//! per-router backend.
//!
//! # Architecture Constraints
//!
//! - YES [`DataStore`] recording sends into the shared navigation state
//! - YES Local backend over any key-value medium
//! - YES External backend delegating to an application state container
//! - NO key derivation (that's `baton-core`)
//! - NO navigation or phase logic beyond marking a send

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod medium;
pub mod store;

pub use backend::{ExternalSlot, LocalSlot, SlotReader};
pub use medium::{FileMedium, MemoryMedium};
pub use store::DataStore;
