//! # Baton Testkit
//!
//! Test doubles and helpers for the route-data crates: an in-memory navigation
//! engine, an application state container, proptest strategies and a tracing
//! subscriber for tests.
//!
//! ```toml
//! [dev-dependencies]
//! baton-testkit = { workspace = true }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![forbid(unsafe_code)]

pub mod container;
pub mod fixtures;
pub mod navigator;
pub mod strategies;

pub use container::{MemoryContainer, SET_ROUTE_DATA};
pub use fixtures::{init_test_tracing, shop_navigator, Backends};
pub use navigator::{MemoryNavigator, NavCall, RouteDef};
