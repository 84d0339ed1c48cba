//! # Baton Core - Route-Data Foundation
//!
//! **Purpose**: Types, configuration, key derivation and host seams for carrying
//! structured payloads across navigations of a flat-parameter router.
//!
//! # Architecture Constraints
//!
//! - YES Navigation descriptors, route snapshots and navigation state
//! - YES Transfer key derivation (pure, synchronous)
//! - YES Transport codec for structured parameters
//! - YES Traits for the navigation engine and storage backends
//! - NO storage implementations (that's `baton-store`)
//! - NO phase machine, interception or rewriting (that's `baton-router`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Transport encoding of structured parameters
pub mod codec;

/// Route-data configuration
pub mod config;

/// Per-router context
pub mod context;

/// Host seams: engine, backend, medium and state container traits
pub mod effects;

/// Unified error type
pub mod errors;

/// Transfer key derivation
pub mod keys;

/// Navigation descriptors
pub mod location;

/// Route snapshots
pub mod route;

/// Shared navigation state
pub mod state;

pub use codec::{decode_location_param, decode_object_param, encode_location};
pub use config::{RouteDataConfig, DEFAULT_KEY, DEFAULT_ROUTE_DATA_MAP_KEY};
pub use context::RouteContext;
pub use effects::{KeyValueMedium, NavigationEngine, RouteResolver, StateContainer, StorageBackend};
pub use errors::{BatonError, Result};
pub use keys::{create_transfer_key, KeyDeriver, TransferKey};
pub use location::{
    is_truthy, Location, NavTarget, Origin, Params, DATA_KEY_FIELD, IS_FLAT_FIELD,
};
pub use route::{ResolvedRoute, Route, RouteRecord};
pub use state::{
    NavArgument, NavInfo, NavType, NavigationState, Phase, RouteAction, SharedNavState,
};
