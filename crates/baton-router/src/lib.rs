//! # Baton Router - Route-Data Transfer
//!
//! **Purpose**: Carry structured payloads across navigations of a router that
//! only understands flat parameters, and hand each payload to its destination
//! exactly once.
//!
//! # Architecture Constraints
//!
//! - YES Phase machine driven by store writes and guard hooks
//! - YES Navigation intent recording around the host engine
//! - YES Recursive flattening of nested targets and flow graphs
//! - YES Router facade, builder, location predicates and URL rendering
//! - NO navigation engine (history, matching, guards belong to the host)
//! - NO view-layer binding
//!
//! ```rust,ignore
//! use baton_router::{RouterBuilder, Origin, Location};
//!
//! let mut router = RouterBuilder::new(engine).local(medium).build()?;
//! router.push_with_data(Location::path("/pay"), &order, &Origin::from("checkout"))?;
//! // on arrival
//! router.before_route_enter();
//! let order: Option<Order> = router.get_route_data(Some("checkout-/pay"))?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod interceptor;
pub mod phase;
pub mod predicates;
pub mod rewriter;
pub mod router;
pub mod url;

pub use builder::RouterBuilder;
pub use interceptor::NavigationInterceptor;
pub use phase::PhaseTracker;
pub use rewriter::{FlowGraph, LocationFlowRewriter};
pub use router::RouteDataRouter;
pub use url::UrlBase;

pub use baton_core::{
    BatonError, Location, NavTarget, NavType, Origin, Params, Phase, Result, RouteDataConfig,
    TransferKey,
};
