//! Route snapshots produced by the navigation engine

use serde::{Deserialize, Serialize};

use crate::location::{Location, Params};

/// One matched route record (a route and each of its parents)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Record path pattern after parameter substitution
    pub path: String,
    /// Record name
    #[serde(default)]
    pub name: Option<String>,
}

/// The route the engine is currently on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Canonical path
    pub path: String,
    /// Route name, if the matched record has one
    #[serde(default)]
    pub name: Option<String>,
    /// Path parameters as delivered by the engine
    #[serde(default)]
    pub params: Params,
    /// Query parameters as delivered by the engine
    #[serde(default)]
    pub query: Params,
    /// Matched records from outermost to innermost
    #[serde(default)]
    pub matched: Vec<RouteRecord>,
}

impl Route {
    /// Structured location pointing back at this route
    pub fn to_location(&self) -> Location {
        Location {
            path: Some(self.path.clone()),
            params: self.params.clone(),
            query: self.query.clone(),
            ..Location::default()
        }
    }

    /// Whether any matched record has the given path
    pub fn has_matched_path(&self, path: &str) -> bool {
        self.matched.iter().any(|record| record.path == path)
    }
}

/// Result of resolving a location through the engine's matcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    /// Canonical path of the matched route
    pub path: String,
    /// Name of the matched route
    #[serde(default)]
    pub name: Option<String>,
    /// Link target the engine would render for this location
    pub href: String,
    /// Normalized location the engine would navigate to
    pub location: Location,
}
