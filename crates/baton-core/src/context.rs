//! Per-router context
//!
//! [`RouteContext`] is built once per router and handed by reference to each
//! component constructor. Components keep clones of its handles, so they all
//! observe the same configuration and navigation state.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::config::RouteDataConfig;
use crate::errors::Result;
use crate::state::SharedNavState;

/// Configuration and navigation state of one router
#[derive(Debug, Clone, Default)]
pub struct RouteContext {
    config: Arc<RwLock<RouteDataConfig>>,
    state: SharedNavState,
}

impl RouteContext {
    /// Context with a validated configuration and fresh state
    pub fn new(config: RouteDataConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            state: SharedNavState::new(),
        })
    }

    /// Read access to the configuration
    pub fn config(&self) -> RwLockReadGuard<'_, RouteDataConfig> {
        self.config.read()
    }

    /// Apply a setter to the configuration; the change is visible to every component
    pub fn update_config<R>(
        &self,
        f: impl FnOnce(&mut RouteDataConfig) -> Result<R>,
    ) -> Result<R> {
        f(&mut self.config.write())
    }

    /// Current local map item name; safe to call while a configuration guard is held
    pub fn route_data_map_key(&self) -> String {
        self.config.read_recursive().route_data_map_key().to_string()
    }

    /// Navigation state handle
    pub fn state(&self) -> &SharedNavState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;

    #[test]
    fn clones_observe_config_updates() {
        let ctx = RouteContext::new(RouteDataConfig::default()).unwrap();
        let other = ctx.clone();
        ctx.update_config(|config| config.set_structured_props(vec!["redirect".into()]))
            .unwrap();
        assert!(other.config().is_structured_prop("redirect"));
    }

    #[test]
    fn failed_update_leaves_config_unchanged() {
        let ctx = RouteContext::default();
        let err = ctx.update_config(|config| config.set_default_origin_key(""));
        assert!(err.is_err());
        assert_eq!(ctx.config().default_origin_key(), "any");
    }

    #[test]
    fn map_key_is_read_live_under_a_held_guard() {
        let ctx = RouteContext::default();
        ctx.update_config(|config| config.set_route_data_map_key("payloads"))
            .unwrap();
        let guard = ctx.config();
        assert_eq!(ctx.route_data_map_key(), "payloads");
        drop(guard);
    }

    #[test]
    fn fresh_context_starts_at_end() {
        let ctx = RouteContext::default();
        assert_eq!(ctx.state().phase(), Phase::End);
    }
}
