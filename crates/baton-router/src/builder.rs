//! Router construction
//!
//! A router gets exactly one storage backend for its lifetime. The builder
//! rejects a second backend selection instead of silently replacing the first,
//! since payloads written through one backend are invisible to the other.

use baton_core::{
    BatonError, KeyValueMedium, Location, NavigationEngine, Result, RouteContext,
    RouteDataConfig, StateContainer, StorageBackend,
};
use baton_store::{DataStore, ExternalSlot, LocalSlot, MemoryMedium};
use tracing::debug;

use crate::router::RouteDataRouter;

/// Builds the backend once the router's context exists
type BackendFactory = Box<dyn FnOnce(&RouteContext) -> Box<dyn StorageBackend>>;

/// Builder for [`RouteDataRouter`]
pub struct RouterBuilder<E> {
    engine: E,
    config: RouteDataConfig,
    backend: Option<BackendFactory>,
    duplicate_backend: bool,
}

impl<E: NavigationEngine> RouterBuilder<E> {
    /// Start from an engine and the default configuration
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            config: RouteDataConfig::default(),
            backend: None,
            duplicate_backend: false,
        }
    }

    /// Use `config` instead of the defaults
    pub fn config(mut self, config: RouteDataConfig) -> Self {
        self.config = config;
        self
    }

    /// Fields that may hold nested navigation targets
    pub fn structured_props<I, S>(mut self, props: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .set_structured_props(props.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    /// Locations checked by the special-location predicates
    pub fn special_locations(mut self, locations: Vec<Location>) -> Self {
        self.config.set_special_locations(locations);
        self
    }

    /// Keep payloads in one map item of `medium`, named by the router's current
    /// `routeDataMapKey`
    pub fn local<M: KeyValueMedium + 'static>(self, medium: M) -> Self {
        self.select(Box::new(move |context: &RouteContext| {
            Box::new(LocalSlot::for_context(medium, context)) as Box<dyn StorageBackend>
        }))
    }

    /// Hand payloads to an application state container
    pub fn external<C: StateContainer + 'static>(self, slot: ExternalSlot<C>) -> Self {
        self.select(Box::new(move |_: &RouteContext| {
            Box::new(slot) as Box<dyn StorageBackend>
        }))
    }

    /// Use a custom backend
    pub fn backend(self, backend: Box<dyn StorageBackend>) -> Self {
        self.select(Box::new(move |_: &RouteContext| backend))
    }

    fn select(mut self, factory: BackendFactory) -> Self {
        if self.backend.is_some() {
            self.duplicate_backend = true;
        } else {
            self.backend = Some(factory);
        }
        self
    }

    /// Validate the configuration and assemble the router.
    ///
    /// Without a selected backend, payloads go to a process-local memory medium.
    pub fn build(self) -> Result<RouteDataRouter<E>> {
        if self.duplicate_backend {
            return Err(BatonError::configuration(
                "a router uses exactly one storage backend; select local, external or custom once",
            ));
        }
        let factory = self.backend.unwrap_or_else(|| {
            Box::new(|context: &RouteContext| {
                Box::new(LocalSlot::for_context(MemoryMedium::new(), context))
                    as Box<dyn StorageBackend>
            }) as BackendFactory
        });

        let context = RouteContext::new(self.config)?;
        let backend = factory(&context);
        let store = DataStore::new(&context, backend);
        debug!(backend = store.backend_type(), "Built route data router");
        Ok(RouteDataRouter::from_parts(context, store, self.engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_core::{Location, ResolvedRoute, Route, RouteResolver};

    #[derive(Debug)]
    struct Idle;

    impl RouteResolver for Idle {
        fn resolve(&self, _target: &Location) -> ResolvedRoute {
            ResolvedRoute::default()
        }

        fn current_route(&self) -> Route {
            Route::default()
        }
    }

    impl NavigationEngine for Idle {
        fn step(&mut self, _offset: i32) -> Result<()> {
            Ok(())
        }

        fn push_to(&mut self, _target: Location) -> Result<()> {
            Ok(())
        }

        fn replace_with(&mut self, _target: Location) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn defaults_to_memory_local_backend() {
        let router = RouterBuilder::new(Idle).build().unwrap();
        assert_eq!(router.store().backend_type(), "local");
    }

    #[test]
    fn local_backend_uses_configured_map_key() {
        let medium = MemoryMedium::new();
        let mut config = RouteDataConfig::default();
        config.set_route_data_map_key("payloads").unwrap();
        let router = RouterBuilder::new(Idle)
            .config(config)
            .local(medium.clone())
            .build()
            .unwrap();
        router.set_route_data("a-b", &1).unwrap();
        assert!(medium.get_item("payloads").unwrap().is_some());
    }

    #[test]
    fn map_key_change_after_build_moves_writes() {
        let medium = MemoryMedium::new();
        let router = RouterBuilder::new(Idle).local(medium.clone()).build().unwrap();
        router.set_route_data("a-b", &1).unwrap();

        router
            .update_config(|config| config.set_route_data_map_key("payloads"))
            .unwrap();
        router.set_route_data("c-d", &2).unwrap();

        assert!(medium.get_item("routeDataMap").unwrap().is_some());
        assert!(medium.get_item("payloads").unwrap().is_some());
        assert_eq!(
            router.store().get_value(&"c-d".into()).unwrap(),
            Some(serde_json::json!(2))
        );
    }

    #[test]
    fn second_backend_is_rejected() {
        let err = RouterBuilder::new(Idle)
            .local(MemoryMedium::new())
            .local(MemoryMedium::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, BatonError::Configuration { .. }));
    }

    #[test]
    fn reserved_structured_prop_is_rejected() {
        assert!(RouterBuilder::new(Idle).structured_props(["dataKey"]).is_err());
    }
}
