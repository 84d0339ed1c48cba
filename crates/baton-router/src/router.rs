//! Route-data router
//!
//! [`RouteDataRouter`] ties the pieces of one router together: the shared
//! context, the data store, the phase tracker and the intercepted engine.
//! Build one with [`crate::RouterBuilder`].

use baton_core::{
    decode_location_param, is_truthy, Location, NavTarget, NavType, NavigationEngine,
    NavigationState, Origin, Params, Phase, Result, RouteContext, RouteDataConfig, RouteResolver,
    TransferKey, DATA_KEY_FIELD,
};
use baton_store::DataStore;
use parking_lot::RwLockReadGuard;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::interceptor::NavigationInterceptor;
use crate::phase::PhaseTracker;
use crate::predicates;
use crate::rewriter::{FlowGraph, LocationFlowRewriter};
use crate::url::{location_to_url, UrlBase};

/// Router carrying structured payloads across navigations of engine `E`
#[derive(Debug)]
pub struct RouteDataRouter<E> {
    context: RouteContext,
    store: DataStore,
    phase: PhaseTracker,
    navigator: NavigationInterceptor<E>,
}

impl<E: NavigationEngine> RouteDataRouter<E> {
    pub(crate) fn from_parts(context: RouteContext, store: DataStore, engine: E) -> Self {
        Self {
            phase: PhaseTracker::new(&context),
            navigator: NavigationInterceptor::new(engine, &context),
            store,
            context,
        }
    }

    // ---- Accessors ----

    /// Shared context
    pub fn context(&self) -> &RouteContext {
        &self.context
    }

    /// Current configuration
    pub fn config(&self) -> RwLockReadGuard<'_, RouteDataConfig> {
        self.context.config()
    }

    /// Payload store
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Phase tracker
    pub fn phase_tracker(&self) -> &PhaseTracker {
        &self.phase
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase.phase()
    }

    /// Copy of the navigation state
    pub fn navigation_state(&self) -> NavigationState {
        self.context.state().snapshot()
    }

    /// Intercepted engine
    pub fn navigator(&self) -> &NavigationInterceptor<E> {
        &self.navigator
    }

    /// Host engine
    pub fn engine(&self) -> &E {
        self.navigator.engine()
    }

    /// Host engine, mutably; navigations made through it are not recorded
    pub fn engine_mut(&mut self) -> &mut E {
        self.navigator.engine_mut()
    }

    // ---- Configuration ----

    /// Apply a configuration setter
    pub fn update_config<R>(&self, f: impl FnOnce(&mut RouteDataConfig) -> Result<R>) -> Result<R> {
        self.context.update_config(f)
    }

    /// Set the structured props from an arbitrary value: an array of strings,
    /// or a falsy value to clear them
    pub fn set_structured_props_value(&self, value: &Value) -> Result<()> {
        self.update_config(|config| config.set_structured_props_value(value))
    }

    /// Replace the special locations
    pub fn set_special_locations(&self, locations: Vec<Location>) -> Result<()> {
        self.update_config(|config| {
            config.set_special_locations(locations);
            Ok(())
        })
    }

    // ---- Payloads ----

    /// Key for an origin and destination; absent halves take the defaults
    pub fn create_transfer_key(
        &self,
        origin_key: Option<&str>,
        destination_key: Option<&str>,
    ) -> TransferKey {
        baton_core::create_transfer_key(&self.config(), origin_key, destination_key)
    }

    /// Store `payload` under `key`; the phase becomes `send`
    pub fn set_route_data<P: Serialize + ?Sized>(&self, key: &str, payload: &P) -> Result<()> {
        self.store.set(&TransferKey::from(key), payload)
    }

    /// Read the payload meant for the current route.
    ///
    /// `explicit_key` is normally the route's `dataKey`. `Ok(None)` means no
    /// key could be chosen or nothing is stored under it.
    pub fn get_route_data<P: DeserializeOwned>(&self, explicit_key: Option<&str>) -> Result<Option<P>> {
        match self.phase.resolve_retrieval_key(explicit_key) {
            Some(key) => self.store.get(&key),
            None => Ok(None),
        }
    }

    /// Raw form of [`Self::get_route_data`]
    pub fn get_route_data_value(&self, explicit_key: Option<&str>) -> Result<Option<Value>> {
        self.get_route_data(explicit_key)
    }

    /// Store `payload` for a navigation to `to` and return the target to dispatch.
    ///
    /// See [`LocationFlowRewriter::config_for_route_data`].
    pub fn config_for_route_data(
        &self,
        to: NavTarget,
        payload: Option<Value>,
        from: &Origin,
    ) -> Result<NavTarget> {
        let config = self.config();
        LocationFlowRewriter::new(&self.navigator, &self.store, &config)
            .config_for_route_data(to, payload, from)
    }

    /// Flatten a target's query and nested targets into stored payloads
    pub fn rewrite(&self, target: NavTarget, origin: &Origin) -> Result<NavTarget> {
        let config = self.config();
        LocationFlowRewriter::new(&self.navigator, &self.store, &config).rewrite(target, origin)
    }

    /// Flatten every target of a flow graph in place
    pub fn rewrite_flow_graph<'g>(&self, flows: &'g mut FlowGraph) -> Result<&'g mut FlowGraph> {
        let config = self.config();
        LocationFlowRewriter::new(&self.navigator, &self.store, &config).rewrite_flow_graph(flows)
    }

    // ---- Navigation with payloads ----

    /// Store `payload` and push `to`; history targets step instead
    pub fn push_with_data<P: Serialize + ?Sized>(
        &mut self,
        to: impl Into<NavTarget>,
        payload: &P,
        from: &Origin,
    ) -> Result<()> {
        let target = self.config_for_route_data(to.into(), Some(serde_json::to_value(payload)?), from)?;
        self.dispatch(target, NavType::Push)
    }

    /// Store `payload` and replace with `to`; history targets step instead
    pub fn replace_with_data<P: Serialize + ?Sized>(
        &mut self,
        to: impl Into<NavTarget>,
        payload: &P,
        from: &Origin,
    ) -> Result<()> {
        let target = self.config_for_route_data(to.into(), Some(serde_json::to_value(payload)?), from)?;
        self.dispatch(target, NavType::Replace)
    }

    /// Store `payload` and step `offset` entries through history
    pub fn go_with_data<P: Serialize + ?Sized>(
        &mut self,
        offset: i32,
        payload: &P,
        from: &Origin,
    ) -> Result<()> {
        self.history_with_data(NavTarget::Step(offset), payload, from)
    }

    /// Store `payload` and go back one entry
    pub fn back_with_data<P: Serialize + ?Sized>(&mut self, payload: &P, from: &Origin) -> Result<()> {
        self.history_with_data(NavTarget::Back, payload, from)
    }

    /// Store `payload` and go forward one entry
    pub fn forward_with_data<P: Serialize + ?Sized>(&mut self, payload: &P, from: &Origin) -> Result<()> {
        self.history_with_data(NavTarget::Forward, payload, from)
    }

    fn history_with_data<P: Serialize + ?Sized>(
        &mut self,
        target: NavTarget,
        payload: &P,
        from: &Origin,
    ) -> Result<()> {
        let target = self.config_for_route_data(target, Some(serde_json::to_value(payload)?), from)?;
        self.dispatch(target, NavType::Push)
    }

    fn dispatch(&mut self, target: NavTarget, location_nav: NavType) -> Result<()> {
        match target {
            NavTarget::Location(location) if location_nav == NavType::Replace => {
                self.navigator.replace_with(location)
            }
            NavTarget::Location(location) => self.navigator.push_to(location),
            NavTarget::Back => self.navigator.step(-1),
            NavTarget::Forward => self.navigator.step(1),
            NavTarget::Step(offset) => self.navigator.step(offset),
        }
    }

    // ---- Plain navigation ----

    /// Step through history
    pub fn go(&mut self, offset: i32) -> Result<()> {
        self.navigator.step(offset)
    }

    /// One step back
    pub fn back(&mut self) -> Result<()> {
        self.navigator.back()
    }

    /// One step forward
    pub fn forward(&mut self) -> Result<()> {
        self.navigator.forward()
    }

    /// Push a target as it is
    pub fn push(&mut self, target: Location) -> Result<()> {
        self.navigator.push_to(target)
    }

    /// Replace with a target as it is
    pub fn replace(&mut self, target: Location) -> Result<()> {
        self.navigator.replace_with(target)
    }

    // ---- Guard hooks ----

    /// A component of the incoming route is about to be entered
    pub fn before_route_enter(&self) -> Phase {
        self.phase.on_enter()
    }

    /// A reused component sees its route change; counts as entering
    pub fn before_route_update(&self) -> Phase {
        self.phase.on_enter()
    }

    /// A component of the outgoing route is about to be left
    pub fn before_route_leave(&self) -> Phase {
        self.phase.on_leave()
    }

    // ---- Retrieval ----

    /// Everything the current route was given.
    ///
    /// Route params and query are merged (query wins) and structured props are
    /// decoded from their transport strings. The stored payload is merged
    /// underneath, so route fields win over stored ones.
    pub fn route_data(&self) -> Result<Params> {
        let route = self.navigator.current_route();
        let props = self.config().structured_props().to_vec();

        let mut fields = route.params;
        fields.extend(route.query);
        for prop in &props {
            if let Some(value) = fields.get(prop).filter(|value| is_truthy(value)) {
                let decoded = decode_location_param(prop, value)?;
                fields.insert(prop.clone(), serde_json::to_value(decoded)?);
            }
        }

        let explicit = fields
            .get(DATA_KEY_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string);
        let mut merged = match self.get_route_data_value(explicit.as_deref())? {
            Some(Value::Object(stored)) => stored,
            Some(other) => {
                trace!(payload = %other, "Stored payload is not an object; not merged");
                Params::new()
            }
            None => Params::new(),
        };

        for prop in &props {
            if fields.contains_key(prop) {
                continue;
            }
            if let Some(value @ Value::String(_)) = merged.get(prop).cloned() {
                if is_truthy(&value) {
                    let decoded = decode_location_param(prop, &value)?;
                    merged.insert(prop.clone(), serde_json::to_value(decoded)?);
                }
            }
        }

        merged.extend(fields);
        Ok(merged)
    }

    // ---- Location predicates ----

    /// Whether `target` is the current route
    pub fn is_on_location(&self, target: &Location) -> bool {
        predicates::is_on_location(&self.navigator, target)
    }

    /// Whether any of `targets` is the current route
    pub fn is_on_some_of_locations(&self, targets: &[Location]) -> bool {
        predicates::is_on_some_of_locations(&self.navigator, targets)
    }

    /// Whether `target` is among the current route's matched records
    pub fn location_is_in_matched(&self, target: &Location) -> bool {
        predicates::location_is_in_matched(&self.navigator, target)
    }

    /// Whether any of `targets` is among the current route's matched records
    pub fn some_of_locations_in_matched(&self, targets: &[Location]) -> bool {
        predicates::some_of_locations_in_matched(&self.navigator, targets)
    }

    /// Whether the current route is one of the configured special locations
    pub fn is_on_special_locations(&self) -> bool {
        let special = self.config().special_locations().to_vec();
        self.is_on_some_of_locations(&special)
    }

    /// Whether a configured special location is among the matched records
    pub fn special_locations_in_matched(&self) -> bool {
        let special = self.config().special_locations().to_vec();
        self.some_of_locations_in_matched(&special)
    }

    /// Absolute URL for `target`
    pub fn location_to_url(&self, target: &Location, base: &UrlBase) -> String {
        location_to_url(&self.navigator, target, base)
    }
}
