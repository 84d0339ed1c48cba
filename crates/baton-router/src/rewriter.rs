//! Flattening of nested navigation targets into key references
//!
//! A structured target can only cross the engine as flat query values. The
//! rewriter moves a target's query into the data store under a derived key and
//! leaves only `dataKey` behind. Fields listed as structured props may hold
//! further targets; those are flattened first, depth first, with the enclosing
//! target as their origin, and the parent payload keeps each flattened child
//! as its transport string. A structured-prop value counts as a target when it
//! is an object carrying `path`, `name`, `query` or `params`; anything else is
//! ordinary payload.
//!
//! Every rewrite is planned before anything is stored. A nested target that
//! does not decode aborts the plan, leaving the store, the navigation state and
//! the input untouched.

use baton_core::{
    encode_location, BatonError, KeyDeriver, Location, NavTarget, Origin, Params, Result,
    RouteDataConfig, RouteResolver, TransferKey, DATA_KEY_FIELD,
};
use baton_store::DataStore;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

/// Named navigation flows, each a map of fields that may hold targets
pub type FlowGraph = IndexMap<String, Params>;

/// Payload writes in commit order: children before their parent
type Writes = Vec<(TransferKey, Value)>;

/// Rewrites targets against one resolver, store and configuration
#[derive(Debug)]
pub struct LocationFlowRewriter<'a, R: ?Sized> {
    resolver: &'a R,
    store: &'a DataStore,
    config: &'a RouteDataConfig,
}

impl<'a, R: RouteResolver + ?Sized> LocationFlowRewriter<'a, R> {
    /// Rewriter storing into `store` and resolving through `resolver`
    pub fn new(resolver: &'a R, store: &'a DataStore, config: &'a RouteDataConfig) -> Self {
        Self {
            resolver,
            store,
            config,
        }
    }

    /// Rewrite `target` using the configured structured props
    pub fn rewrite(&self, target: NavTarget, origin: &Origin) -> Result<NavTarget> {
        self.rewrite_with_props(target, origin, self.config.structured_props())
    }

    /// Rewrite `target`, recursing into the given structured-prop fields.
    ///
    /// History targets, targets with a `dataKey`, and targets flagged `isFlat`
    /// come back unchanged.
    pub fn rewrite_with_props(
        &self,
        target: NavTarget,
        origin: &Origin,
        props: &[String],
    ) -> Result<NavTarget> {
        let NavTarget::Location(location) = target else {
            return Ok(target);
        };
        let mut writes = Writes::new();
        let rewritten = self.plan_location(location, origin, props, &mut writes)?;
        self.commit(writes)?;
        Ok(NavTarget::Location(rewritten))
    }

    /// Rewrite every structured-prop field of every flow, in place.
    ///
    /// Each flow's name is the origin of the targets it holds. Returns the same
    /// graph it was given.
    pub fn rewrite_flow_graph<'g>(&self, flows: &'g mut FlowGraph) -> Result<&'g mut FlowGraph> {
        self.rewrite_flow_graph_with_props(flows, self.config.structured_props())
    }

    /// [`Self::rewrite_flow_graph`] with an explicit structured-prop list
    pub fn rewrite_flow_graph_with_props<'g>(
        &self,
        flows: &'g mut FlowGraph,
        props: &[String],
    ) -> Result<&'g mut FlowGraph> {
        let mut writes = Writes::new();
        let mut replacements = Vec::new();

        for (flow_name, flow) in flows.iter() {
            let origin = Origin::Text(flow_name.clone());
            for prop in props {
                let Some(value) = flow.get(prop) else {
                    continue;
                };
                if let Some(target) = self.nested_target(prop, value)? {
                    let rewritten = self.plan_location(target, &origin, props, &mut writes)?;
                    replacements.push((flow_name.clone(), prop.clone(), serde_json::to_value(rewritten)?));
                }
            }
        }

        self.commit(writes)?;
        for (flow_name, prop, value) in replacements {
            if let Some(flow) = flows.get_mut(&flow_name) {
                flow.insert(prop, value);
            }
        }
        Ok(flows)
    }

    /// Store `payload` for a navigation to `to` and stamp the key into it.
    ///
    /// An embedded `routeData` is merged under `payload`. A target that already
    /// names a `dataKey` keeps it; otherwise the key is derived from `from` and
    /// the target. History targets are returned as they are, their payload
    /// stored under `<origin>-<default destination>`.
    pub fn config_for_route_data(
        &self,
        to: NavTarget,
        payload: Option<Value>,
        from: &Origin,
    ) -> Result<NavTarget> {
        match to {
            NavTarget::Location(mut location) => {
                let embedded = location.take_route_data();
                let key = self.assign_key(&mut location, from);
                if let Some(payload) = merge_payload(embedded, payload) {
                    self.store.set_value(&key, payload)?;
                }
                Ok(NavTarget::Location(location))
            }
            history => {
                let key = KeyDeriver::new(self.config).derive(self.resolver, from, &history);
                if let Some(payload) = payload {
                    self.store.set_value(&key, payload)?;
                }
                Ok(history)
            }
        }
    }

    fn plan_location(
        &self,
        mut location: Location,
        origin: &Origin,
        props: &[String],
        writes: &mut Writes,
    ) -> Result<Location> {
        if location.data_key().is_some() || location.is_flat() {
            trace!(?location, "Target already flat");
            return Ok(location);
        }

        let mut payload = std::mem::take(&mut location.query);
        payload.remove(DATA_KEY_FIELD);

        if !props.is_empty() {
            let parent = Origin::Location(Location {
                query: Params::new(),
                route_data: None,
                ..location.clone()
            });
            for prop in props {
                let Some(value) = payload.get(prop) else {
                    continue;
                };
                if let Some(child) = self.nested_target(prop, value)? {
                    let child = self.plan_location(child, &parent, props, writes)?;
                    payload.insert(prop.clone(), Value::String(encode_location(&child)?));
                }
            }
        }

        let embedded = location.take_route_data();
        let key = self.assign_key(&mut location, origin);
        let payload = merge_payload(embedded, Some(Value::Object(payload))).unwrap_or(Value::Null);
        debug!(key = %key, nested = writes.len(), "Planned target rewrite");
        writes.push((key, payload));
        Ok(location)
    }

    /// Decode a structured-prop value into a target; other values pass through as `None`
    fn nested_target(&self, prop: &str, value: &Value) -> Result<Option<Location>> {
        if !Location::is_location_shaped(value) {
            return Ok(None);
        }
        Location::from_value(value).map(Some).ok_or_else(|| {
            BatonError::transport_violation(prop, "nested navigation target does not decode")
        })
    }

    /// Use the target's own `dataKey`, or derive one and add it to the query
    fn assign_key(&self, location: &mut Location, origin: &Origin) -> TransferKey {
        if let Some(key) = location.data_key() {
            return TransferKey::from(key);
        }
        let bare = Location {
            query: Params::new(),
            route_data: None,
            ..location.clone()
        };
        let key = KeyDeriver::new(self.config).derive(self.resolver, origin, &NavTarget::Location(bare));
        location
            .query
            .insert(DATA_KEY_FIELD.to_string(), Value::String(key.as_str().to_string()));
        key
    }

    fn commit(&self, writes: Writes) -> Result<()> {
        let count = writes.len();
        for (key, payload) in writes {
            self.store.set_value(&key, payload)?;
        }
        if count > 0 {
            debug!(writes = count, "Committed target rewrite");
        }
        Ok(())
    }
}

/// Merge an embedded payload under an explicit one; explicit fields win
fn merge_payload(embedded: Option<Value>, explicit: Option<Value>) -> Option<Value> {
    match (embedded, explicit) {
        (Some(Value::Object(mut base)), Some(Value::Object(over))) => {
            base.extend(over);
            Some(Value::Object(base))
        }
        (embedded, None) => embedded,
        (_, explicit) => explicit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_core::{ResolvedRoute, Route, RouteContext};
    use baton_store::{LocalSlot, MemoryMedium};
    use serde_json::json;

    struct PathResolver;

    impl RouteResolver for PathResolver {
        fn resolve(&self, target: &Location) -> ResolvedRoute {
            let path = target
                .path
                .clone()
                .or_else(|| target.name.as_ref().map(|name| format!("/{name}")))
                .unwrap_or_default();
            ResolvedRoute {
                href: path.clone(),
                path,
                name: target.name.clone(),
                location: target.clone(),
            }
        }

        fn current_route(&self) -> Route {
            Route {
                path: "/home".into(),
                ..Route::default()
            }
        }
    }

    fn setup() -> (RouteContext, DataStore) {
        let ctx = RouteContext::default();
        let store = DataStore::new(&ctx, Box::new(LocalSlot::new(MemoryMedium::new(), "m")));
        (ctx, store)
    }

    #[test]
    fn merge_prefers_explicit_fields() {
        assert_eq!(
            merge_payload(Some(json!({"a": 1, "b": 1})), Some(json!({"b": 2}))),
            Some(json!({"a": 1, "b": 2}))
        );
        assert_eq!(merge_payload(Some(json!([1])), None), Some(json!([1])));
        assert_eq!(merge_payload(Some(json!([1])), Some(json!(7))), Some(json!(7)));
        assert_eq!(merge_payload(None, None), None);
    }

    #[test]
    fn query_moves_into_store() {
        let (ctx, store) = setup();
        let config = RouteDataConfig::default();
        let rewriter = LocationFlowRewriter::new(&PathResolver, &store, &config);

        let target = Location::path("/pay").with_query("form", json!({"step": 1}));
        let out = rewriter
            .rewrite(target.into(), &Origin::from("checkout"))
            .unwrap();

        assert_eq!(
            out,
            NavTarget::Location(Location::path("/pay").with_query(DATA_KEY_FIELD, "checkout-/pay"))
        );
        assert_eq!(
            store.get_value(&TransferKey::from("checkout-/pay")).unwrap(),
            Some(json!({"form": {"step": 1}}))
        );
        assert_eq!(ctx.state().last_transfer_key(), Some(TransferKey::from("checkout-/pay")));
    }

    #[test]
    fn flat_and_history_targets_are_untouched() {
        let (ctx, store) = setup();
        let config = RouteDataConfig::default();
        let rewriter = LocationFlowRewriter::new(&PathResolver, &store, &config);

        let keyed = Location::path("/a").with_query(DATA_KEY_FIELD, "mine").with_query("x", 1);
        let flat = Location::path("/a").with_query("isFlat", true).with_query("x", 1);
        for target in [keyed, flat] {
            let out = rewriter.rewrite(target.clone().into(), &Origin::Current).unwrap();
            assert_eq!(out, NavTarget::Location(target));
        }
        assert_eq!(
            rewriter.rewrite(NavTarget::Back, &Origin::Current).unwrap(),
            NavTarget::Back
        );
        assert!(ctx.state().last_transfer_key().is_none());
    }

    #[test]
    fn bare_target_still_gets_a_key() {
        let (ctx, store) = setup();
        let config = RouteDataConfig::default();
        let rewriter = LocationFlowRewriter::new(&PathResolver, &store, &config);

        let out = rewriter
            .rewrite(Location::path("/a").into(), &Origin::from("home"))
            .unwrap();
        assert_eq!(
            out,
            NavTarget::Location(Location::path("/a").with_query(DATA_KEY_FIELD, "home-/a"))
        );
        assert_eq!(store.get_value(&TransferKey::from("home-/a")).unwrap(), Some(json!({})));
        assert_eq!(ctx.state().last_transfer_key(), Some(TransferKey::from("home-/a")));
    }

    #[test]
    fn only_location_shaped_values_are_nested_targets() {
        let (_ctx, store) = setup();
        let config = RouteDataConfig::default();
        let rewriter = LocationFlowRewriter::new(&PathResolver, &store, &config);
        let props = vec!["next".to_string()];

        for value in [json!(["/a", "/b"]), json!({"label": "x"}), json!(3)] {
            let target = Location::path("/a").with_query("next", value.clone());
            rewriter
                .rewrite_with_props(target.into(), &Origin::from("o"), &props)
                .unwrap();
            assert_eq!(
                store.get_value(&TransferKey::from("o-/a")).unwrap(),
                Some(json!({"next": value}))
            );
        }

        let undecodable = Location::path("/a").with_query("next", json!({"path": 5}));
        assert!(matches!(
            rewriter.rewrite_with_props(undecodable.into(), &Origin::from("o"), &props),
            Err(BatonError::TransportViolation { .. })
        ));
    }

    #[test]
    fn history_payload_uses_default_destination() {
        let (_ctx, store) = setup();
        let config = RouteDataConfig::default();
        let rewriter = LocationFlowRewriter::new(&PathResolver, &store, &config);

        let out = rewriter
            .config_for_route_data(NavTarget::Back, Some(json!({"n": 1})), &Origin::Current)
            .unwrap();
        assert_eq!(out, NavTarget::Back);
        assert_eq!(
            store.get_value(&TransferKey::from("/home-any")).unwrap(),
            Some(json!({"n": 1}))
        );
    }

    #[test]
    fn config_keeps_existing_data_key_and_query() {
        let (_ctx, store) = setup();
        let config = RouteDataConfig::default();
        let rewriter = LocationFlowRewriter::new(&PathResolver, &store, &config);

        let to = Location::path("/pay")
            .with_query(DATA_KEY_FIELD, "custom")
            .with_query("tab", "card")
            .with_route_data(json!({"a": 1, "b": 1}));
        let out = rewriter
            .config_for_route_data(to.into(), Some(json!({"b": 2})), &Origin::Current)
            .unwrap();

        let location = out.as_location().cloned().unwrap();
        assert_eq!(location.data_key(), Some("custom"));
        assert_eq!(location.query.get("tab"), Some(&json!("card")));
        assert!(location.route_data.is_none());
        assert_eq!(
            store.get_value(&TransferKey::from("custom")).unwrap(),
            Some(json!({"a": 1, "b": 2}))
        );
    }
}
