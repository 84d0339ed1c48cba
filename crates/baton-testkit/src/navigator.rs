//! In-memory navigation engine
//!
//! [`MemoryNavigator`] keeps a route table of `:param` patterns and a history
//! with back and forward stacks. It records every call it receives and can be
//! told to fail the next one.

use std::collections::VecDeque;

use baton_core::{
    BatonError, Location, NavigationEngine, Params, ResolvedRoute, Result, Route, RouteRecord,
    RouteResolver,
};
use serde_json::Value;

/// One route table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    /// Route name
    pub name: String,
    /// Path pattern, `:name` segments capture params
    pub pattern: String,
}

/// A call received by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum NavCall {
    /// `step(offset)`
    Step(i32),
    /// `push_to(target)`
    Push(Location),
    /// `replace_with(target)`
    Replace(Location),
}

/// History-keeping engine for tests
#[derive(Debug, Clone)]
pub struct MemoryNavigator {
    routes: Vec<RouteDef>,
    current: Route,
    history: VecDeque<Route>,
    forward: VecDeque<Route>,
    max_history: usize,
    calls: Vec<NavCall>,
    fail_next: Option<String>,
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MemoryNavigator {
    /// Engine whose first entry is `start`
    pub fn new(start: &str) -> Self {
        let mut navigator = Self {
            routes: Vec::new(),
            current: Route::default(),
            history: VecDeque::new(),
            forward: VecDeque::new(),
            max_history: 50,
            calls: Vec::new(),
            fail_next: None,
        };
        navigator.current = navigator.route_for(&Location::path(start));
        navigator
    }

    /// Add a named route; the current entry is re-matched
    pub fn route(mut self, name: &str, pattern: &str) -> Self {
        self.routes.push(RouteDef {
            name: name.to_string(),
            pattern: normalize(pattern),
        });
        let mut current = self.current.to_location();
        current.params.clear();
        let query = std::mem::take(&mut current.query);
        self.current = self.route_for(&current);
        self.current.query = query;
        self
    }

    /// Path of the current entry
    pub fn current_path(&self) -> &str {
        &self.current.path
    }

    /// Calls received so far
    pub fn calls(&self) -> &[NavCall] {
        &self.calls
    }

    /// Paths behind the current entry, oldest first
    pub fn history_paths(&self) -> Vec<String> {
        self.history.iter().map(|route| route.path.clone()).collect()
    }

    /// Paths ahead of the current entry, nearest first
    pub fn forward_paths(&self) -> Vec<String> {
        self.forward.iter().map(|route| route.path.clone()).collect()
    }

    /// Fail the next navigation with `message` without moving
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    fn take_failure(&mut self) -> Result<()> {
        match self.fail_next.take() {
            Some(message) => Err(BatonError::navigation(message)),
            None => Ok(()),
        }
    }

    /// Route the engine would land on for `target`
    fn route_for(&self, target: &Location) -> Route {
        let (path, name, params) = match (&target.path, &target.name) {
            (Some(path), _) => {
                let path = normalize(path);
                match self.match_path(&path) {
                    Some((def, params)) => (path, Some(def.name.clone()), params),
                    None => (path, None, Params::new()),
                }
            }
            (None, Some(name)) => match self.routes.iter().find(|def| &def.name == name) {
                Some(def) => (
                    fill_pattern(&def.pattern, &target.params),
                    Some(def.name.clone()),
                    target.params.clone(),
                ),
                None => ("/".to_string(), None, Params::new()),
            },
            (None, None) => (self.current.path.clone(), self.current.name.clone(), self.current.params.clone()),
        };
        Route {
            matched: self.matched_records(&path),
            path,
            name,
            params,
            query: target.query.clone(),
        }
    }

    fn match_path(&self, path: &str) -> Option<(&RouteDef, Params)> {
        let segments = split(path);
        self.routes.iter().find_map(|def| {
            let pattern = split(&def.pattern);
            (pattern.len() == segments.len())
                .then(|| capture(&pattern, &segments))
                .flatten()
                .map(|params| (def, params))
        })
    }

    /// Records whose pattern matches a leading run of the path's segments
    fn matched_records(&self, path: &str) -> Vec<RouteRecord> {
        let segments = split(path);
        let mut records: Vec<(usize, RouteRecord)> = self
            .routes
            .iter()
            .filter_map(|def| {
                let pattern = split(&def.pattern);
                if pattern.is_empty() && !segments.is_empty() {
                    return None;
                }
                if pattern.len() > segments.len() {
                    return None;
                }
                capture(&pattern, &segments[..pattern.len()])?;
                let prefix = format!("/{}", segments[..pattern.len()].join("/"));
                Some((
                    pattern.len(),
                    RouteRecord {
                        path: prefix,
                        name: Some(def.name.clone()),
                    },
                ))
            })
            .collect();
        records.sort_by_key(|(depth, _)| *depth);
        records.into_iter().map(|(_, record)| record).collect()
    }

    fn enter(&mut self, route: Route) {
        self.history.push_back(std::mem::replace(&mut self.current, route));
        if self.history.len() > self.max_history {
            self.history.pop_front();
        }
        self.forward.clear();
    }
}

impl RouteResolver for MemoryNavigator {
    fn resolve(&self, target: &Location) -> ResolvedRoute {
        let route = self.route_for(target);
        let mut href = route.path.clone();
        if !target.query.is_empty() {
            let pairs: Vec<String> = target
                .query
                .iter()
                .map(|(key, value)| format!("{key}={}", query_text(value)))
                .collect();
            href.push('?');
            href.push_str(&pairs.join("&"));
        }
        if let Some(hash) = &target.hash {
            href.push('#');
            href.push_str(hash);
        }
        ResolvedRoute {
            location: Location {
                path: Some(route.path.clone()),
                name: None,
                params: Params::new(),
                route_data: None,
                is_url: false,
                ..target.clone()
            },
            path: route.path,
            name: route.name,
            href,
        }
    }

    fn current_route(&self) -> Route {
        self.current.clone()
    }
}

impl NavigationEngine for MemoryNavigator {
    fn step(&mut self, offset: i32) -> Result<()> {
        self.calls.push(NavCall::Step(offset));
        self.take_failure()?;
        let distance = offset.unsigned_abs() as usize;
        if offset < 0 {
            if distance > self.history.len() {
                return Err(BatonError::navigation(format!(
                    "cannot step {offset}: {} entries behind",
                    self.history.len()
                )));
            }
            for _ in 0..distance {
                if let Some(previous) = self.history.pop_back() {
                    self.forward
                        .push_front(std::mem::replace(&mut self.current, previous));
                }
            }
        } else if offset > 0 {
            if distance > self.forward.len() {
                return Err(BatonError::navigation(format!(
                    "cannot step {offset}: {} entries ahead",
                    self.forward.len()
                )));
            }
            for _ in 0..distance {
                if let Some(next) = self.forward.pop_front() {
                    self.history
                        .push_back(std::mem::replace(&mut self.current, next));
                }
            }
        }
        Ok(())
    }

    fn push_to(&mut self, target: Location) -> Result<()> {
        self.calls.push(NavCall::Push(target.clone()));
        self.take_failure()?;
        let route = self.route_for(&target);
        self.enter(route);
        Ok(())
    }

    fn replace_with(&mut self, target: Location) -> Result<()> {
        self.calls.push(NavCall::Replace(target.clone()));
        self.take_failure()?;
        self.current = self.route_for(&target);
        Ok(())
    }
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    format!("/{}", split(path).join("/"))
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn capture(pattern: &[&str], segments: &[&str]) -> Option<Params> {
    let mut params = Params::new();
    for (expected, actual) in pattern.iter().zip(segments) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), Value::String((*actual).to_string()));
            }
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

fn fill_pattern(pattern: &str, params: &Params) -> String {
    let segments: Vec<String> = split(pattern)
        .into_iter()
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params.get(name).map(query_text).unwrap_or_default(),
            None => segment.to_string(),
        })
        .collect();
    format!("/{}", segments.join("/"))
}

fn query_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn app() -> MemoryNavigator {
        MemoryNavigator::new("/home")
            .route("home", "/home")
            .route("users", "/users")
            .route("user", "/users/:id")
    }

    #[test]
    fn start_entry_is_matched() {
        let nav = app();
        assert_eq!(nav.current_route().name.as_deref(), Some("home"));
        assert_eq!(nav.current_route().path, "/home");
    }

    #[test]
    fn resolves_names_and_params() {
        let nav = app();
        let resolved = nav.resolve(&Location::named("user").with_param("id", 7));
        assert_eq!(resolved.path, "/users/7");
        assert_eq!(resolved.name.as_deref(), Some("user"));

        let resolved = nav.resolve(&Location::path("/users/9/").with_query("tab", "a"));
        assert_eq!(resolved.path, "/users/9");
        assert_eq!(resolved.href, "/users/9?tab=a");
    }

    #[test]
    fn matched_lists_parents_first() {
        let mut nav = app();
        nav.push_to(Location::path("/users/3")).unwrap();
        let route = nav.current_route();
        assert_eq!(route.params.get("id"), Some(&json!("3")));
        let paths: Vec<_> = route.matched.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["/users", "/users/3"]);
    }

    #[test]
    fn history_moves_both_ways() {
        let mut nav = app();
        nav.push_to(Location::path("/users")).unwrap();
        nav.push_to(Location::path("/users/1")).unwrap();
        nav.step(-2).unwrap();
        assert_eq!(nav.current_route().path, "/home");
        assert_eq!(nav.forward_paths(), ["/users", "/users/1"]);
        nav.step(1).unwrap();
        assert_eq!(nav.current_route().path, "/users");

        nav.replace_with(Location::path("/users/5")).unwrap();
        assert_eq!(nav.history_paths(), ["/home"]);
        assert!(nav.step(-2).is_err());
    }

    #[test]
    fn forced_failure_does_not_move() {
        let mut nav = app();
        nav.fail_next("aborted");
        let err = nav.push_to(Location::path("/users")).unwrap_err();
        assert_eq!(err, BatonError::navigation("aborted"));
        assert_eq!(nav.current_route().path, "/home");
        assert_eq!(nav.calls().len(), 1);
        nav.push_to(Location::path("/users")).unwrap();
        assert_eq!(nav.current_route().path, "/users");
    }
}
