//! Navigation intent recording
//!
//! [`NavigationInterceptor`] owns the host engine and records the type and
//! arguments of each navigation before the engine sees it. It implements
//! [`NavigationEngine`] itself, so it can stand anywhere an engine is expected.

use baton_core::{
    Location, NavArgument, NavInfo, NavType, NavigationEngine, ResolvedRoute, Result,
    RouteContext, RouteResolver, Route, SharedNavState,
};
use tracing::debug;

/// Decorator recording navigation intent around an engine
#[derive(Debug)]
pub struct NavigationInterceptor<E> {
    engine: E,
    state: SharedNavState,
}

impl<E: NavigationEngine> NavigationInterceptor<E> {
    /// Wrap `engine`, recording into the context's navigation state
    pub fn new(engine: E, context: &RouteContext) -> Self {
        Self {
            engine,
            state: context.state().clone(),
        }
    }

    /// Wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Wrapped engine, mutably. Calls made through it are not recorded.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Unwrap the engine
    pub fn into_inner(self) -> E {
        self.engine
    }

    /// One step back
    pub fn back(&mut self) -> Result<()> {
        self.step(-1)
    }

    /// One step forward
    pub fn forward(&mut self) -> Result<()> {
        self.step(1)
    }

    fn record(&self, nav_info: NavInfo) {
        debug!(
            nav_type = ?nav_info.nav_type,
            arguments = nav_info.arguments.len(),
            "Recorded navigation intent"
        );
        self.state.record_nav(nav_info);
    }
}

impl<E: RouteResolver> RouteResolver for NavigationInterceptor<E> {
    fn resolve(&self, target: &Location) -> ResolvedRoute {
        self.engine.resolve(target)
    }

    fn current_route(&self) -> Route {
        self.engine.current_route()
    }
}

impl<E: NavigationEngine> NavigationEngine for NavigationInterceptor<E> {
    fn step(&mut self, offset: i32) -> Result<()> {
        self.record(NavInfo::for_step(offset));
        self.engine.step(offset)
    }

    fn push_to(&mut self, target: Location) -> Result<()> {
        self.record(NavInfo::for_call(
            NavType::Push,
            vec![NavArgument::Target(target.clone())],
        ));
        self.engine.push_to(target)
    }

    fn replace_with(&mut self, target: Location) -> Result<()> {
        self.record(NavInfo::for_call(
            NavType::Replace,
            vec![NavArgument::Target(target.clone())],
        ));
        self.engine.replace_with(target)
    }
}
