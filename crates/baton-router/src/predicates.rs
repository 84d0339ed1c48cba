//! Where-am-I checks against the engine's current route

use baton_core::{Location, RouteResolver};

/// Whether `target` resolves to the current route, by path or by name
pub fn is_on_location<R: RouteResolver + ?Sized>(resolver: &R, target: &Location) -> bool {
    let resolved = resolver.resolve(target);
    let current = resolver.current_route();
    resolved.path == current.path || (resolved.name.is_some() && resolved.name == current.name)
}

/// Whether any of `targets` is the current route
pub fn is_on_some_of_locations<R: RouteResolver + ?Sized>(resolver: &R, targets: &[Location]) -> bool {
    targets.iter().any(|target| is_on_location(resolver, target))
}

/// Whether `target` is the current route or one of its matched parents
pub fn location_is_in_matched<R: RouteResolver + ?Sized>(resolver: &R, target: &Location) -> bool {
    let resolved = resolver.resolve(target);
    resolver.current_route().has_matched_path(&resolved.path)
}

/// Whether any of `targets` is among the current route's matched records
pub fn some_of_locations_in_matched<R: RouteResolver + ?Sized>(
    resolver: &R,
    targets: &[Location],
) -> bool {
    targets
        .iter()
        .any(|target| location_is_in_matched(resolver, target))
}
