//! Transfer key derivation
//!
//! A transfer key names one payload slot: `"<originKey>-<destinationKey>"`.
//! Two navigations with the same origin and destination share a slot; the later
//! write wins. Callers who need a private slot put their own `dataKey` in the
//! target's query.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::RouteDataConfig;
use crate::effects::RouteResolver;
use crate::location::{Location, NavTarget, Origin};

/// Identifier of one stored payload slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferKey(String);

impl TransferKey {
    /// Wrap an already-final key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the key text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TransferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransferKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for TransferKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for TransferKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Join an origin and a destination key, filling absent or empty halves
/// from the configured defaults.
pub fn create_transfer_key(
    config: &RouteDataConfig,
    origin_key: Option<&str>,
    destination_key: Option<&str>,
) -> TransferKey {
    let origin = origin_key
        .filter(|key| !key.is_empty())
        .unwrap_or(config.default_origin_key());
    let destination = destination_key
        .filter(|key| !key.is_empty())
        .unwrap_or(config.default_destination_key());
    TransferKey(format!("{origin}-{destination}"))
}

/// Derives both halves of a transfer key against a navigation engine
#[derive(Debug, Clone, Copy)]
pub struct KeyDeriver<'a> {
    config: &'a RouteDataConfig,
}

impl<'a> KeyDeriver<'a> {
    /// Deriver using the given defaults
    pub fn new(config: &'a RouteDataConfig) -> Self {
        Self { config }
    }

    /// See [`create_transfer_key`]
    pub fn create(&self, origin_key: Option<&str>, destination_key: Option<&str>) -> TransferKey {
        create_transfer_key(self.config, origin_key, destination_key)
    }

    /// Origin half for `origin`.
    ///
    /// Locations and texts containing `/` resolve to their canonical path; other
    /// texts are used verbatim; `Current` and empty text use the current route.
    pub fn origin_key<R: RouteResolver + ?Sized>(&self, resolver: &R, origin: &Origin) -> String {
        let key = match origin {
            Origin::Location(location) => resolver.resolve(location).path,
            Origin::Text(text) if text.contains('/') => {
                resolver.resolve(&Location::path(text.as_str())).path
            }
            Origin::Text(text) if !text.is_empty() => text.clone(),
            Origin::Text(_) | Origin::Current => resolver.current_route().path,
        };
        trace!(origin = ?origin, key = %key, "Derived origin key");
        key
    }

    /// Destination half for `target`; history traversal has no stable destination
    pub fn destination_key<R: RouteResolver + ?Sized>(
        &self,
        resolver: &R,
        target: &NavTarget,
    ) -> Option<String> {
        match target {
            NavTarget::Location(location) => Some(resolver.resolve(location).path),
            NavTarget::Back | NavTarget::Forward | NavTarget::Step(_) => None,
        }
    }

    /// Full key for a navigation from `origin` to `target`
    pub fn derive<R: RouteResolver + ?Sized>(
        &self,
        resolver: &R,
        origin: &Origin,
        target: &NavTarget,
    ) -> TransferKey {
        let origin_key = self.origin_key(resolver, origin);
        let destination_key = self.destination_key(resolver, target);
        self.create(Some(&origin_key), destination_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{ResolvedRoute, Route};

    /// Trims trailing slashes and maps route names to `/named/<name>`
    struct FixedResolver {
        current: &'static str,
    }

    impl RouteResolver for FixedResolver {
        fn resolve(&self, target: &Location) -> ResolvedRoute {
            let path = match (&target.path, &target.name) {
                (Some(path), _) => path.trim_end_matches('/').to_string(),
                (None, Some(name)) => format!("/named/{name}"),
                (None, None) => self.current.to_string(),
            };
            ResolvedRoute {
                href: path.clone(),
                path,
                name: target.name.clone(),
                location: target.clone(),
            }
        }

        fn current_route(&self) -> Route {
            Route {
                path: self.current.to_string(),
                ..Route::default()
            }
        }
    }

    #[test]
    fn create_joins_with_dash() {
        let config = RouteDataConfig::default();
        assert_eq!(
            create_transfer_key(&config, Some("home"), Some("profile")).as_str(),
            "home-profile"
        );
    }

    #[test]
    fn create_fills_defaults_for_absent_or_empty_halves() {
        let mut config = RouteDataConfig::default();
        assert_eq!(create_transfer_key(&config, None, None).as_str(), "any-any");
        assert_eq!(create_transfer_key(&config, Some(""), Some("/x")).as_str(), "any-/x");

        config.set_default_destination_key("nowhere").unwrap();
        assert_eq!(
            create_transfer_key(&config, Some("a"), None).as_str(),
            "a-nowhere"
        );
    }

    #[test]
    fn origin_key_rules() {
        let config = RouteDataConfig::default();
        let deriver = KeyDeriver::new(&config);
        let resolver = FixedResolver { current: "/home" };

        assert_eq!(deriver.origin_key(&resolver, &Origin::Current), "/home");
        assert_eq!(deriver.origin_key(&resolver, &Origin::from("")), "/home");
        assert_eq!(deriver.origin_key(&resolver, &Origin::from("checkout")), "checkout");
        assert_eq!(deriver.origin_key(&resolver, &Origin::from("/cart/")), "/cart");
        assert_eq!(
            deriver.origin_key(&resolver, &Origin::from(Location::named("cart"))),
            "/named/cart"
        );
    }

    #[test]
    fn destination_key_is_default_for_history_targets() {
        let config = RouteDataConfig::default();
        let deriver = KeyDeriver::new(&config);
        let resolver = FixedResolver { current: "/home" };

        for target in [NavTarget::Back, NavTarget::Forward, NavTarget::Step(-2)] {
            assert_eq!(
                deriver.derive(&resolver, &Origin::from("list"), &target).as_str(),
                "list-any"
            );
        }
        assert_eq!(
            deriver
                .derive(&resolver, &Origin::from("checkout"), &Location::path("/pay").into())
                .as_str(),
            "checkout-/pay"
        );
    }
}
