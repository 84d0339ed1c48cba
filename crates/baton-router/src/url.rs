//! Absolute URL rendering for navigation targets

use baton_core::{Location, RouteResolver};

/// How the host serves routes, with the page data needed to build a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlBase {
    /// Routes live in the fragment; `page_url` is the current page URL
    Hash {
        /// Current page URL; everything from `#` on is discarded
        page_url: String,
    },
    /// Routes are real paths under `origin`, e.g. `https://app.test`
    History {
        /// Scheme, host and port
        origin: String,
    },
}

impl UrlBase {
    /// Hash-mode base from the current page URL
    pub fn hash(page_url: impl Into<String>) -> Self {
        UrlBase::Hash {
            page_url: page_url.into(),
        }
    }

    /// History-mode base from the page origin
    pub fn history(origin: impl Into<String>) -> Self {
        UrlBase::History {
            origin: origin.into(),
        }
    }

    fn prefix(&self) -> &str {
        match self {
            UrlBase::Hash { page_url } => page_url
                .find('#')
                .map_or(page_url.as_str(), |idx| &page_url[..idx]),
            UrlBase::History { origin } => origin,
        }
    }
}

/// Full URL for `target`. Targets marked as URLs are returned as they are.
pub fn location_to_url<R: RouteResolver + ?Sized>(
    resolver: &R,
    target: &Location,
    base: &UrlBase,
) -> String {
    if target.is_url {
        return target.path.clone().unwrap_or_default();
    }
    let href = resolver.resolve(target).href;
    format!("{}{href}", base.prefix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use baton_core::{ResolvedRoute, Route};

    struct HashHref;

    impl RouteResolver for HashHref {
        fn resolve(&self, target: &Location) -> ResolvedRoute {
            let path = target.path.clone().unwrap_or_default();
            ResolvedRoute {
                href: format!("#{path}"),
                path,
                ..ResolvedRoute::default()
            }
        }

        fn current_route(&self) -> Route {
            Route::default()
        }
    }

    #[test]
    fn hash_mode_strips_current_fragment() {
        let base = UrlBase::hash("https://app.test/index.html#/old?x=1");
        assert_eq!(
            location_to_url(&HashHref, &Location::path("/new"), &base),
            "https://app.test/index.html#/new"
        );
        let no_fragment = UrlBase::hash("https://app.test/");
        assert_eq!(
            location_to_url(&HashHref, &Location::path("/new"), &no_fragment),
            "https://app.test/#/new"
        );
    }

    #[test]
    fn history_mode_prefixes_origin() {
        let base = UrlBase::history("https://app.test");
        assert_eq!(
            location_to_url(&HashHref, &Location::path("/a"), &base),
            "https://app.test#/a"
        );
    }

    #[test]
    fn url_targets_pass_through() {
        let base = UrlBase::history("https://app.test");
        assert_eq!(
            location_to_url(&HashHref, &Location::url("https://elsewhere.test/x"), &base),
            "https://elsewhere.test/x"
        );
    }
}
