//! Navigation descriptors
//!
//! A [`Location`] is the structured form of a navigation target: a path or a
//! route name plus flat params and query. It may also embed a payload
//! (`routeData`) that must travel out of band, because the engine can only
//! carry flat, string-serializable values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved query field holding a transfer key
pub const DATA_KEY_FIELD: &str = "dataKey";

/// Reserved query flag that opts a target out of rewriting
pub const IS_FLAT_FIELD: &str = "isFlat";

/// Flat parameter map used for params and query
pub type Params = Map<String, Value>;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Structured navigation target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Target path, e.g. `/users/42`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Target route name, resolved by the engine together with `params`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Path parameters
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Params,
    /// Query parameters
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub query: Params,
    /// Fragment without the leading `#`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Payload embedded in the target; never handed to the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_data: Option<Value>,
    /// Marks `path` as an absolute URL that needs no resolution
    #[serde(default, rename = "isURL", skip_serializing_if = "is_false")]
    pub is_url: bool,
}

impl Location {
    /// Target addressed by path
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Target addressed by route name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Absolute URL that bypasses resolution
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            path: Some(url.into()),
            is_url: true,
            ..Self::default()
        }
    }

    /// Add a query field
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a path parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Embed a payload in the target
    pub fn with_route_data(mut self, data: impl Into<Value>) -> Self {
        self.route_data = Some(data.into());
        self
    }

    /// Explicit transfer key carried in the query, if any
    pub fn data_key(&self) -> Option<&str> {
        match self.query.get(DATA_KEY_FIELD) {
            Some(Value::String(key)) if !key.is_empty() => Some(key),
            _ => None,
        }
    }

    /// Whether the target opted out of rewriting with a truthy `isFlat`
    pub fn is_flat(&self) -> bool {
        self.query.get(IS_FLAT_FIELD).is_some_and(is_truthy)
    }

    /// Detach the embedded payload, leaving a target the engine can carry
    pub fn take_route_data(&mut self) -> Option<Value> {
        self.route_data.take()
    }

    /// Whether `value` is an object carrying any location field
    /// (`path`, `name`, `query` or `params`)
    pub fn is_location_shaped(value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|object| LOCATION_FIELDS.iter().any(|field| object.contains_key(*field)))
    }

    /// Decode a JSON object into a location.
    ///
    /// Objects without any location field, and shapes that do not decode, give `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !Self::is_location_shaped(value) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

const LOCATION_FIELDS: [&str; 4] = ["path", "name", "query", "params"];

/// JavaScript-style truthiness for flag fields that arrive as arbitrary JSON
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Any navigation request: a structured target or a history traversal
#[derive(Debug, Clone, PartialEq)]
pub enum NavTarget {
    /// Structured target resolved by the engine
    Location(Location),
    /// One step back in history
    Back,
    /// One step forward in history
    Forward,
    /// Relative history offset
    Step(i32),
}

impl NavTarget {
    /// History offset for traversal targets; `None` for structured ones
    pub fn history_offset(&self) -> Option<i32> {
        match self {
            NavTarget::Location(_) => None,
            NavTarget::Back => Some(-1),
            NavTarget::Forward => Some(1),
            NavTarget::Step(offset) => Some(*offset),
        }
    }

    /// Structured target, if this is one
    pub fn as_location(&self) -> Option<&Location> {
        match self {
            NavTarget::Location(location) => Some(location),
            _ => None,
        }
    }
}

impl From<Location> for NavTarget {
    fn from(location: Location) -> Self {
        NavTarget::Location(location)
    }
}

impl From<i32> for NavTarget {
    fn from(offset: i32) -> Self {
        NavTarget::Step(offset)
    }
}

/// Where a navigation starts, used to derive the origin half of a transfer key
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Origin {
    /// The engine's current route
    #[default]
    Current,
    /// A structured location, resolved to its canonical path
    Location(Location),
    /// A path (contains `/`) or an already-final key (no `/`)
    Text(String),
}

impl From<&str> for Origin {
    fn from(text: &str) -> Self {
        Origin::Text(text.to_string())
    }
}

impl From<String> for Origin {
    fn from(text: String) -> Self {
        Origin::Text(text)
    }
}

impl From<Location> for Origin {
    fn from(location: Location) -> Self {
        Origin::Location(location)
    }
}
