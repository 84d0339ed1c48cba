//! Router-level route-data configuration
//!
//! Defaults are applied at construction; every field has an explicit setter.
//! Configuration can also be loaded from JSON or TOML and overridden from
//! `BATON_*` environment variables.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{BatonError, Result};
use crate::location::{is_truthy, Location, DATA_KEY_FIELD, IS_FLAT_FIELD};

/// Sentinel used for either half of a transfer key when it cannot be derived
pub const DEFAULT_KEY: &str = "any";

/// Default slot name of the local payload map
pub const DEFAULT_ROUTE_DATA_MAP_KEY: &str = "routeDataMap";

/// Environment variable prefix consulted by [`RouteDataConfig::merge_with_env`]
pub const ENV_PREFIX: &str = "BATON_";

/// Configuration shared by every component of one router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RouteDataConfig {
    default_origin_key: String,
    default_destination_key: String,
    route_data_map_key: String,
    structured_props: Vec<String>,
    special_locations: Vec<Location>,
}

impl Default for RouteDataConfig {
    fn default() -> Self {
        Self {
            default_origin_key: DEFAULT_KEY.to_string(),
            default_destination_key: DEFAULT_KEY.to_string(),
            route_data_map_key: DEFAULT_ROUTE_DATA_MAP_KEY.to_string(),
            structured_props: Vec::new(),
            special_locations: Vec::new(),
        }
    }
}

impl RouteDataConfig {
    /// Configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| BatonError::configuration(format!("Invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a `.json` or `.toml` file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BatonError::configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            other => Err(BatonError::configuration(format!(
                "Unsupported config file extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Override fields from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Override fields from `BATON_*` pairs.
    ///
    /// `BATON_STRUCTURED_PROPS` is a comma-separated list; an empty value clears it.
    /// Either every pair applies or, on the first invalid one, none do.
    pub fn merge_with_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged = self.clone();
        for (name, value) in vars {
            let Some(field) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match field {
                "DEFAULT_ORIGIN_KEY" => merged.set_default_origin_key(value)?,
                "DEFAULT_DESTINATION_KEY" => merged.set_default_destination_key(value)?,
                "ROUTE_DATA_MAP_KEY" => merged.set_route_data_map_key(value)?,
                "STRUCTURED_PROPS" => {
                    let props = value
                        .split(',')
                        .map(str::trim)
                        .filter(|prop| !prop.is_empty())
                        .map(str::to_string)
                        .collect();
                    merged.set_structured_props(props)?;
                }
                _ => {}
            }
        }
        *self = merged;
        Ok(())
    }

    /// Check every field
    pub fn validate(&self) -> Result<()> {
        require_non_empty("defaultOriginKey", &self.default_origin_key)?;
        require_non_empty("defaultDestinationKey", &self.default_destination_key)?;
        require_non_empty("routeDataMapKey", &self.route_data_map_key)?;
        validate_structured_props(&self.structured_props)
    }

    /// Origin half used when none can be derived
    pub fn default_origin_key(&self) -> &str {
        &self.default_origin_key
    }

    /// Destination half used when none can be derived
    pub fn default_destination_key(&self) -> &str {
        &self.default_destination_key
    }

    /// Slot name of the whole payload map in the local medium
    pub fn route_data_map_key(&self) -> &str {
        &self.route_data_map_key
    }

    /// Fields whose values are themselves navigation targets
    pub fn structured_props(&self) -> &[String] {
        &self.structured_props
    }

    /// Whether `field` is a configured structured property
    pub fn is_structured_prop(&self, field: &str) -> bool {
        self.structured_props.iter().any(|prop| prop == field)
    }

    /// Locations checked by the special-location predicates
    pub fn special_locations(&self) -> &[Location] {
        &self.special_locations
    }

    /// Set the default origin key
    pub fn set_default_origin_key(&mut self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        require_non_empty("defaultOriginKey", &key)?;
        self.default_origin_key = key;
        Ok(())
    }

    /// Set the default destination key
    pub fn set_default_destination_key(&mut self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        require_non_empty("defaultDestinationKey", &key)?;
        self.default_destination_key = key;
        Ok(())
    }

    /// Set the slot name of the local payload map
    pub fn set_route_data_map_key(&mut self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        require_non_empty("routeDataMapKey", &key)?;
        self.route_data_map_key = key;
        Ok(())
    }

    /// Set the structured-property names
    pub fn set_structured_props(&mut self, props: Vec<String>) -> Result<()> {
        validate_structured_props(&props)?;
        self.structured_props = props;
        Ok(())
    }

    /// Set the structured-property names from an untyped value.
    ///
    /// Accepts an array of strings or any falsy value (which clears the list).
    pub fn set_structured_props_value(&mut self, value: &Value) -> Result<()> {
        let props = match value {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        BatonError::configuration(format!(
                            "structuredProps entries must be strings, got {item}"
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            other if !is_truthy(other) => Vec::new(),
            other => {
                return Err(BatonError::configuration(format!(
                    "structuredProps accepts only an array or a falsy value, got {other}"
                )))
            }
        };
        self.set_structured_props(props)
    }

    /// Set the special locations
    pub fn set_special_locations(&mut self, locations: Vec<Location>) {
        self.special_locations = locations;
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(BatonError::configuration(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_structured_props(props: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for prop in props {
        if prop.is_empty() {
            return Err(BatonError::configuration(
                "structuredProps entries must not be empty",
            ));
        }
        if prop == DATA_KEY_FIELD || prop == IS_FLAT_FIELD {
            return Err(BatonError::configuration(format!(
                "`{prop}` is a reserved query field"
            )));
        }
        if !seen.insert(prop.as_str()) {
            return Err(BatonError::configuration(format!(
                "duplicate structuredProps entry `{prop}`"
            )));
        }
    }
    Ok(())
}
