//! Transport encoding of structured values
//!
//! The engine only carries flat values. Structured values cross it as JSON
//! text, and the read path decodes them back. A structured value found on the
//! read path cannot have crossed the transport intact, so it is rejected.

use serde_json::Value;

use crate::errors::{BatonError, Result};
use crate::location::Location;

/// Encode a location into its transport string
pub fn encode_location(location: &Location) -> Result<String> {
    Ok(serde_json::to_string(location)?)
}

fn reject_structured(field: &str, value: &Value) -> Result<()> {
    match value {
        Value::Object(_) | Value::Array(_) => Err(BatonError::transport_violation(
            field,
            "structured values cannot be passed as route parameters; encode them as JSON text",
        )),
        _ => Ok(()),
    }
}

/// Decode a location parameter from its transport form.
///
/// JSON object text decodes to a location; any other scalar is taken as a path.
pub fn decode_location_param(field: &str, value: &Value) -> Result<Location> {
    reject_structured(field, value)?;
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(parsed @ Value::Object(_)) => serde_json::from_value(parsed).map_err(|e| {
            BatonError::transport_violation(field, format!("invalid location JSON: {e}"))
        }),
        _ => Ok(Location::path(text)),
    }
}

/// Decode a JSON-valued parameter; text that is not JSON is returned as text
pub fn decode_object_param(field: &str, value: &Value) -> Result<Value> {
    reject_structured(field, value)?;
    match value {
        Value::String(text) => {
            Ok(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone())))
        }
        other => Ok(other.clone()),
    }
}
