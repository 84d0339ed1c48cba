//! Property test strategies for baton types
//!
//! Paths and keys stay within `[a-z0-9]` so they survive every medium and
//! never contain the `-` that separates key halves.

use proptest::prelude::*;
use serde_json::{Map, Value};

use baton_core::Location;

// Re-export proptest for convenience
pub use proptest;

/// Single path segment
pub fn arb_segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

/// Canonical path with one to four segments, e.g. `/users/a1`
pub fn arb_path() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_segment(), 1..=4).prop_map(|segments| format!("/{}", segments.join("/")))
}

/// Origin key that is used verbatim (no `/`)
pub fn arb_plain_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,11}"
}

/// Arbitrary JSON payload, nested a few levels deep
pub fn arb_payload() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Flat query of string fields, never using the reserved names
pub fn arb_flat_query() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("q[a-z]{1,5}", "[a-z0-9]{0,8}", 1..4).prop_map(|fields| {
        fields
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect()
    })
}

/// Path target carrying a flat query
pub fn arb_location() -> impl Strategy<Value = Location> {
    (arb_path(), arb_flat_query()).prop_map(|(path, query)| Location {
        query,
        ..Location::path(path)
    })
}
