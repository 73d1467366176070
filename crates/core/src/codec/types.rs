use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A decoded record: field name to value.
///
/// Decoded values are numbers, strings, objects or arrays. Fields that were
/// null or the empty string on the way in are simply not present.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A single attribute in the store's tagged wire format.
///
/// Serializes the same way the store spells attributes on the wire,
/// e.g. `{"N":"123"}` or `{"S":"ghi"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireAttribute {
    /// Numeric attribute carrying the decimal string form.
    N(String),
    /// String attribute carrying escaped text, JSON text or a timestamp.
    S(String),
}

impl WireAttribute {
    /// Returns the wire tag (`"N"` or `"S"`).
    pub fn tag(&self) -> &'static str {
        match self {
            WireAttribute::N(_) => "N",
            WireAttribute::S(_) => "S",
        }
    }

    /// Returns the raw wire text regardless of the tag.
    pub fn raw(&self) -> &str {
        match self {
            WireAttribute::N(value) | WireAttribute::S(value) => value,
        }
    }

    /// Returns the decimal text for numeric attributes.
    pub fn as_n(&self) -> Option<&str> {
        match self {
            WireAttribute::N(value) => Some(value),
            WireAttribute::S(_) => None,
        }
    }

    /// Returns the stored text for string attributes.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            WireAttribute::S(value) => Some(value),
            WireAttribute::N(_) => None,
        }
    }
}

/// An item (or key, or continuation cursor) in wire form.
pub type WireItem = HashMap<String, WireAttribute>;
