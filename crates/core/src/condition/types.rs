use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::WireAttribute;

use super::ComparisonOperator;

/// One condition on one attribute: an operator and its encoded operands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: ComparisonOperator,
    pub operands: Vec<WireAttribute>,
}

impl Condition {
    pub fn new(operator: ComparisonOperator, operands: Vec<WireAttribute>) -> Self {
        Self { operator, operands }
    }
}

/// Conditions keyed by attribute name.
///
/// Used both for key conditions on a query and for scan filters.
pub type Conditions = BTreeMap<String, Condition>;

/// A key attribute name with its (unencoded) value.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyField {
    pub name: String,
    pub value: Value,
}

impl KeyField {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A condition on the range key of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeCondition {
    pub name: String,
    pub operands: Vec<Value>,
}

/// Everything needed to query a table by hash key, optionally narrowed by a
/// range key condition.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub hash_key: KeyField,
    pub comparison: Option<ComparisonOperator>,
    pub range: Option<RangeCondition>,
    pub scan_index_forward: Option<bool>,
    /// Accepted but not applied; queries always return whole records.
    pub attributes_to_get: Option<Vec<String>>,
}

impl QuerySpec {
    /// Query every record under one hash key.
    pub fn for_hash_key(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            hash_key: KeyField::new(name, value),
            comparison: None,
            range: None,
            scan_index_forward: None,
            attributes_to_get: None,
        }
    }

    pub fn with_comparison(mut self, operator: ComparisonOperator) -> Self {
        self.comparison = Some(operator);
        self
    }

    pub fn with_range(mut self, name: impl Into<String>, operands: Vec<Value>) -> Self {
        self.range = Some(RangeCondition {
            name: name.into(),
            operands,
        });
        self
    }

    pub fn descending(mut self) -> Self {
        self.scan_index_forward = Some(false);
        self
    }

    pub fn with_attributes_to_get(mut self, attributes: Vec<String>) -> Self {
        self.attributes_to_get = Some(attributes);
        self
    }
}

/// Output of the key condition builder, ready to become a query request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConditions {
    pub key_conditions: Conditions,
    pub scan_index_forward: bool,
    pub consistent_read: bool,
}
