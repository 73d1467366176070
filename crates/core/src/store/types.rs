use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, WireItem};
use crate::condition::{Conditions, QueryConditions};

// ============================================================================
// Item requests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetItemRequest {
    pub table_name: String,
    pub key: WireItem,
    pub consistent_read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutItemRequest {
    pub table_name: String,
    pub item: WireItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteItemRequest {
    pub table_name: String,
    pub key: WireItem,
}

// ============================================================================
// Multi-item requests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub table_name: String,
    pub key_conditions: Conditions,
    pub scan_index_forward: bool,
    pub consistent_read: bool,
    pub exclusive_start_key: Option<WireItem>,
}

impl QueryRequest {
    pub fn new(table_name: impl Into<String>, conditions: QueryConditions) -> Self {
        Self {
            table_name: table_name.into(),
            key_conditions: conditions.key_conditions,
            scan_index_forward: conditions.scan_index_forward,
            consistent_read: conditions.consistent_read,
            exclusive_start_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub table_name: String,
    pub scan_filter: Option<Conditions>,
    pub exclusive_start_key: Option<WireItem>,
    pub return_consumed_capacity: bool,
}

impl ScanRequest {
    /// A full-table scan.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            scan_filter: None,
            exclusive_start_key: None,
            return_consumed_capacity: true,
        }
    }

    pub fn with_filter(mut self, filter: Conditions) -> Self {
        self.scan_filter = Some(filter);
        self
    }
}

/// One page of a query or scan response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub items: Vec<WireItem>,
    pub last_evaluated_key: Option<WireItem>,
    pub consumed_capacity: Option<f64>,
}

impl ResultPage {
    /// The continuation cursor, if the store says there is more.
    ///
    /// An empty key map is treated the same as no key.
    pub fn cursor(&self) -> Option<&WireItem> {
        self.last_evaluated_key.as_ref().filter(|key| !key.is_empty())
    }
}

// ============================================================================
// Table definitions
// ============================================================================

/// Scalar type of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    String,
    Number,
}

impl KeyKind {
    /// Typed JSON value for a key given as text, e.g. from the command line.
    pub fn typed_value(&self, field: &str, raw: &str) -> Result<serde_json::Value, CodecError> {
        match self {
            KeyKind::String => Ok(serde_json::Value::String(raw.to_string())),
            KeyKind::Number => raw
                .parse::<serde_json::Number>()
                .map(serde_json::Value::Number)
                .map_err(|_| CodecError::MalformedNumber {
                    field: field.to_string(),
                    value: raw.to_string(),
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    pub kind: KeyKind,
}

impl KeyAttribute {
    pub fn new(name: impl Into<String>, kind: KeyKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Key schema and provisioned throughput of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub hash_key: KeyAttribute,
    pub range_key: Option<KeyAttribute>,
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

impl TableSchema {
    pub const DEFAULT_CAPACITY_UNITS: i64 = 5;

    pub fn new(hash_key: KeyAttribute) -> Self {
        Self {
            hash_key,
            range_key: None,
            read_capacity_units: Self::DEFAULT_CAPACITY_UNITS,
            write_capacity_units: Self::DEFAULT_CAPACITY_UNITS,
        }
    }

    pub fn with_range_key(mut self, range_key: KeyAttribute) -> Self {
        self.range_key = Some(range_key);
        self
    }

    pub fn with_capacity(mut self, read: i64, write: i64) -> Self {
        self.read_capacity_units = read;
        self.write_capacity_units = write;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableRequest {
    pub table_name: String,
    pub schema: TableSchema,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::WireAttribute;

    #[test]
    fn test_empty_cursor_is_no_cursor() {
        let page = ResultPage {
            items: vec![],
            last_evaluated_key: Some(WireItem::new()),
            consumed_capacity: None,
        };
        assert!(page.cursor().is_none());
    }

    #[test]
    fn test_cursor_present() {
        let mut key = WireItem::new();
        key.insert("hashId".to_string(), WireAttribute::N("1".to_string()));
        let page = ResultPage {
            last_evaluated_key: Some(key.clone()),
            ..Default::default()
        };
        assert_eq!(page.cursor(), Some(&key));
    }

    #[test]
    fn test_typed_value() {
        assert_eq!(KeyKind::Number.typed_value("hashId", "123").unwrap(), json!(123));
        assert_eq!(KeyKind::String.typed_value("hashCode", "123").unwrap(), json!("123"));
        assert!(KeyKind::Number.typed_value("hashId", "abc").is_err());
    }

    #[test]
    fn test_table_schema_defaults() {
        let schema = TableSchema::new(KeyAttribute::new("hashId", KeyKind::Number))
            .with_range_key(KeyAttribute::new("rangeCode", KeyKind::String));

        assert_eq!(schema.read_capacity_units, 5);
        assert_eq!(schema.write_capacity_units, 5);
        assert_eq!(schema.range_key.map(|k| k.name), Some("rangeCode".to_string()));
    }

    #[test]
    fn test_scan_request_defaults() {
        let request = ScanRequest::new("alternator-numericHash-test");
        assert!(request.scan_filter.is_none());
        assert!(request.exclusive_start_key.is_none());
        assert!(request.return_consumed_capacity);
    }
}
