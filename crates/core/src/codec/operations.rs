use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

use super::escape::{escape_text, unescape_text};
use super::{CodecError, Record, WireAttribute, WireItem};

// ============================================================================
// Encoding
// ============================================================================

/// Encode a single value.
///
/// Returns `Ok(None)` for values that must not be sent at all: null and the
/// empty string (the store rejects empty string attributes).
pub fn encode_value(field: &str, value: &Value) -> Result<Option<WireAttribute>, CodecError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(_) => Err(CodecError::UnsupportedValue {
            field: field.to_string(),
            kind: "boolean",
        }),
        Value::Number(number) => Ok(Some(WireAttribute::N(number.to_string()))),
        Value::String(text) if text.is_empty() => Ok(None),
        Value::String(text) => Ok(Some(WireAttribute::S(escape_text(text)))),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value)
            .map(|json| Some(WireAttribute::S(json)))
            .map_err(|e| CodecError::Serialization(e.to_string())),
    }
}

/// Encode a record, omitting null and empty string fields.
pub fn encode_record(record: &Record) -> Result<WireItem, CodecError> {
    let mut item = WireItem::with_capacity(record.len());
    for (field, value) in record {
        if let Some(attribute) = encode_value(field, value)? {
            item.insert(field.clone(), attribute);
        }
    }
    Ok(item)
}

/// Encode a timestamp as its canonical JSON date text without quotes,
/// e.g. `2013-05-01T12:30:00.000Z`.
pub fn encode_timestamp(timestamp: &DateTime<Utc>) -> WireAttribute {
    WireAttribute::S(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a single attribute.
///
/// Returns `Ok(None)` for an empty `S` attribute, which carries no value.
pub fn decode_attribute(field: &str, attribute: &WireAttribute) -> Result<Option<Value>, CodecError> {
    match attribute {
        WireAttribute::N(text) => text
            .parse::<Number>()
            .map(|number| Some(Value::Number(number)))
            .map_err(|_| CodecError::MalformedNumber {
                field: field.to_string(),
                value: text.clone(),
            }),
        WireAttribute::S(text) if text.is_empty() => Ok(None),
        WireAttribute::S(text) if text.starts_with('{') || text.starts_with('[') => {
            serde_json::from_str(text)
                .map(Some)
                .map_err(|e| CodecError::MalformedStructured {
                    field: field.to_string(),
                    reason: e.to_string(),
                })
        }
        WireAttribute::S(text) => unescape_text(field, text).map(|s| Some(Value::String(s))),
    }
}

/// Decode a wire item into a record.
///
/// An item with no attributes decodes to `None` ("no record"), which is how
/// a missing key is distinguished from a record whose fields are all empty.
pub fn decode_item(item: &WireItem) -> Result<Option<Record>, CodecError> {
    if item.is_empty() {
        return Ok(None);
    }

    let mut record = Record::new();
    for (field, attribute) in item {
        if let Some(value) = decode_attribute(field, attribute)? {
            record.insert(field.clone(), value);
        }
    }
    Ok(Some(record))
}

/// Decode a sequence of wire items, keeping their order.
pub fn decode_items(items: &[WireItem]) -> Result<Vec<Record>, CodecError> {
    items
        .iter()
        .map(|item| decode_item(item).map(Option::unwrap_or_default))
        .collect()
}
