//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between SDK types and the wire types of
//! `recordstore_core`. These are testable in isolation without DynamoDB
//! access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, ComparisonOperator as SdkOperator,
    Condition as SdkCondition, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType,
};
use recordstore_core::store::{KeyAttribute, StoreError};
use recordstore_core::{
    CodecError, ComparisonOperator, Conditions, KeyKind, TableSchema, WireAttribute, WireItem,
};

// ============================================================================
// Attributes and items
// ============================================================================

pub fn to_attribute_value(attribute: &WireAttribute) -> AttributeValue {
    match attribute {
        WireAttribute::N(value) => AttributeValue::N(value.clone()),
        WireAttribute::S(value) => AttributeValue::S(value.clone()),
    }
}

fn attribute_tag(value: &AttributeValue) -> &'static str {
    match value {
        AttributeValue::B(_) => "B",
        AttributeValue::Bool(_) => "BOOL",
        AttributeValue::Bs(_) => "BS",
        AttributeValue::L(_) => "L",
        AttributeValue::M(_) => "M",
        AttributeValue::N(_) => "N",
        AttributeValue::Ns(_) => "NS",
        AttributeValue::Null(_) => "NULL",
        AttributeValue::S(_) => "S",
        AttributeValue::Ss(_) => "SS",
        _ => "UNKNOWN",
    }
}

/// Convert an SDK attribute to a wire attribute. Only `N` and `S` are ever
/// written by this crate, so anything else is rejected.
pub fn from_attribute_value(field: &str, value: &AttributeValue) -> Result<WireAttribute, CodecError> {
    match value {
        AttributeValue::N(number) => Ok(WireAttribute::N(number.clone())),
        AttributeValue::S(text) => Ok(WireAttribute::S(text.clone())),
        other => Err(CodecError::UnsupportedAttribute {
            field: field.to_string(),
            tag: attribute_tag(other).to_string(),
        }),
    }
}

pub fn to_item(item: &WireItem) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(name, attribute)| (name.clone(), to_attribute_value(attribute)))
        .collect()
}

pub fn from_item(item: &HashMap<String, AttributeValue>) -> Result<WireItem, CodecError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), from_attribute_value(name, value)?)))
        .collect()
}

/// Convert an optional SDK item, treating an empty map the same as none.
pub fn from_optional_item(
    item: Option<&HashMap<String, AttributeValue>>,
) -> Result<Option<WireItem>, CodecError> {
    match item {
        Some(item) if !item.is_empty() => from_item(item).map(Some),
        _ => Ok(None),
    }
}

// ============================================================================
// Conditions
// ============================================================================

pub fn to_sdk_operator(operator: ComparisonOperator) -> SdkOperator {
    match operator {
        ComparisonOperator::Eq => SdkOperator::Eq,
        ComparisonOperator::Ne => SdkOperator::Ne,
        ComparisonOperator::Le => SdkOperator::Le,
        ComparisonOperator::Lt => SdkOperator::Lt,
        ComparisonOperator::Ge => SdkOperator::Ge,
        ComparisonOperator::Gt => SdkOperator::Gt,
        ComparisonOperator::NotNull => SdkOperator::NotNull,
        ComparisonOperator::Null => SdkOperator::Null,
        ComparisonOperator::Contains => SdkOperator::Contains,
        ComparisonOperator::NotContains => SdkOperator::NotContains,
        ComparisonOperator::BeginsWith => SdkOperator::BeginsWith,
        ComparisonOperator::In => SdkOperator::In,
        ComparisonOperator::Between => SdkOperator::Between,
    }
}

/// Convert conditions to the legacy `KeyConditions` / `ScanFilter` shape.
pub fn to_sdk_conditions(
    conditions: &Conditions,
) -> Result<HashMap<String, SdkCondition>, StoreError> {
    conditions
        .iter()
        .map(|(name, condition)| {
            let operands = condition.operands.iter().map(to_attribute_value).collect();
            let sdk_condition = SdkCondition::builder()
                .comparison_operator(to_sdk_operator(condition.operator))
                .set_attribute_value_list(Some(operands))
                .build()
                .map_err(|e| StoreError::InvalidRequest(e.to_string()))?;
            Ok((name.clone(), sdk_condition))
        })
        .collect()
}

// ============================================================================
// Table definitions
// ============================================================================

fn scalar_type(kind: KeyKind) -> ScalarAttributeType {
    match kind {
        KeyKind::String => ScalarAttributeType::S,
        KeyKind::Number => ScalarAttributeType::N,
    }
}

fn key_element(attribute: &KeyAttribute, key_type: KeyType) -> Result<KeySchemaElement, StoreError> {
    KeySchemaElement::builder()
        .attribute_name(&attribute.name)
        .key_type(key_type)
        .build()
        .map_err(|e| StoreError::InvalidRequest(e.to_string()))
}

fn attribute_definition(attribute: &KeyAttribute) -> Result<AttributeDefinition, StoreError> {
    AttributeDefinition::builder()
        .attribute_name(&attribute.name)
        .attribute_type(scalar_type(attribute.kind))
        .build()
        .map_err(|e| StoreError::InvalidRequest(e.to_string()))
}

/// Key schema and attribute definitions for a table.
pub fn key_schema(
    schema: &TableSchema,
) -> Result<(Vec<KeySchemaElement>, Vec<AttributeDefinition>), StoreError> {
    let mut elements = vec![key_element(&schema.hash_key, KeyType::Hash)?];
    let mut definitions = vec![attribute_definition(&schema.hash_key)?];

    if let Some(range_key) = &schema.range_key {
        elements.push(key_element(range_key, KeyType::Range)?);
        definitions.push(attribute_definition(range_key)?);
    }

    Ok((elements, definitions))
}

pub fn provisioned_throughput(schema: &TableSchema) -> Result<ProvisionedThroughput, StoreError> {
    ProvisionedThroughput::builder()
        .read_capacity_units(schema.read_capacity_units)
        .write_capacity_units(schema.write_capacity_units)
        .build()
        .map_err(|e| StoreError::InvalidRequest(e.to_string()))
}
