use serde_json::Value;

use crate::codec::{encode_value, CodecError, WireAttribute, WireItem};

use super::{ComparisonOperator, Condition, Conditions, KeyField, QueryConditions, QuerySpec};

fn encode_operands(attribute: &str, values: &[Value]) -> Result<Vec<WireAttribute>, CodecError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            encode_value(attribute, value)?.ok_or_else(|| CodecError::EmptyOperand {
                attribute: attribute.to_string(),
                index,
            })
        })
        .collect()
}

/// Build the key conditions for a query.
///
/// With a range condition present the hash key is always matched on
/// equality and the caller's operator applies to the range key. Without one,
/// the caller's operator (equality by default) applies to the hash key.
/// Operand counts are left for the store to check.
pub fn build_query_conditions(spec: &QuerySpec) -> Result<QueryConditions, CodecError> {
    if spec.attributes_to_get.is_some() {
        tracing::debug!(
            attributes = ?spec.attributes_to_get,
            "Projection list ignored; whole records are returned"
        );
    }

    let hash_values = std::slice::from_ref(&spec.hash_key.value);
    let hash_operands = encode_operands(&spec.hash_key.name, hash_values)?;

    let mut key_conditions = Conditions::new();
    match &spec.range {
        Some(range) => {
            key_conditions.insert(
                spec.hash_key.name.clone(),
                Condition::new(ComparisonOperator::Eq, hash_operands),
            );
            key_conditions.insert(
                range.name.clone(),
                Condition::new(
                    spec.comparison.unwrap_or(ComparisonOperator::Eq),
                    encode_operands(&range.name, &range.operands)?,
                ),
            );
        }
        None => {
            key_conditions.insert(
                spec.hash_key.name.clone(),
                Condition::new(
                    spec.comparison.unwrap_or(ComparisonOperator::Eq),
                    hash_operands,
                ),
            );
        }
    }

    Ok(QueryConditions {
        key_conditions,
        scan_index_forward: spec.scan_index_forward.unwrap_or(true),
        consistent_read: false,
    })
}

/// Build a scan filter over a single (usually non-key) attribute.
pub fn attribute_filter(
    name: &str,
    operator: ComparisonOperator,
    operands: &[Value],
) -> Result<Conditions, CodecError> {
    let mut conditions = Conditions::new();
    conditions.insert(
        name.to_string(),
        Condition::new(operator, encode_operands(name, operands)?),
    );
    Ok(conditions)
}

/// Encode a primary key for get and delete requests.
pub fn key_item(hash: &KeyField, range: Option<&KeyField>) -> Result<WireItem, CodecError> {
    let mut key = WireItem::new();
    for field in std::iter::once(hash).chain(range) {
        let mut encoded = encode_operands(&field.name, std::slice::from_ref(&field.value))?;
        if let Some(attribute) = encoded.pop() {
            key.insert(field.name.clone(), attribute);
        }
    }
    Ok(key)
}
