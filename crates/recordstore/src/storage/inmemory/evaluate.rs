//! Condition evaluation against wire items.
//!
//! Numbers compare numerically, strings compare by bytes, and values of
//! different types never compare equal.

use std::cmp::Ordering;

use recordstore_core::condition::Condition;
use recordstore_core::store::StoreError;
use recordstore_core::{ComparisonOperator, Conditions, WireAttribute, WireItem};

pub(super) fn validation(message: impl Into<String>) -> StoreError {
    StoreError::service("ValidationException", message)
}

/// Rejects conditions whose operand count does not fit the operator.
pub(super) fn check_arity(conditions: &Conditions) -> Result<(), StoreError> {
    for (name, condition) in conditions {
        let arity = condition.operator.arity();
        if !arity.accepts(condition.operands.len()) {
            return Err(validation(format!(
                "Invalid number of argument(s) for the {} ComparisonOperator on {}: expected {}, got {}",
                condition.operator,
                name,
                arity,
                condition.operands.len()
            )));
        }
    }
    Ok(())
}

fn compare(left: &WireAttribute, right: &WireAttribute) -> Option<Ordering> {
    match (left, right) {
        (WireAttribute::N(a), WireAttribute::N(b)) => {
            let a = a.parse::<f64>().ok()?;
            let b = b.parse::<f64>().ok()?;
            Some(a.total_cmp(&b))
        }
        (WireAttribute::S(a), WireAttribute::S(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        _ => None,
    }
}

fn is(left: &WireAttribute, right: &WireAttribute, wanted: impl Fn(Ordering) -> bool) -> bool {
    compare(left, right).is_some_and(wanted)
}

/// Whether a single attribute (possibly absent) satisfies a condition.
pub(super) fn matches(attribute: Option<&WireAttribute>, condition: &Condition) -> bool {
    use ComparisonOperator as Op;

    let operands = &condition.operands;
    let Some(value) = attribute else {
        return matches!(condition.operator, Op::Null | Op::Ne | Op::NotContains);
    };

    match condition.operator {
        Op::NotNull => true,
        Op::Null => false,
        Op::Eq => is(value, &operands[0], Ordering::is_eq),
        Op::Ne => !is(value, &operands[0], Ordering::is_eq),
        Op::Le => is(value, &operands[0], Ordering::is_le),
        Op::Lt => is(value, &operands[0], Ordering::is_lt),
        Op::Ge => is(value, &operands[0], Ordering::is_ge),
        Op::Gt => is(value, &operands[0], Ordering::is_gt),
        Op::Contains => contains(value, &operands[0]),
        Op::NotContains => !contains(value, &operands[0]),
        Op::BeginsWith => match (value, &operands[0]) {
            (WireAttribute::S(text), WireAttribute::S(prefix)) => text.starts_with(prefix.as_str()),
            _ => false,
        },
        Op::In => operands
            .iter()
            .any(|operand| is(value, operand, Ordering::is_eq)),
        Op::Between => {
            is(value, &operands[0], Ordering::is_ge) && is(value, &operands[1], Ordering::is_le)
        }
    }
}

fn contains(value: &WireAttribute, operand: &WireAttribute) -> bool {
    match (value, operand) {
        (WireAttribute::S(text), WireAttribute::S(part)) => text.contains(part.as_str()),
        _ => false,
    }
}

/// Whether an item satisfies every condition. Arity must already be checked.
pub(super) fn matches_all(item: &WireItem, conditions: &Conditions) -> bool {
    conditions
        .iter()
        .all(|(name, condition)| matches(item.get(name), condition))
}
