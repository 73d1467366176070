//! Key condition builder (Functional Core - pure functions).
//!
//! Turns a caller's query description into the store's condition structures.

mod builder;
mod operator;
mod types;

pub use builder::{attribute_filter, build_query_conditions, key_item};
pub use operator::{Arity, ComparisonOperator, UnknownOperator};
pub use types::{Condition, Conditions, KeyField, QueryConditions, QuerySpec, RangeCondition};
