//! Test tables and cases (Functional Core - pure data).

use serde_json::{json, Value};

use recordstore_core::{ComparisonOperator, KeyAttribute, KeyField, KeyKind, TableSchema};

/// Prefix and suffix applied to every test table name.
pub const TABLE_PREFIX: &str = "alternator-";
pub const TABLE_SUFFIX: &str = "-test";

/// Provisioned capacity for the test tables.
pub const CAPACITY_UNITS: i64 = 10;

/// Records per file for the chunked dump pass.
pub const RECORDS_PER_FILE: usize = 10;

/// A test table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestTable {
    pub name: &'static str,
    pub hash_key: &'static str,
    pub hash_kind: KeyKind,
    pub range_key: Option<(&'static str, KeyKind)>,
}

impl TestTable {
    pub fn schema(&self) -> TableSchema {
        let schema = TableSchema::new(KeyAttribute::new(self.hash_key, self.hash_kind))
            .with_capacity(CAPACITY_UNITS, CAPACITY_UNITS);
        match self.range_key {
            Some((name, kind)) => schema.with_range_key(KeyAttribute::new(name, kind)),
            None => schema,
        }
    }
}

pub const TEST_TABLES: [TestTable; 6] = [
    TestTable {
        name: "numericHash",
        hash_key: "hashId",
        hash_kind: KeyKind::Number,
        range_key: None,
    },
    TestTable {
        name: "stringHash",
        hash_key: "hashCode",
        hash_kind: KeyKind::String,
        range_key: None,
    },
    TestTable {
        name: "numericHashNumericRange",
        hash_key: "hashId",
        hash_kind: KeyKind::Number,
        range_key: Some(("rangeId", KeyKind::Number)),
    },
    TestTable {
        name: "numericHashStringRange",
        hash_key: "hashId",
        hash_kind: KeyKind::Number,
        range_key: Some(("rangeCode", KeyKind::String)),
    },
    TestTable {
        name: "stringHashNumericRange",
        hash_key: "hashCode",
        hash_kind: KeyKind::String,
        range_key: Some(("rangeId", KeyKind::Number)),
    },
    TestTable {
        name: "stringHashStringRange",
        hash_key: "hashCode",
        hash_kind: KeyKind::String,
        range_key: Some(("rangeCode", KeyKind::String)),
    },
];

// ============================================================================
// Cases
// ============================================================================

/// Dump of the records for a comma separated hash key list.
#[derive(Debug, Clone, Copy)]
pub struct HashKeysCase {
    pub table: &'static str,
    pub hash_key: &'static str,
    pub keys: &'static str,
    pub kind: KeyKind,
}

pub const HASH_KEYS_CASES: [HashKeysCase; 2] = [
    HashKeysCase {
        table: "numericHash",
        hash_key: "hashId",
        keys: "123,789,131415",
        kind: KeyKind::Number,
    },
    HashKeysCase {
        table: "stringHash",
        hash_key: "hashCode",
        keys: "abc,ghi,jkl",
        kind: KeyKind::String,
    },
];

/// Dump of every record under one hash key.
pub fn record_set_cases() -> Vec<(&'static str, KeyField)> {
    vec![
        ("numericHashNumericRange", KeyField::new("hashId", 456)),
        ("numericHashStringRange", KeyField::new("hashId", 123)),
        ("stringHashNumericRange", KeyField::new("hashCode", "456")),
        ("stringHashStringRange", KeyField::new("hashCode", "123")),
    ]
}

/// Full primary keys, used by the single record dumps and the deletes.
pub fn record_cases() -> Vec<(&'static str, KeyField, KeyField)> {
    vec![
        (
            "numericHashNumericRange",
            KeyField::new("hashId", 456),
            KeyField::new("rangeId", 2022),
        ),
        (
            "numericHashStringRange",
            KeyField::new("hashId", 789),
            KeyField::new("rangeCode", "a1"),
        ),
        (
            "stringHashNumericRange",
            KeyField::new("hashCode", "456"),
            KeyField::new("rangeId", 2022),
        ),
        (
            "stringHashStringRange",
            KeyField::new("hashCode", "123"),
            KeyField::new("rangeCode", "a1"),
        ),
    ]
}

/// Hash-only keys removed by the delete pass.
pub fn hash_delete_cases() -> Vec<(&'static str, KeyField)> {
    vec![
        ("numericHash", KeyField::new("hashId", 456)),
        ("stringHash", KeyField::new("hashCode", "def")),
    ]
}

/// Range queries on `stringHashStringRange` under hash key "456".
pub fn query_cases() -> Vec<(ComparisonOperator, Vec<Value>)> {
    vec![
        (ComparisonOperator::Between, vec![json!("b2"), json!("b3")]),
        (ComparisonOperator::Ge, vec![json!("b2")]),
        (ComparisonOperator::BeginsWith, vec![json!("b")]),
    ]
}

/// Attribute filters on `numericHash`.
pub fn filter_cases() -> Vec<(&'static str, ComparisonOperator, Vec<Value>)> {
    vec![
        ("numberField", ComparisonOperator::Between, vec![json!(202), json!(404)]),
        ("numberField", ComparisonOperator::In, vec![json!(202), json!(404)]),
        ("numberField", ComparisonOperator::Ge, vec![json!(404)]),
        ("stringField", ComparisonOperator::Between, vec![json!("ghi"), json!("jkl")]),
        ("stringField", ComparisonOperator::In, vec![json!("def"), json!("mno")]),
        ("stringField", ComparisonOperator::Ge, vec![json!("ghi")]),
        ("stringField", ComparisonOperator::BeginsWith, vec![json!("g")]),
        ("stringField", ComparisonOperator::Contains, vec![json!("e")]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_schemas() {
        let schema = TEST_TABLES[3].schema();
        assert_eq!(schema.hash_key, KeyAttribute::new("hashId", KeyKind::Number));
        assert_eq!(
            schema.range_key,
            Some(KeyAttribute::new("rangeCode", KeyKind::String))
        );
        assert_eq!(schema.read_capacity_units, CAPACITY_UNITS);
        assert!(TEST_TABLES[0].schema().range_key.is_none());
    }

    #[test]
    fn test_cases_name_known_tables() {
        let known: Vec<&str> = TEST_TABLES.iter().map(|t| t.name).collect();
        let named = HASH_KEYS_CASES
            .iter()
            .map(|c| c.table)
            .chain(record_set_cases().into_iter().map(|(t, _)| t))
            .chain(record_cases().into_iter().map(|(t, _, _)| t))
            .chain(hash_delete_cases().into_iter().map(|(t, _)| t));

        for table in named {
            assert!(known.contains(&table), "unknown table {}", table);
        }
    }

    #[test]
    fn test_filter_operands_fit_operators() {
        for (_, operator, operands) in filter_cases() {
            assert!(operator.arity().accepts(operands.len()), "{}", operator);
        }
    }
}
