//! Integration test harness.
//!
//! Runs the full client sequence against a local DynamoDB endpoint: create
//! the test tables, load the fixtures, dump every table (whole and chunked),
//! then the keyed dumps, range queries, attribute filters and deletes, each
//! verified against the files in `xtask/fixtures/reference`.
//!
//! # Usage
//!
//! ```bash
//! # Start DynamoDB Local first, e.g.
//! docker run -p 8000:8000 amazon/dynamodb-local
//!
//! cargo xtask integration
//! cargo xtask integration --endpoint-url http://localhost:9090 --keep-dumps
//! ```

pub mod error;
pub mod tables;
pub mod verify;

pub use error::{IntegrationError, Result};

use std::path::{Path, PathBuf};

use recordstore::dump::{self, DumpTarget};
use recordstore::load;
use recordstore::storage::dynamodb::DynamoDbStore;
use recordstore::{AwsSettings, ClientSettings, RecordStoreClient};
use recordstore_core::condition::attribute_filter;
use recordstore_core::{ComparisonOperator, KeyField, KeyKind, QuerySpec};

use crate::prelude::*;
use tables::{
    filter_cases, hash_delete_cases, query_cases, record_cases, record_set_cases, HashKeysCase,
    HASH_KEYS_CASES, RECORDS_PER_FILE, TABLE_PREFIX, TABLE_SUFFIX, TEST_TABLES,
};

/// Default DynamoDB Local endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Integration test command.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Run the integration sequence against a local DynamoDB endpoint.

The endpoint must already be running. Tables are created with the
'alternator-' prefix and '-test' suffix and are left in place. Tables
that already exist are reused and reloaded from the fixtures.

Environment variables:
  AWS_ENDPOINT_URL    - Override DynamoDB endpoint (default: http://localhost:8000)")]
pub struct IntegrationCommand {
    /// DynamoDB endpoint to test against.
    #[arg(long, default_value = DEFAULT_ENDPOINT, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: String,

    /// Folder holding `data/` and `reference/` fixtures.
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"))]
    pub fixtures: PathBuf,

    /// Folder the dump files are written to.
    #[arg(long, default_value = "target/xtask-integration")]
    pub output: PathBuf,

    /// Keep the dump files after a successful run.
    #[arg(long)]
    pub keep_dumps: bool,
}

type Client = RecordStoreClient<DynamoDbStore>;

/// Paths and client shared by every step.
struct Harness<'a> {
    client: &'a Client,
    data: PathBuf,
    reference: PathBuf,
    output: PathBuf,
}

impl Harness<'_> {
    fn target(&self, base_name: &str) -> DumpTarget {
        DumpTarget::new(&self.output, base_name)
    }

    fn reference_file(&self, base_name: &str) -> PathBuf {
        self.reference.join(format!("reference.{}.json", base_name))
    }
}

/// Pass/fail tally, printed as steps complete.
#[derive(Debug, Default)]
struct Report {
    passed: usize,
    failed: Vec<String>,
    silent: bool,
}

impl Report {
    fn new(global: &crate::Global) -> Self {
        Self {
            silent: global.is_silent(),
            ..Self::default()
        }
    }

    fn record(&mut self, step: &str, outcome: Result<bool>) {
        match outcome {
            Ok(true) => {
                self.passed += 1;
                if !self.silent {
                    aprintln!("{} {}", p_g("  ✓"), step);
                }
            }
            Ok(false) => {
                aprintln!("{} {} {}", p_r("  ✗"), step, p_r("(mismatch)"));
                self.failed.push(step.to_string());
            }
            Err(e) => {
                aprintln!("{} {} {}", p_r("  ✗"), step, p_r(&e.to_string()));
                self.failed.push(step.to_string());
            }
        }
    }

    fn total(&self) -> usize {
        self.passed + self.failed.len()
    }
}

/// Main entry point for integration command.
pub async fn run(command: IntegrationCommand, global: crate::Global) -> Result<()> {
    let aws = AwsSettings::emulator(&command.endpoint_url);

    if !global.is_silent() {
        aprintln!("{}", p_b("Integration Tests"));
        aprintln!();
        aprintln!("{} {}", p_b("Target:"), aws.target_display());
        aprintln!("{} {}", p_b("Output:"), command.output.display());
        aprintln!();
    }

    tokio::fs::create_dir_all(&command.output)
        .await
        .map_err(|source| IntegrationError::Read {
            path: command.output.clone(),
            source,
        })?;

    let store = DynamoDbStore::from_settings(&aws).await;
    let client = RecordStoreClient::new(
        store,
        ClientSettings::with_table_names(TABLE_PREFIX, TABLE_SUFFIX),
    );
    client
        .configure()
        .await
        .map_err(|source| IntegrationError::Connection {
            endpoint: command.endpoint_url.clone(),
            source,
        })?;

    let harness = Harness {
        client: &client,
        data: command.fixtures.join("data"),
        reference: command.fixtures.join("reference"),
        output: command.output.clone(),
    };

    // Setup failures stop the run; later steps depend on the data.
    setup(&harness, &global).await?;

    let mut report = Report::new(&global);
    run_dump_steps(&harness, &mut report).await;
    run_keyed_steps(&harness, &mut report).await;
    run_query_steps(&harness, &mut report).await;
    run_delete_steps(&harness, &mut report).await;

    aprintln!();
    if report.failed.is_empty() {
        if !command.keep_dumps {
            remove_output(&command.output).await;
        }
        aprintln!(
            "{} {}",
            p_g("✅"),
            p_g(&format!("All {} integration steps passed!", report.total()))
        );
        Ok(())
    } else {
        for step in &report.failed {
            aprintln!("{} {}", p_r("  failed:"), step);
        }
        aprintln!(
            "{} {}",
            p_y("⚠️"),
            format!("Dump files left in {}", command.output.display())
        );
        Err(IntegrationError::TestFailed {
            failed: report.failed.len(),
            total: report.total(),
        })
    }
}

// ============================================================================
// Steps
// ============================================================================

async fn setup(harness: &Harness<'_>, global: &crate::Global) -> Result<()> {
    if !global.is_silent() {
        aprintln!("{} {}", p_b("📦"), "Creating and loading test tables...");
    }

    for table in TEST_TABLES {
        let name = harness.client.create_table(table.name, table.schema()).await?;
        let data_file = harness.data.join(format!("{}.json", table.name));
        let count = load::load_table(harness.client, table.name, &data_file).await?;

        if global.is_verbose() {
            aprintln!("{} {} records into {}", p_b("  →"), count, name);
        }
    }

    if !global.is_silent() {
        aprintln!("{} {}", p_g("✅"), "Test tables ready");
    }
    Ok(())
}

async fn run_dump_steps(harness: &Harness<'_>, report: &mut Report) {
    for table in TEST_TABLES {
        let outcome = dump_whole_table(harness, table.name, None).await;
        report.record(&format!("dump table {}", table.name), outcome);

        let outcome = dump_whole_table(harness, table.name, Some(RECORDS_PER_FILE)).await;
        report.record(&format!("dump table {} in chunks", table.name), outcome);
    }
}

async fn dump_whole_table(
    harness: &Harness<'_>,
    table: &str,
    records_per_file: Option<usize>,
) -> Result<bool> {
    let base_name = format!("dump.{}", table);
    let target = match records_per_file {
        Some(n) => harness
            .target(&format!("dump.chunked.{}", table))
            .with_records_per_file(n),
        None => harness.target(&base_name),
    };

    let paths = dump::dump_table(harness.client, table, &target).await?;
    verify::verify_records(&paths, &harness.reference_file(&base_name)).await
}

async fn run_keyed_steps(harness: &Harness<'_>, report: &mut Report) {
    for case in HASH_KEYS_CASES {
        let outcome = dump_hash_keys(harness, &case).await;
        report.record(&format!("dump hash keys {}", case.table), outcome);
    }

    for (table, hash_key) in record_set_cases() {
        let base_name = format!("dump.hashKeyRecordSet.{}", table);
        let outcome = match dump::dump_hash_key_record_set(
            harness.client,
            table,
            &hash_key,
            &harness.target(&base_name),
        )
        .await
        {
            Ok(paths) => verify_single(&paths, &harness.reference_file(&base_name)).await,
            Err(e) => Err(e.into()),
        };
        report.record(&format!("dump hash key record set {}", table), outcome);
    }

    for (table, hash_key, range_key) in record_cases() {
        let base_name = format!("dump.hashRangeRecord.{}", table);
        let outcome = match dump::dump_record(
            harness.client,
            table,
            &hash_key,
            Some(&range_key),
            &harness.target(&base_name),
        )
        .await
        {
            Ok(paths) => verify_single(&paths, &harness.reference_file(&base_name)).await,
            Err(e) => Err(e.into()),
        };
        report.record(&format!("dump hash/range record {}", table), outcome);
    }
}

async fn dump_hash_keys(harness: &Harness<'_>, case: &HashKeysCase) -> Result<bool> {
    let base_name = format!("dump.hashKey.{}", case.table);
    let values = parse_keys(case.hash_key, case.keys, case.kind)?;
    let paths = dump::dump_hash_keys(
        harness.client,
        case.table,
        case.hash_key,
        &values,
        &harness.target(&base_name),
    )
    .await?;
    verify_single(&paths, &harness.reference_file(&base_name)).await
}

const QUERY_TABLE: &str = "stringHashStringRange";
const FILTER_TABLE: &str = "numericHash";

async fn run_query_steps(harness: &Harness<'_>, report: &mut Report) {
    for (operator, operands) in query_cases() {
        let outcome = range_query(harness, operator, operands).await;
        report.record(&format!("query {} {}", QUERY_TABLE, operator), outcome);
    }

    for (attribute, operator, operands) in filter_cases() {
        let outcome = attribute_filter_dump(harness, attribute, operator, &operands).await;
        report.record(
            &format!("filter {} {} {}", FILTER_TABLE, attribute, operator),
            outcome,
        );
    }
}

async fn range_query(
    harness: &Harness<'_>,
    operator: ComparisonOperator,
    operands: Vec<serde_json::Value>,
) -> Result<bool> {
    let base_name = format!("dump.hashRangeQuery.{}.{}", operator, QUERY_TABLE);
    let spec = QuerySpec::for_hash_key("hashCode", "456")
        .with_comparison(operator)
        .with_range("rangeCode", operands);

    let paths =
        dump::dump_query(harness.client, QUERY_TABLE, &spec, &harness.target(&base_name)).await?;
    verify_single(&paths, &harness.reference_file(&base_name)).await
}

async fn attribute_filter_dump(
    harness: &Harness<'_>,
    attribute: &str,
    operator: ComparisonOperator,
    operands: &[serde_json::Value],
) -> Result<bool> {
    let base_name = format!("dump.testFilter.{}.{}.{}", attribute, operator, FILTER_TABLE);
    let filter = attribute_filter(attribute, operator, operands)
        .map_err(|e| IntegrationError::Unexpected(e.to_string()))?;

    let paths = dump::dump_filter(
        harness.client,
        FILTER_TABLE,
        filter,
        &harness.target(&base_name),
    )
    .await?;
    verify::verify_records(&paths, &harness.reference_file(&base_name)).await
}

async fn run_delete_steps(harness: &Harness<'_>, report: &mut Report) {
    let cases = hash_delete_cases()
        .into_iter()
        .map(|(table, hash_key)| (table, hash_key, None))
        .chain(
            record_cases()
                .into_iter()
                .map(|(table, hash_key, range_key)| (table, hash_key, Some(range_key))),
        );

    for (table, hash_key, range_key) in cases {
        let outcome = delete_and_verify(harness, table, &hash_key, range_key.as_ref()).await;
        report.record(&format!("delete record {}", table), outcome);
    }
}

/// Delete a record, check the returned prior record, then dump what is left.
async fn delete_and_verify(
    harness: &Harness<'_>,
    table: &str,
    hash_key: &KeyField,
    range_key: Option<&KeyField>,
) -> Result<bool> {
    let old = harness
        .client
        .delete_record(table, hash_key, range_key)
        .await?
        .ok_or_else(|| IntegrationError::Unexpected(format!("{} returned no prior record", table)))?;

    for key in std::iter::once(hash_key).chain(range_key) {
        if old.get(&key.name) != Some(&key.value) {
            return Err(IntegrationError::Unexpected(format!(
                "{} returned a prior record with {} = {:?}",
                table,
                key.name,
                old.get(&key.name)
            )));
        }
    }

    let base_name = format!("dump.testDeleteRecord.{}", table);
    let paths = dump::dump_table(harness.client, table, &harness.target(&base_name)).await?;
    verify::verify_records(&paths, &harness.reference_file(&base_name)).await
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_keys(name: &str, keys: &str, kind: KeyKind) -> Result<Vec<serde_json::Value>> {
    keys.split(',')
        .map(|key| {
            kind.typed_value(name, key.trim())
                .map_err(|e| IntegrationError::Unexpected(e.to_string()))
        })
        .collect()
}

async fn verify_single(paths: &[PathBuf], reference: &Path) -> Result<bool> {
    match paths {
        [dump] => verify::verify_text(dump, reference).await,
        _ => Err(IntegrationError::Unexpected(format!(
            "expected one dump file, got {}",
            paths.len()
        ))),
    }
}

/// Removes the dump directory after a clean run. Returns whether it is gone.
async fn remove_output(path: &Path) -> bool {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Could not remove dump directory; stale dumps may remain"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(
            parse_keys("hashId", "123, 789", KeyKind::Number).unwrap(),
            vec![json!(123), json!(789)]
        );
        assert!(parse_keys("hashId", "abc", KeyKind::Number).is_err());
    }

    #[tokio::test]
    async fn test_verify_single_requires_one_file() {
        let result = verify_single(&[], Path::new("reference.json")).await;
        assert!(matches!(result, Err(IntegrationError::Unexpected(_))));
    }

    #[test]
    fn test_report_tally() {
        let mut report = Report {
            silent: true,
            ..Report::default()
        };
        report.record("first", Ok(true));
        report.record("second", Ok(false));
        report.record("third", Err(IntegrationError::Unexpected("boom".to_string())));

        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, vec!["second", "third"]);
        assert_eq!(report.total(), 3);
    }

    #[tokio::test]
    async fn test_remove_output() {
        let dir = tempfile::tempdir().unwrap();

        let output = dir.path().join("dumps");
        std::fs::create_dir_all(&output).unwrap();
        std::fs::write(output.join("dump.numericHash.json"), "[]").unwrap();
        assert!(remove_output(&output).await);
        assert!(!output.exists());

        assert!(remove_output(&dir.path().join("missing")).await);

        let not_a_dir = dir.path().join("file.json");
        std::fs::write(&not_a_dir, "[]").unwrap();
        assert!(!remove_output(&not_a_dir).await);
        assert!(not_a_dir.exists());
    }
}
