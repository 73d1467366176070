//! Dump verification against reference files.
//!
//! Deterministic dumps (keyed lookups and queries) must match their
//! reference text exactly, ignoring carriage returns. Scans come back in an
//! order the store picks, so whole-table and filter dumps are compared as
//! record multisets, across every chunk file.

use std::path::{Path, PathBuf};

use recordstore::load::parse_records;
use recordstore_core::Record;

use super::error::{IntegrationError, Result};

/// Text with carriage returns removed.
pub fn without_carriage_returns(text: &str) -> String {
    text.replace('\r', "")
}

/// Canonical text form of each record, sorted.
///
/// `serde_json::Map` keeps keys sorted, so equal records serialize equally.
fn canonical(records: &[Record]) -> Vec<String> {
    let mut texts: Vec<String> = records
        .iter()
        .map(|r| serde_json::Value::Object(r.clone()).to_string())
        .collect();
    texts.sort();
    texts
}

/// Whether two record lists hold the same records, in any order.
pub fn same_records(actual: &[Record], expected: &[Record]) -> bool {
    canonical(actual) == canonical(expected)
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IntegrationError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Compare a dump file with its reference, ignoring carriage returns.
pub async fn verify_text(dump: &Path, reference: &Path) -> Result<bool> {
    let actual = read(dump).await?;
    let expected = read(reference).await?;
    Ok(without_carriage_returns(&actual) == without_carriage_returns(&expected))
}

/// Compare the records of one or more dump files with a reference file.
pub async fn verify_records(dumps: &[PathBuf], reference: &Path) -> Result<bool> {
    let mut actual = Vec::new();
    for dump in dumps {
        actual.extend(parse_records(dump, &read(dump).await?)?);
    }
    let expected = parse_records(reference, &read(reference).await?)?;

    if !same_records(&actual, &expected) {
        tracing::debug!(
            actual = actual.len(),
            expected = expected.len(),
            reference = %reference.display(),
            "Record mismatch"
        );
        return Ok(false);
    }
    Ok(true)
}
