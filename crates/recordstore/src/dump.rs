//! Dump records to JSON files.
//!
//! Records are written as pretty-printed JSON arrays, either to a single
//! `<folder>/<base>.json` or split into `<folder>/<base>.<n>.json` chunks
//! (numbered from 1). Files are written one after another.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use recordstore_core::{Conditions, KeyField, QuerySpec, Record, RecordStore};

use crate::client::{ClientError, RecordStoreClient};

/// Errors that can occur while dumping records.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for dump operations.
pub type Result<T> = std::result::Result<T, DumpError>;

/// Where and how to write dumped records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpTarget {
    pub folder: PathBuf,
    pub base_name: String,
    /// Split into files of at most this many records. `None` (or zero)
    /// writes a single file.
    pub records_per_file: Option<usize>,
}

impl DumpTarget {
    pub fn new(folder: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            base_name: base_name.into(),
            records_per_file: None,
        }
    }

    pub fn with_records_per_file(mut self, records_per_file: usize) -> Self {
        self.records_per_file = Some(records_per_file);
        self
    }

    fn chunk_size(&self) -> Option<usize> {
        self.records_per_file.filter(|n| *n > 0)
    }

    fn single_file(&self) -> Self {
        Self {
            records_per_file: None,
            ..self.clone()
        }
    }

    /// Path of the single file, or of chunk `number` (1-based).
    pub fn file_path(&self, number: Option<usize>) -> PathBuf {
        let file_name = match number {
            Some(n) => format!("{}.{}.json", self.base_name, n),
            None => format!("{}.json", self.base_name),
        };
        self.folder.join(file_name)
    }
}

/// Split records into chunks of at most `records_per_file`.
///
/// Without a chunk size there is exactly one chunk, even when it is empty.
/// With one, no records means no chunks.
pub fn chunk_records(records: &[Record], records_per_file: Option<usize>) -> Vec<&[Record]> {
    match records_per_file.filter(|n| *n > 0) {
        Some(size) => records.chunks(size).collect(),
        None => vec![records],
    }
}

async fn write_file(path: &Path, chunk: &[Record]) -> Result<()> {
    let json = serde_json::to_string_pretty(chunk)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| DumpError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Write records to the target, returning the paths written in order.
pub async fn write_records(records: &[Record], target: &DumpTarget) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(&target.folder)
        .await
        .map_err(|source| DumpError::Write {
            path: target.folder.clone(),
            source,
        })?;

    let chunked = target.chunk_size().is_some();
    let mut written = Vec::new();

    for (index, chunk) in chunk_records(records, target.chunk_size()).into_iter().enumerate() {
        let path = target.file_path(chunked.then_some(index + 1));
        if let Err(e) = write_file(&path, chunk).await {
            tracing::error!(path = %path.display(), error = %e, "Could not write dump file");
            return Err(e);
        }

        tracing::warn!(
            records = chunk.len(),
            path = %path.display(),
            "Dumped data records to file"
        );
        written.push(path);
    }

    Ok(written)
}

// ============================================================================
// Dump front-ends
// ============================================================================

/// Dump every record of a table.
pub async fn dump_table<S: RecordStore>(
    client: &RecordStoreClient<S>,
    table: &str,
    target: &DumpTarget,
) -> Result<Vec<PathBuf>> {
    tracing::debug!(table, "Dumping table");
    let records = client.get_all_records(table).await?;
    write_records(&records, target).await
}

/// Dump the records for a list of hash keys, skipping keys with no record.
pub async fn dump_hash_keys<S: RecordStore>(
    client: &RecordStoreClient<S>,
    table: &str,
    hash_key_name: &str,
    hash_key_values: &[Value],
    target: &DumpTarget,
) -> Result<Vec<PathBuf>> {
    tracing::debug!(table, keys = hash_key_values.len(), "Dumping hash key records");
    let records = client
        .get_records_for_hash_keys(table, hash_key_name, hash_key_values)
        .await?;
    write_records(&records, target).await
}

/// Dump every record under one hash key.
pub async fn dump_hash_key_record_set<S: RecordStore>(
    client: &RecordStoreClient<S>,
    table: &str,
    hash_key: &KeyField,
    target: &DumpTarget,
) -> Result<Vec<PathBuf>> {
    tracing::debug!(table, hash_value = %hash_key.value, "Dumping hash key record set");
    let records = client.get_records_for_hash_key(table, hash_key).await?;
    write_records(&records, target).await
}

/// Dump a single record to a single file (empty array when missing).
pub async fn dump_record<S: RecordStore>(
    client: &RecordStoreClient<S>,
    table: &str,
    hash_key: &KeyField,
    range_key: Option<&KeyField>,
    target: &DumpTarget,
) -> Result<Vec<PathBuf>> {
    tracing::debug!(table, hash_value = %hash_key.value, "Dumping record");
    let record = client
        .get_record_for_hash_and_range_key(table, hash_key, range_key)
        .await?;
    let records: Vec<Record> = record.into_iter().collect();
    write_records(&records, &target.single_file()).await
}

/// Dump the result of a hash/range query to a single file.
pub async fn dump_query<S: RecordStore>(
    client: &RecordStoreClient<S>,
    table: &str,
    spec: &QuerySpec,
    target: &DumpTarget,
) -> Result<Vec<PathBuf>> {
    tracing::debug!(table, hash_value = %spec.hash_key.value, "Dumping query");
    let records = client.query_records(table, spec).await?;
    write_records(&records, &target.single_file()).await
}

/// Dump the result of an attribute filter scan to a single file.
pub async fn dump_filter<S: RecordStore>(
    client: &RecordStoreClient<S>,
    table: &str,
    filter: Conditions,
    target: &DumpTarget,
) -> Result<Vec<PathBuf>> {
    tracing::debug!(table, "Dumping filter");
    let records = client.filter_records(table, filter).await?;
    write_records(&records, &target.single_file()).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {}", other),
        }
    }

    fn records(count: i64) -> Vec<Record> {
        (1..=count).map(|i| record(json!({"hashId": i}))).collect()
    }

    #[test]
    fn test_chunk_records() {
        let all = records(25);

        let chunks = chunk_records(&all, Some(10));
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);

        assert_eq!(chunk_records(&all, None).len(), 1);
        assert_eq!(chunk_records(&all, Some(0)).len(), 1);
    }

    #[test]
    fn test_chunk_records_empty() {
        assert_eq!(chunk_records(&[], None), vec![&[] as &[Record]]);
        assert!(chunk_records(&[], Some(10)).is_empty());
    }

    #[test]
    fn test_file_paths() {
        let target = DumpTarget::new("/tmp/dumps", "dump.numericHash");
        assert_eq!(
            target.file_path(None),
            PathBuf::from("/tmp/dumps/dump.numericHash.json")
        );
        assert_eq!(
            target.file_path(Some(2)),
            PathBuf::from("/tmp/dumps/dump.numericHash.2.json")
        );
    }

    #[tokio::test]
    async fn test_write_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = DumpTarget::new(dir.path(), "dump.numericHash");

        let written = write_records(&records(2), &target).await.unwrap();

        assert_eq!(written, vec![dir.path().join("dump.numericHash.json")]);
        let text = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(
            text,
            "[\n  {\n    \"hashId\": 1\n  },\n  {\n    \"hashId\": 2\n  }\n]"
        );
    }

    #[tokio::test]
    async fn test_write_chunked_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = DumpTarget::new(dir.path(), "dump").with_records_per_file(10);

        let written = write_records(&records(21), &target).await.unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("dump.1.json"),
                dir.path().join("dump.2.json"),
                dir.path().join("dump.3.json"),
            ]
        );
        let last: Vec<Record> =
            serde_json::from_str(&std::fs::read_to_string(&written[2]).unwrap()).unwrap();
        assert_eq!(last, vec![record(json!({"hashId": 21}))]);
    }

    #[tokio::test]
    async fn test_write_empty_dump() {
        let dir = tempfile::tempdir().unwrap();

        let single = write_records(&[], &DumpTarget::new(dir.path(), "empty"))
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&single[0]).unwrap(), "[]");

        let chunked = write_records(&[], &DumpTarget::new(dir.path(), "none").with_records_per_file(5))
            .await
            .unwrap();
        assert!(chunked.is_empty());
    }
}
