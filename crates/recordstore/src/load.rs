//! Load records from a JSON file into a table.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use recordstore_core::{Record, RecordStore};

use crate::client::{ClientError, RecordStoreClient};

/// Errors that can occur while loading records.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} does not contain a JSON array", path.display())]
    NotAnArray { path: PathBuf },
    #[error("Entry {index} in {} is not a JSON object", path.display())]
    NotARecord { path: PathBuf, index: usize },
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Result type for load operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Close an array whose last entry was left with a trailing comma.
///
/// Hand-maintained data files are often appended to with a trailing comma
/// and no closing bracket; that comma becomes the `]`.
pub fn terminate_json_array(text: &str) -> String {
    let trimmed = text.trim_end();
    match trimmed.strip_suffix(',') {
        Some(body) => format!("{}]", body),
        None => trimmed.to_string(),
    }
}

/// Parse records from JSON array text.
pub fn parse_records(path: &Path, text: &str) -> Result<Vec<Record>> {
    let value: Value =
        serde_json::from_str(&terminate_json_array(text)).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let Value::Array(entries) = value else {
        return Err(LoadError::NotAnArray {
            path: path.to_path_buf(),
        });
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(record) => Ok(record),
            _ => Err(LoadError::NotARecord {
                path: path.to_path_buf(),
                index,
            }),
        })
        .collect()
}

/// Read records from a JSON array file.
pub async fn read_records(path: &Path) -> Result<Vec<Record>> {
    tracing::debug!(path = %path.display(), "Reading data file");
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), "Loaded data from file");

    let records = parse_records(path, &text)?;
    tracing::info!(records = records.len(), "Parsed input records");
    Ok(records)
}

/// Insert every record of a data file into a table, one at a time.
///
/// Returns the number of records inserted.
pub async fn load_table<S: RecordStore>(
    client: &RecordStoreClient<S>,
    table: &str,
    path: &Path,
) -> Result<usize> {
    tracing::debug!(table, path = %path.display(), "Loading table from data file");

    let records = match read_records(path).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Could not read data file");
            return Err(e);
        }
    };

    client.put_records(table, &records).await?;

    tracing::warn!(records = records.len(), table, "Inserted records");
    Ok(records.len())
}
