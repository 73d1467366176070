//! Error types for integration test operations.

use std::path::PathBuf;

use thiserror::Error;

use recordstore::{ClientError, DumpError, LoadError};

/// Result type alias for integration module.
pub type Result<T> = std::result::Result<T, IntegrationError>;

/// Errors that can occur during integration test operations.
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("Could not reach the record store at {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Dump(#[from] DumpError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected result: {0}")]
    Unexpected(String),

    #[error("{failed} of {total} integration steps failed")]
    TestFailed { failed: usize, total: usize },
}
