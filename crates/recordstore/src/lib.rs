//! recordstore - Imperative shell for the recordstore client.
//!
//! Wires the pure building blocks of `recordstore_core` to real I/O:
//!
//! - [`client`]: `RecordStoreClient`, the configure-once entry point for
//!   every record operation.
//! - [`storage`]: `RecordStore` backends (DynamoDB and in-memory).
//! - [`dump`] / [`load`]: move records between tables and JSON files.
//! - [`config`]: settings read from the environment.

pub mod client;
pub mod config;
pub mod dump;
pub mod load;
pub mod storage;

pub use client::{ClientError, ConfigureOutcome, RecordStoreClient};
pub use config::{AwsSettings, ClientSettings};
pub use dump::{DumpError, DumpTarget};
pub use load::LoadError;
