//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of the `RecordStore`
//! trait using `aws-sdk-dynamodb`.

mod conversions;
mod error;
mod store;

pub use store::DynamoDbStore;
