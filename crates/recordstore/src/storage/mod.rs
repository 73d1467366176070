//! Record store backends.
//!
//! - [`inmemory`]: tables held in process memory, for tests and development.
//! - `dynamodb`: the AWS SDK backend (feature `dynamodb`, on by default).

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod inmemory;
