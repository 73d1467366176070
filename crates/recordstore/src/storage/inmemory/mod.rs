//! In-memory storage backend for testing.
//!
//! This module provides an in-memory implementation of the `RecordStore`
//! trait that keeps every table in a `BTreeMap` ordered by primary key,
//! wrapped in `Arc<RwLock<_>>`. It is useful for tests and development where
//! no DynamoDB endpoint is available.
//!
//! # Example
//!
//! ```rust,ignore
//! use recordstore::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! store.set_page_size(Some(2)); // exercise pagination
//! ```

mod evaluate;
mod store;

pub use store::InMemoryStore;
