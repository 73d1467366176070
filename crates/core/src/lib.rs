//! recordstore_core - Functional core for the recordstore client.
//!
//! Pure building blocks with no network access:
//!
//! - [`codec`]: lossless conversion between schema-less records and the
//!   store's tagged wire attributes.
//! - [`condition`]: comparison operators and the key-condition / scan-filter
//!   builder for hash/range queries.
//! - [`pagination`]: the cursor-following fetcher that drains paged results.
//! - [`store`]: the remote store capability trait and its request/response
//!   types, implemented by the shell crate.
//! - [`table_name`]: logical to physical table name mapping.

pub mod codec;
pub mod condition;
pub mod pagination;
pub mod store;
pub mod table_name;

pub use codec::{CodecError, Record, WireAttribute, WireItem};
pub use condition::{
    ComparisonOperator, Condition, Conditions, KeyField, QueryConditions, QuerySpec,
};
pub use pagination::{FetchError, PaginatedFetcher};
pub use store::{KeyAttribute, KeyKind, RecordStore, ResultPage, StoreError, TableSchema};
pub use table_name::TableNameMapper;
