use async_trait::async_trait;

use crate::codec::WireItem;

use super::{
    CreateTableRequest, DeleteItemRequest, GetItemRequest, PutItemRequest, QueryRequest,
    Result, ResultPage, ScanRequest,
};

/// The remote record store capability.
///
/// Implementations speak the tagged wire format only; encoding, decoding and
/// pagination are handled by the caller.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Gets a single item by primary key. `None` when the key is not present.
    async fn get_item(&self, request: GetItemRequest) -> Result<Option<WireItem>>;

    /// Inserts or replaces an item, returning the previous one if any.
    async fn put_item(&self, request: PutItemRequest) -> Result<Option<WireItem>>;

    /// Deletes an item by primary key, returning the previous one if any.
    async fn delete_item(&self, request: DeleteItemRequest) -> Result<Option<WireItem>>;

    /// Fetches one page of a key-condition query.
    async fn query(&self, request: QueryRequest) -> Result<ResultPage>;

    /// Fetches one page of a scan.
    async fn scan(&self, request: ScanRequest) -> Result<ResultPage>;

    /// Lists up to `limit` table names.
    async fn list_tables(&self, limit: i32) -> Result<Vec<String>>;

    /// Creates a table. An existing table is reported as
    /// [`StoreError::ResourceInUse`](super::StoreError::ResourceInUse).
    async fn create_table(&self, request: CreateTableRequest) -> Result<()>;

    /// Human-readable description of where this store lives.
    fn endpoint(&self) -> String;
}
