mod error;
mod traits;
mod types;

pub use error::{Result, StoreError};
pub use traits::RecordStore;
pub use types::{
    CreateTableRequest, DeleteItemRequest, GetItemRequest, KeyAttribute, KeyKind, PutItemRequest,
    QueryRequest, ResultPage, ScanRequest, TableSchema,
};
