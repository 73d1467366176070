use async_trait::async_trait;

use crate::codec::WireItem;
use crate::store::{QueryRequest, RecordStore, ResultPage, ScanRequest, StoreError};

/// Something that can produce one page of results given a continuation
/// cursor.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, cursor: Option<WireItem>) -> Result<ResultPage, StoreError>;

    /// Short description used in log events.
    fn label(&self) -> &str;
}

/// Pages of a query against a [`RecordStore`].
pub struct QueryPages<'a, S: ?Sized> {
    store: &'a S,
    request: QueryRequest,
}

impl<'a, S: RecordStore + ?Sized> QueryPages<'a, S> {
    pub fn new(store: &'a S, request: QueryRequest) -> Self {
        Self { store, request }
    }
}

#[async_trait]
impl<S: RecordStore + ?Sized> PageSource for QueryPages<'_, S> {
    async fn fetch_page(&self, cursor: Option<WireItem>) -> Result<ResultPage, StoreError> {
        let mut request = self.request.clone();
        request.exclusive_start_key = cursor;
        self.store.query(request).await
    }

    fn label(&self) -> &str {
        &self.request.table_name
    }
}

/// Pages of a scan against a [`RecordStore`].
pub struct ScanPages<'a, S: ?Sized> {
    store: &'a S,
    request: ScanRequest,
}

impl<'a, S: RecordStore + ?Sized> ScanPages<'a, S> {
    pub fn new(store: &'a S, request: ScanRequest) -> Self {
        Self { store, request }
    }
}

#[async_trait]
impl<S: RecordStore + ?Sized> PageSource for ScanPages<'_, S> {
    async fn fetch_page(&self, cursor: Option<WireItem>) -> Result<ResultPage, StoreError> {
        let mut request = self.request.clone();
        request.exclusive_start_key = cursor;
        self.store.scan(request).await
    }

    fn label(&self) -> &str {
        &self.request.table_name
    }
}
