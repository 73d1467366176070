use recordstore_core::codec::{decode_item, decode_items, encode_record};
use recordstore_core::condition::{build_query_conditions, key_item};
use recordstore_core::pagination::{QueryPages, ScanPages};
use recordstore_core::store::{
    CreateTableRequest, DeleteItemRequest, GetItemRequest, PutItemRequest, QueryRequest,
    ScanRequest,
};
use recordstore_core::{
    Conditions, KeyField, QuerySpec, Record, RecordStore, StoreError, TableSchema,
};

use super::{log_error, RecordStoreClient, Result};

// ============================================================================
// Reads
// ============================================================================

impl<S: RecordStore> RecordStoreClient<S> {
    /// Scans the whole table, following every continuation cursor.
    pub async fn get_all_records(&self, table: &str) -> Result<Vec<Record>> {
        const OP: &str = "get_all_records";
        self.ensure_configured(OP)?;

        let long_name = self.table_name(table);
        tracing::debug!(table, long_name = %long_name, "Scanning table");

        let source = ScanPages::new(&self.store, ScanRequest::new(&long_name));
        let items = self
            .fetcher
            .drain(&source)
            .await
            .map_err(log_error(OP, &long_name))?;

        decode_items(&items).map_err(log_error(OP, &long_name))
    }

    /// Gets the record with the given hash key from a hash-only table.
    pub async fn get_record_for_hash_key(
        &self,
        table: &str,
        hash_key: &KeyField,
    ) -> Result<Option<Record>> {
        self.get_record("get_record_for_hash_key", table, hash_key, None)
            .await
    }

    /// Gets the record with the given hash and (optional) range key.
    pub async fn get_record_for_hash_and_range_key(
        &self,
        table: &str,
        hash_key: &KeyField,
        range_key: Option<&KeyField>,
    ) -> Result<Option<Record>> {
        self.get_record("get_record_for_hash_and_range_key", table, hash_key, range_key)
            .await
    }

    async fn get_record(
        &self,
        operation: &'static str,
        table: &str,
        hash_key: &KeyField,
        range_key: Option<&KeyField>,
    ) -> Result<Option<Record>> {
        self.ensure_configured(operation)?;

        let long_name = self.table_name(table);
        tracing::debug!(
            operation,
            long_name = %long_name,
            hash_key = %hash_key.name,
            hash_value = %hash_key.value,
            range_key = ?range_key.map(|k| &k.name),
            "Getting record"
        );

        let key = key_item(hash_key, range_key).map_err(log_error(operation, &long_name))?;
        let item = self
            .store
            .get_item(GetItemRequest {
                table_name: long_name.clone(),
                key,
                consistent_read: false,
            })
            .await
            .map_err(log_error(operation, &long_name))?;

        match item {
            Some(item) => decode_item(&item).map_err(log_error(operation, &long_name)),
            None => Ok(None),
        }
    }

    /// Queries every record sharing one hash key.
    pub async fn get_records_for_hash_key(
        &self,
        table: &str,
        hash_key: &KeyField,
    ) -> Result<Vec<Record>> {
        let spec = QuerySpec::for_hash_key(hash_key.name.clone(), hash_key.value.clone());
        self.run_query("get_records_for_hash_key", table, &spec)
            .await
    }

    /// Queries by hash key with an optional range key condition.
    pub async fn query_records(&self, table: &str, spec: &QuerySpec) -> Result<Vec<Record>> {
        self.run_query("query_records", table, spec).await
    }

    async fn run_query(
        &self,
        operation: &'static str,
        table: &str,
        spec: &QuerySpec,
    ) -> Result<Vec<Record>> {
        self.ensure_configured(operation)?;

        let long_name = self.table_name(table);
        tracing::debug!(
            operation,
            long_name = %long_name,
            hash_key = %spec.hash_key.name,
            comparison = ?spec.comparison,
            "Querying table"
        );

        let conditions = build_query_conditions(spec).map_err(log_error(operation, &long_name))?;
        let source = QueryPages::new(&self.store, QueryRequest::new(&long_name, conditions));
        let items = self
            .fetcher
            .drain(&source)
            .await
            .map_err(log_error(operation, &long_name))?;

        decode_items(&items).map_err(log_error(operation, &long_name))
    }

    /// Scans the whole table keeping only records that pass `filter`.
    pub async fn filter_records(&self, table: &str, filter: Conditions) -> Result<Vec<Record>> {
        const OP: &str = "filter_records";
        self.ensure_configured(OP)?;

        let long_name = self.table_name(table);
        tracing::debug!(
            long_name = %long_name,
            attributes = ?filter.keys().collect::<Vec<_>>(),
            "Filtering table"
        );

        let source = ScanPages::new(&self.store, ScanRequest::new(&long_name).with_filter(filter));
        let items = self
            .fetcher
            .drain(&source)
            .await
            .map_err(log_error(OP, &long_name))?;

        decode_items(&items).map_err(log_error(OP, &long_name))
    }
}

// ============================================================================
// Writes
// ============================================================================

impl<S: RecordStore> RecordStoreClient<S> {
    /// Inserts or replaces a record, returning the one it replaced.
    pub async fn put_record(&self, table: &str, record: &Record) -> Result<Option<Record>> {
        const OP: &str = "put_record";
        self.ensure_configured(OP)?;

        let long_name = self.table_name(table);
        tracing::debug!(long_name = %long_name, fields = record.len(), "Putting record");

        let item = encode_record(record).map_err(log_error(OP, &long_name))?;
        let previous = self
            .store
            .put_item(PutItemRequest {
                table_name: long_name.clone(),
                item,
            })
            .await
            .map_err(log_error(OP, &long_name))?;

        match previous {
            Some(previous) => decode_item(&previous).map_err(log_error(OP, &long_name)),
            None => Ok(None),
        }
    }

    /// Deletes a record by key, returning the deleted record.
    pub async fn delete_record(
        &self,
        table: &str,
        hash_key: &KeyField,
        range_key: Option<&KeyField>,
    ) -> Result<Option<Record>> {
        const OP: &str = "delete_record";
        self.ensure_configured(OP)?;

        let long_name = self.table_name(table);
        tracing::debug!(
            long_name = %long_name,
            hash_key = %hash_key.name,
            hash_value = %hash_key.value,
            range_key = ?range_key.map(|k| &k.name),
            "Deleting record"
        );

        let key = key_item(hash_key, range_key).map_err(log_error(OP, &long_name))?;
        let previous = self
            .store
            .delete_item(DeleteItemRequest {
                table_name: long_name.clone(),
                key,
            })
            .await
            .map_err(log_error(OP, &long_name))?;

        match previous {
            Some(previous) => decode_item(&previous).map_err(log_error(OP, &long_name)),
            None => Ok(None),
        }
    }

    /// Creates a table and returns its physical name.
    ///
    /// A table that already exists is reported as a warning, not an error.
    pub async fn create_table(&self, table: &str, schema: TableSchema) -> Result<String> {
        const OP: &str = "create_table";
        self.ensure_configured(OP)?;

        let long_name = self.table_name(table);
        tracing::debug!(long_name = %long_name, schema = ?schema, "Creating table");

        let request = CreateTableRequest {
            table_name: long_name.clone(),
            schema,
        };
        match self.store.create_table(request).await {
            Ok(()) => {
                tracing::info!(long_name = %long_name, "Created table");
                Ok(long_name)
            }
            Err(StoreError::ResourceInUse(_)) => {
                tracing::warn!(long_name = %long_name, "Table already exists");
                Ok(long_name)
            }
            Err(e) => Err(log_error(OP, &long_name)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use recordstore_core::condition::attribute_filter;
    use recordstore_core::{ComparisonOperator, KeyAttribute, KeyKind};

    use super::*;
    use crate::client::ClientError;
    use crate::config::ClientSettings;
    use crate::storage::inmemory::InMemoryStore;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {}", other),
        }
    }

    async fn client_with_table(schema: TableSchema) -> RecordStoreClient<InMemoryStore> {
        let client = RecordStoreClient::new(
            InMemoryStore::new(),
            ClientSettings::with_table_names("alternator-", "-test"),
        );
        client.configure().await.unwrap();
        client.create_table("things", schema).await.unwrap();
        client
    }

    fn hash_range_schema() -> TableSchema {
        TableSchema::new(KeyAttribute::new("hashId", KeyKind::Number))
            .with_range_key(KeyAttribute::new("rangeId", KeyKind::Number))
    }

    async fn seeded_hash_range() -> RecordStoreClient<InMemoryStore> {
        let client = client_with_table(hash_range_schema()).await;
        for (hash, range, text) in [
            (456, 2021, "abc"),
            (456, 2022, "def"),
            (456, 2023, "ghi"),
            (789, 2022, "jkl"),
        ] {
            client
                .put_record(
                    "things",
                    &record(json!({"hashId": hash, "rangeId": range, "stringField": text})),
                )
                .await
                .unwrap();
        }
        client
    }

    #[tokio::test]
    async fn test_operations_require_configuration() {
        let client = RecordStoreClient::new(InMemoryStore::new(), ClientSettings::default());
        let hash = KeyField::new("hashId", 1);

        assert!(matches!(
            client.get_all_records("things").await,
            Err(ClientError::NotConfigured { operation: "get_all_records" })
        ));
        assert!(matches!(
            client.get_record_for_hash_key("things", &hash).await,
            Err(ClientError::NotConfigured { .. })
        ));
        assert!(matches!(
            client.put_record("things", &record(json!({"hashId": 1}))).await,
            Err(ClientError::NotConfigured { .. })
        ));
        assert!(matches!(
            client.delete_record("things", &hash, None).await,
            Err(ClientError::NotConfigured { .. })
        ));
        assert!(matches!(
            client
                .create_table("things", TableSchema::new(KeyAttribute::new("hashId", KeyKind::Number)))
                .await,
            Err(ClientError::NotConfigured { .. })
        ));
        assert!(matches!(
            client.get_records_for_hash_key("things", &hash).await,
            Err(ClientError::NotConfigured { operation: "get_records_for_hash_key" })
        ));
        assert!(matches!(
            client
                .query_records("things", &QuerySpec::for_hash_key("hashId", 1))
                .await,
            Err(ClientError::NotConfigured { operation: "query_records" })
        ));
        let filter = attribute_filter("numberField", ComparisonOperator::NotNull, &[]).unwrap();
        assert!(matches!(
            client.filter_records("things", filter).await,
            Err(ClientError::NotConfigured { operation: "filter_records" })
        ));
        assert!(matches!(
            client
                .get_records_for_hash_keys("things", "hashId", &[json!(1), json!(2)])
                .await,
            Err(ClientError::NotConfigured { operation: "get_records_for_hash_keys" })
        ));
        assert!(matches!(
            client
                .put_records("things", &[record(json!({"hashId": 1}))])
                .await,
            Err(ClientError::NotConfigured { operation: "put_records" })
        ));
        assert_eq!(client.store().calls(), 0);
    }

    #[tokio::test]
    async fn test_create_table_twice_succeeds() {
        let client = client_with_table(hash_range_schema()).await;

        let name = client.create_table("things", hash_range_schema()).await.unwrap();
        assert_eq!(name, "alternator-things-test");
    }

    #[tokio::test]
    async fn test_put_returns_previous_record() {
        let client = seeded_hash_range().await;

        let previous = client
            .put_record(
                "things",
                &record(json!({"hashId": 456, "rangeId": 2022, "stringField": "xyz"})),
            )
            .await
            .unwrap();

        assert_eq!(
            previous,
            Some(record(json!({"hashId": 456, "rangeId": 2022, "stringField": "def"})))
        );
    }

    #[tokio::test]
    async fn test_get_missing_record_is_none() {
        let client = seeded_hash_range().await;

        let found = client
            .get_record_for_hash_and_range_key(
                "things",
                &KeyField::new("hashId", 456),
                Some(&KeyField::new("rangeId", 1999)),
            )
            .await
            .unwrap();

        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_get_records_for_hash_key_in_range_order() {
        let client = seeded_hash_range().await;

        let records = client
            .get_records_for_hash_key("things", &KeyField::new("hashId", 456))
            .await
            .unwrap();

        let ranges: Vec<Value> = records.iter().map(|r| r["rangeId"].clone()).collect();
        assert_eq!(ranges, vec![json!(2021), json!(2022), json!(2023)]);
    }

    #[tokio::test]
    async fn test_query_with_range_condition() {
        let client = seeded_hash_range().await;
        let spec = QuerySpec::for_hash_key("hashId", 456)
            .with_comparison(ComparisonOperator::Ge)
            .with_range("rangeId", vec![json!(2022)])
            .descending();

        let records = client.query_records("things", &spec).await.unwrap();

        let ranges: Vec<Value> = records.iter().map(|r| r["rangeId"].clone()).collect();
        assert_eq!(ranges, vec![json!(2023), json!(2022)]);
    }

    #[tokio::test]
    async fn test_query_with_wrong_arity_is_a_store_error() {
        let client = seeded_hash_range().await;
        let spec = QuerySpec::for_hash_key("hashId", 456)
            .with_comparison(ComparisonOperator::Between)
            .with_range("rangeId", vec![json!(2022)]);

        let result = client.query_records("things", &spec).await;

        assert!(matches!(
            result,
            Err(ClientError::Store { code, .. }) if code == "ValidationException"
        ));
    }

    #[tokio::test]
    async fn test_filter_records() {
        let client = seeded_hash_range().await;
        let filter = attribute_filter(
            "stringField",
            ComparisonOperator::In,
            &[json!("def"), json!("jkl")],
        )
        .unwrap();

        let records = client.filter_records("things", filter).await.unwrap();

        let mut texts: Vec<String> = records
            .iter()
            .map(|r| r["stringField"].as_str().unwrap_or_default().to_string())
            .collect();
        texts.sort();
        assert_eq!(texts, vec!["def", "jkl"]);
    }

    #[tokio::test]
    async fn test_scan_follows_pages() {
        let client = seeded_hash_range().await;
        client.store().set_page_size(Some(1));

        let records = client.get_all_records("things").await.unwrap();
        assert_eq!(records.len(), 4);
    }

    #[tokio::test]
    async fn test_scan_fails_when_a_page_fails() {
        let client = seeded_hash_range().await;
        client.store().set_page_size(Some(2));
        client.store().fail_reads_after(1);

        let result = client.get_all_records("things").await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }

    #[tokio::test]
    async fn test_delete_returns_previous_record() {
        let client = seeded_hash_range().await;
        let hash = KeyField::new("hashId", 789);
        let range = KeyField::new("rangeId", 2022);

        let deleted = client.delete_record("things", &hash, Some(&range)).await.unwrap();
        assert_eq!(
            deleted,
            Some(record(json!({"hashId": 789, "rangeId": 2022, "stringField": "jkl"})))
        );

        let again = client.delete_record("things", &hash, Some(&range)).await.unwrap();
        assert_eq!(again, None);
    }

    #[tokio::test]
    async fn test_missing_table_is_a_store_error() {
        let client = seeded_hash_range().await;

        let result = client.get_all_records("nope").await;
        assert!(matches!(
            result,
            Err(ClientError::Store { code, .. }) if code == "ResourceNotFoundException"
        ));
    }
}
