//! DynamoDB record store implementation.
//!
//! Implements `RecordStore` from `recordstore_core` on top of
//! `aws-sdk-dynamodb`, using the legacy `KeyConditions` and `ScanFilter`
//! request parameters.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeValue, ConsumedCapacity, ReturnConsumedCapacity, ReturnValue,
};
use aws_sdk_dynamodb::Client;

use recordstore_core::store::{
    CreateTableRequest, DeleteItemRequest, GetItemRequest, PutItemRequest, QueryRequest,
    Result, ScanRequest,
};
use recordstore_core::{RecordStore, ResultPage, WireItem};

use super::conversions::{
    from_item, from_optional_item, key_schema, provisioned_throughput, to_item,
    to_sdk_conditions,
};
use super::error::map_sdk_error;
use crate::config::AwsSettings;

/// DynamoDB-based record store.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
    endpoint: String,
}

impl DynamoDbStore {
    /// Creates a store over an existing SDK client.
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Creates a store from settings.
    ///
    /// With an endpoint URL set the client targets a local emulator with
    /// static dummy credentials and a single attempt per request. Otherwise
    /// the AWS default credential chain is used.
    pub async fn from_settings(settings: &AwsSettings) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.region.clone()));

        let endpoint = match &settings.endpoint_url {
            Some(url) => {
                loader = loader
                    .endpoint_url(url)
                    .credentials_provider(Credentials::new(
                        "akid",
                        "secret",
                        None,
                        None,
                        "recordstore-emulator",
                    ))
                    .retry_config(aws_config::retry::RetryConfig::standard().with_max_attempts(1));
                url.clone()
            }
            None => format!("https://dynamodb.{}.amazonaws.com", settings.region),
        };

        tracing::debug!(destination = %settings.target_display(), "Creating DynamoDB client");
        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config), endpoint)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn capacity_units(capacity: Option<&ConsumedCapacity>) -> Option<f64> {
    capacity.and_then(|c| c.capacity_units())
}

fn page_items(items: &[HashMap<String, AttributeValue>]) -> Result<Vec<WireItem>> {
    items
        .iter()
        .map(|item| from_item(item).map_err(Into::into))
        .collect()
}

// ============================================================================
// RecordStore implementation
// ============================================================================

#[async_trait]
impl RecordStore for DynamoDbStore {
    async fn get_item(&self, request: GetItemRequest) -> Result<Option<WireItem>> {
        let result = self
            .client
            .get_item()
            .table_name(&request.table_name)
            .set_key(Some(to_item(&request.key)))
            .consistent_read(request.consistent_read)
            .send()
            .await
            .map_err(|e| map_sdk_error("GetItem", e))?;

        Ok(from_optional_item(result.item.as_ref())?)
    }

    async fn put_item(&self, request: PutItemRequest) -> Result<Option<WireItem>> {
        let result = self
            .client
            .put_item()
            .table_name(&request.table_name)
            .set_item(Some(to_item(&request.item)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| map_sdk_error("PutItem", e))?;

        Ok(from_optional_item(result.attributes.as_ref())?)
    }

    async fn delete_item(&self, request: DeleteItemRequest) -> Result<Option<WireItem>> {
        let result = self
            .client
            .delete_item()
            .table_name(&request.table_name)
            .set_key(Some(to_item(&request.key)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| map_sdk_error("DeleteItem", e))?;

        Ok(from_optional_item(result.attributes.as_ref())?)
    }

    async fn query(&self, request: QueryRequest) -> Result<ResultPage> {
        let result = self
            .client
            .query()
            .table_name(&request.table_name)
            .set_key_conditions(Some(to_sdk_conditions(&request.key_conditions)?))
            .scan_index_forward(request.scan_index_forward)
            .consistent_read(request.consistent_read)
            .set_exclusive_start_key(request.exclusive_start_key.as_ref().map(to_item))
            .send()
            .await
            .map_err(|e| map_sdk_error("Query", e))?;

        Ok(ResultPage {
            items: page_items(result.items())?,
            last_evaluated_key: from_optional_item(result.last_evaluated_key())?,
            consumed_capacity: capacity_units(result.consumed_capacity()),
        })
    }

    async fn scan(&self, request: ScanRequest) -> Result<ResultPage> {
        let scan_filter = match &request.scan_filter {
            Some(filter) => Some(to_sdk_conditions(filter)?),
            None => None,
        };

        let mut builder = self
            .client
            .scan()
            .table_name(&request.table_name)
            .set_scan_filter(scan_filter)
            .set_exclusive_start_key(request.exclusive_start_key.as_ref().map(to_item));
        if request.return_consumed_capacity {
            builder = builder.return_consumed_capacity(ReturnConsumedCapacity::Total);
        }

        let result = builder
            .send()
            .await
            .map_err(|e| map_sdk_error("Scan", e))?;

        Ok(ResultPage {
            items: page_items(result.items())?,
            last_evaluated_key: from_optional_item(result.last_evaluated_key())?,
            consumed_capacity: capacity_units(result.consumed_capacity()),
        })
    }

    async fn list_tables(&self, limit: i32) -> Result<Vec<String>> {
        let result = self
            .client
            .list_tables()
            .limit(limit)
            .send()
            .await
            .map_err(|e| map_sdk_error("ListTables", e))?;

        Ok(result.table_names().to_vec())
    }

    async fn create_table(&self, request: CreateTableRequest) -> Result<()> {
        let (elements, definitions) = key_schema(&request.schema)?;

        self.client
            .create_table()
            .table_name(&request.table_name)
            .set_key_schema(Some(elements))
            .set_attribute_definitions(Some(definitions))
            .provisioned_throughput(provisioned_throughput(&request.schema)?)
            .send()
            .await
            .map_err(|e| map_sdk_error("CreateTable", e))?;

        Ok(())
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}
