//! End-to-end client scenarios against the in-memory store.

use std::io::Write;

use serde_json::{json, Value};

use recordstore::dump::{self, DumpTarget};
use recordstore::load;
use recordstore::storage::inmemory::InMemoryStore;
use recordstore::{ClientError, ClientSettings, ConfigureOutcome, RecordStoreClient};
use recordstore_core::codec::encode_record;
use recordstore_core::condition::attribute_filter;
use recordstore_core::{
    ComparisonOperator, KeyAttribute, KeyField, KeyKind, QuerySpec, Record, TableSchema,
    WireAttribute,
};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

fn numeric_hash_records() -> Vec<Record> {
    vec![
        record(json!({"hashId": 123, "stringField": "ghi", "numberField": 404})),
        record(json!({"hashId": 456, "stringField": "def", "numberField": 202})),
        record(json!({"hashId": 789, "stringField": "mno", "numberField": 606})),
    ]
}

async fn configured_client(page_size: Option<usize>) -> RecordStoreClient<InMemoryStore> {
    let store = InMemoryStore::new();
    store.set_page_size(page_size);
    let client = RecordStoreClient::new(
        store,
        ClientSettings::with_table_names("alternator-", "-test"),
    );
    client.configure().await.unwrap();
    client
}

async fn seeded_numeric_hash(page_size: Option<usize>) -> RecordStoreClient<InMemoryStore> {
    let client = configured_client(page_size).await;
    client
        .create_table(
            "numericHash",
            TableSchema::new(KeyAttribute::new("hashId", KeyKind::Number)),
        )
        .await
        .unwrap();
    client
        .put_records("numericHash", &numeric_hash_records())
        .await
        .unwrap();
    client
}

fn sorted_by_hash(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by_key(|r| r["hashId"].as_i64());
    records
}

#[test]
fn test_record_encodes_to_tagged_attributes() {
    let item = encode_record(&numeric_hash_records()[0]).unwrap();

    assert_eq!(item["hashId"], WireAttribute::N("123".to_string()));
    assert_eq!(item["stringField"], WireAttribute::S("ghi".to_string()));
    assert_eq!(item["numberField"], WireAttribute::N("404".to_string()));
}

#[tokio::test]
async fn test_filter_delete_and_rescan() {
    let client = seeded_numeric_hash(Some(1)).await;

    let filter = attribute_filter(
        "numberField",
        ComparisonOperator::Between,
        &[json!(202), json!(404)],
    )
    .unwrap();
    let matched = sorted_by_hash(client.filter_records("numericHash", filter).await.unwrap());
    assert_eq!(matched.len(), 2);
    assert_eq!(matched[0], numeric_hash_records()[0]);

    let deleted = client
        .delete_record("numericHash", &KeyField::new("hashId", 123), None)
        .await
        .unwrap();
    assert_eq!(deleted, Some(numeric_hash_records()[0].clone()));

    let remaining = client.get_all_records("numericHash").await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|r| r["hashId"] != json!(123)));
}

#[tokio::test]
async fn test_unconfigured_client_never_reaches_the_store() {
    let client = RecordStoreClient::new(InMemoryStore::new(), ClientSettings::default());

    let result = client.get_all_records("numericHash").await;

    assert!(matches!(result, Err(ClientError::NotConfigured { .. })));
    assert_eq!(client.store().calls(), 0);
    assert!(!client.is_configured());
}

#[tokio::test]
async fn test_configure_is_idempotent() {
    let client = RecordStoreClient::new(InMemoryStore::new(), ClientSettings::default());

    let first = client.configure().await.unwrap();
    let second = client.configure().await.unwrap();

    assert_eq!(
        first,
        ConfigureOutcome::Connected {
            endpoint: "memory://".to_string()
        }
    );
    assert_eq!(second, ConfigureOutcome::AlreadyConfigured);
    assert_eq!(client.store().calls(), 1);
    assert_eq!(client.current_endpoint(), Some("memory://"));
}

#[tokio::test]
async fn test_physical_table_names_are_mapped() {
    let client = configured_client(None).await;

    let name = client
        .create_table(
            "stringHash",
            TableSchema::new(KeyAttribute::new("hashCode", KeyKind::String)),
        )
        .await
        .unwrap();

    assert_eq!(name, "alternator-stringHash-test");
}

#[tokio::test]
async fn test_range_query_between() {
    let client = configured_client(Some(2)).await;
    client
        .create_table(
            "stringHashStringRange",
            TableSchema::new(KeyAttribute::new("hashCode", KeyKind::String))
                .with_range_key(KeyAttribute::new("rangeCode", KeyKind::String)),
        )
        .await
        .unwrap();

    for code in ["b1", "b2", "b3", "b4"] {
        client
            .put_record(
                "stringHashStringRange",
                &record(json!({"hashCode": "456", "rangeCode": code})),
            )
            .await
            .unwrap();
    }

    let spec = QuerySpec::for_hash_key("hashCode", "456")
        .with_comparison(ComparisonOperator::Between)
        .with_range("rangeCode", vec![json!("b2"), json!("b3")]);
    let records = client
        .query_records("stringHashStringRange", &spec)
        .await
        .unwrap();

    let codes: Vec<&Value> = records.iter().map(|r| &r["rangeCode"]).collect();
    assert_eq!(codes, vec![&json!("b2"), &json!("b3")]);
}

#[tokio::test]
async fn test_load_then_dump_round_trip() {
    let client = configured_client(Some(2)).await;
    client
        .create_table(
            "numericHash",
            TableSchema::new(KeyAttribute::new("hashId", KeyKind::Number)),
        )
        .await
        .unwrap();

    let mut data = tempfile::NamedTempFile::new().unwrap();
    writeln!(data, "[").unwrap();
    for r in numeric_hash_records() {
        writeln!(data, "  {},", serde_json::to_string(&r).unwrap()).unwrap();
    }

    let loaded = load::load_table(&client, "numericHash", data.path())
        .await
        .unwrap();
    assert_eq!(loaded, 3);

    let dir = tempfile::tempdir().unwrap();
    let target = DumpTarget::new(dir.path(), "dump.numericHash").with_records_per_file(2);
    let written = dump::dump_table(&client, "numericHash", &target).await.unwrap();
    assert_eq!(written.len(), 2);

    let mut dumped = Vec::new();
    for path in &written {
        let chunk: Vec<Record> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        dumped.extend(chunk);
    }
    assert_eq!(sorted_by_hash(dumped), numeric_hash_records());
}

#[tokio::test]
async fn test_dump_hash_keys_skips_missing() {
    let client = seeded_numeric_hash(None).await;
    let dir = tempfile::tempdir().unwrap();

    let written = dump::dump_hash_keys(
        &client,
        "numericHash",
        "hashId",
        &[json!(123), json!(999), json!(789)],
        &DumpTarget::new(dir.path(), "dump.hashKey.numericHash"),
    )
    .await
    .unwrap();

    let dumped: Vec<Record> =
        serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    let ids: Vec<&Value> = dumped.iter().map(|r| &r["hashId"]).collect();
    assert_eq!(ids, vec![&json!(123), &json!(789)]);
}
