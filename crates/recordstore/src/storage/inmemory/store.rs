//! In-memory record store implementation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use recordstore_core::store::{
    CreateTableRequest, DeleteItemRequest, GetItemRequest, PutItemRequest, QueryRequest,
    Result, ScanRequest,
};
use recordstore_core::{
    ComparisonOperator, KeyAttribute, KeyKind, RecordStore, ResultPage, StoreError, TableSchema,
    WireAttribute, WireItem,
};

use super::evaluate::{check_arity, matches_all, validation};

// ============================================================================
// Keys
// ============================================================================

/// A typed key value, ordered the way the store orders keys.
#[derive(Debug, Clone)]
enum Scalar {
    Number(f64),
    Text(String),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a.total_cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Scalar::Number(_), Scalar::Text(_)) => Ordering::Less,
            (Scalar::Text(_), Scalar::Number(_)) => Ordering::Greater,
        }
    }
}

type PrimaryKey = (Scalar, Option<Scalar>);

fn key_scalar(item: &WireItem, attribute: &KeyAttribute) -> Result<Scalar> {
    let value = item.get(&attribute.name).ok_or_else(|| {
        validation(format!(
            "One or more parameter values were invalid: Missing the key {} in the item",
            attribute.name
        ))
    })?;

    let scalar = match (attribute.kind, value) {
        (KeyKind::Number, WireAttribute::N(text)) => text.parse::<f64>().ok().map(Scalar::Number),
        (KeyKind::String, WireAttribute::S(text)) if !text.is_empty() => {
            Some(Scalar::Text(text.clone()))
        }
        _ => None,
    };

    scalar.ok_or_else(|| {
        validation(format!(
            "One or more parameter values were invalid: Type mismatch for key {}",
            attribute.name
        ))
    })
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Clone)]
struct Table {
    schema: TableSchema,
    items: BTreeMap<PrimaryKey, WireItem>,
}

impl Table {
    fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            items: BTreeMap::new(),
        }
    }

    fn primary_key(&self, item: &WireItem) -> Result<PrimaryKey> {
        let hash = key_scalar(item, &self.schema.hash_key)?;
        let range = match &self.schema.range_key {
            Some(range_key) => Some(key_scalar(item, range_key)?),
            None => None,
        };
        Ok((hash, range))
    }

    /// Validates a get/delete key: exactly the key attributes, nothing else.
    fn lookup_key(&self, key: &WireItem) -> Result<PrimaryKey> {
        let expected = 1 + usize::from(self.schema.range_key.is_some());
        if key.len() != expected {
            return Err(validation(
                "The provided key element does not match the schema",
            ));
        }
        self.primary_key(key)
    }

    /// The key attributes of a stored item, used as a continuation cursor.
    fn key_of(&self, item: &WireItem) -> WireItem {
        std::iter::once(&self.schema.hash_key)
            .chain(self.schema.range_key.as_ref())
            .filter_map(|attribute| {
                item.get(&attribute.name)
                    .map(|value| (attribute.name.clone(), value.clone()))
            })
            .collect()
    }

    fn is_key_attribute(&self, name: &str) -> bool {
        self.schema.hash_key.name == name
            || self
                .schema
                .range_key
                .as_ref()
                .is_some_and(|range| range.name == name)
    }
}

/// One page cut out of an ordered run of items.
struct Page {
    items: Vec<WireItem>,
    last_evaluated_key: Option<WireItem>,
}

fn paginate<'a>(
    table: &Table,
    entries: Vec<(&'a PrimaryKey, &'a WireItem)>,
    start: Option<&WireItem>,
    forward: bool,
    page_size: Option<usize>,
) -> Result<Page> {
    let skip = match start.filter(|key| !key.is_empty()) {
        Some(start) => {
            let start = table.primary_key(start)?;
            entries
                .iter()
                .take_while(|(key, _)| {
                    if forward {
                        **key <= start
                    } else {
                        **key >= start
                    }
                })
                .count()
        }
        None => 0,
    };

    let remaining = &entries[skip..];
    let take = page_size.unwrap_or(remaining.len()).min(remaining.len());
    let items: Vec<WireItem> = remaining[..take]
        .iter()
        .map(|(_, item)| (*item).clone())
        .collect();

    let last_evaluated_key = if take < remaining.len() {
        items.last().map(|item| table.key_of(item))
    } else {
        None
    };

    Ok(Page {
        items,
        last_evaluated_key,
    })
}

// ============================================================================
// Store
// ============================================================================

/// In-memory store for tests and development.
///
/// Tables live in a `HashMap` wrapped in `Arc<RwLock<_>>`; clones share the
/// same data. Key ordering, condition evaluation, operand arity checks and
/// pagination follow the remote store closely enough to exercise the client.
/// A few switches allow failures and small pages to be simulated.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
    calls: Arc<AtomicUsize>,
    unreachable: Arc<AtomicBool>,
    page_size: Arc<AtomicUsize>,
    reads_left: Arc<AtomicUsize>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            unreachable: Arc::new(AtomicBool::new(false)),
            page_size: Arc::new(AtomicUsize::new(0)),
            reads_left: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Makes every call fail with a transport error while set.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, AtomicOrdering::SeqCst);
    }

    /// Limits query and scan pages to `size` items.
    pub fn set_page_size(&self, size: Option<usize>) {
        self.page_size
            .store(size.unwrap_or(0), AtomicOrdering::SeqCst);
    }

    /// Lets `reads` more reads succeed, then fails every read after them.
    pub fn fail_reads_after(&self, reads: usize) {
        self.reads_left.store(reads, AtomicOrdering::SeqCst);
    }

    fn page_size(&self) -> Option<usize> {
        match self.page_size.load(AtomicOrdering::SeqCst) {
            0 => None,
            size => Some(size),
        }
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if self.unreachable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Transport(
                "connection refused: memory:// is unreachable".to_string(),
            ));
        }
        Ok(())
    }

    fn begin_read(&self) -> Result<()> {
        self.begin_call()?;
        self.reads_left
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |left| {
                match left {
                    0 => None,
                    usize::MAX => Some(usize::MAX),
                    n => Some(n - 1),
                }
            })
            .map(|_| ())
            .map_err(|_| StoreError::Transport("connection reset by peer".to_string()))
    }
}

fn not_found(table_name: &str) -> StoreError {
    StoreError::service(
        "ResourceNotFoundException",
        format!("Requested resource not found: Table: {} not found", table_name),
    )
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn get_item(&self, request: GetItemRequest) -> Result<Option<WireItem>> {
        self.begin_read()?;
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;

        let key = table.lookup_key(&request.key)?;
        Ok(table.items.get(&key).cloned())
    }

    async fn put_item(&self, request: PutItemRequest) -> Result<Option<WireItem>> {
        self.begin_call()?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;

        let key = table.primary_key(&request.item)?;
        Ok(table.items.insert(key, request.item))
    }

    async fn delete_item(&self, request: DeleteItemRequest) -> Result<Option<WireItem>> {
        self.begin_call()?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;

        let key = table.lookup_key(&request.key)?;
        Ok(table.items.remove(&key))
    }

    async fn query(&self, request: QueryRequest) -> Result<ResultPage> {
        self.begin_read()?;
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;

        check_arity(&request.key_conditions)?;

        let hash_name = &table.schema.hash_key.name;
        match request.key_conditions.get(hash_name) {
            Some(condition) if condition.operator == ComparisonOperator::Eq => {}
            Some(_) => return Err(validation("Query key condition not supported")),
            None => {
                return Err(validation(format!(
                    "Query condition missed key schema element: {}",
                    hash_name
                )))
            }
        }
        for (name, condition) in &request.key_conditions {
            if !table.is_key_attribute(name) {
                return Err(validation(format!(
                    "Query condition on non-key attribute: {}",
                    name
                )));
            }
            if name != hash_name
                && matches!(
                    condition.operator,
                    ComparisonOperator::Ne
                        | ComparisonOperator::In
                        | ComparisonOperator::Null
                        | ComparisonOperator::NotNull
                        | ComparisonOperator::Contains
                        | ComparisonOperator::NotContains
                )
            {
                return Err(validation(format!(
                    "Unsupported operator {} on range key {}",
                    condition.operator, name
                )));
            }
        }

        let mut entries: Vec<(&PrimaryKey, &WireItem)> = table
            .items
            .iter()
            .filter(|(_, item)| matches_all(item, &request.key_conditions))
            .collect();
        if !request.scan_index_forward {
            entries.reverse();
        }

        let page = paginate(
            table,
            entries,
            request.exclusive_start_key.as_ref(),
            request.scan_index_forward,
            self.page_size(),
        )?;

        Ok(ResultPage {
            consumed_capacity: None,
            items: page.items,
            last_evaluated_key: page.last_evaluated_key,
        })
    }

    async fn scan(&self, request: ScanRequest) -> Result<ResultPage> {
        self.begin_read()?;
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| not_found(&request.table_name))?;

        if let Some(filter) = &request.scan_filter {
            check_arity(filter)?;
        }

        let entries: Vec<(&PrimaryKey, &WireItem)> = table.items.iter().collect();
        let page = paginate(
            table,
            entries,
            request.exclusive_start_key.as_ref(),
            true,
            self.page_size(),
        )?;

        // Capacity is charged for everything read, before the filter applies.
        let consumed_capacity = request
            .return_consumed_capacity
            .then(|| page.items.len().max(1) as f64 * 0.5);

        let items = match &request.scan_filter {
            Some(filter) => page
                .items
                .into_iter()
                .filter(|item| matches_all(item, filter))
                .collect(),
            None => page.items,
        };

        Ok(ResultPage {
            items,
            last_evaluated_key: page.last_evaluated_key,
            consumed_capacity,
        })
    }

    async fn list_tables(&self, limit: i32) -> Result<Vec<String>> {
        self.begin_call()?;
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        names.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(names)
    }

    async fn create_table(&self, request: CreateTableRequest) -> Result<()> {
        self.begin_call()?;
        let mut tables = self.tables.write().await;
        if tables.contains_key(&request.table_name) {
            return Err(StoreError::ResourceInUse(format!(
                "Table already exists: {}",
                request.table_name
            )));
        }

        tables.insert(request.table_name, Table::new(request.schema));
        Ok(())
    }

    fn endpoint(&self) -> String {
        "memory://".to_string()
    }
}
