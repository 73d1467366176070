//! Command line interface for the recordstore binary.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;

use recordstore::dump::{self, DumpTarget};
use recordstore::load;
use recordstore::{AwsSettings, ClientSettings, RecordStoreClient};
use recordstore_core::condition::attribute_filter;
use recordstore_core::pagination::DEFAULT_MAX_PAGES;
use recordstore_core::{
    ComparisonOperator, KeyAttribute, KeyField, KeyKind, QuerySpec, RecordStore, TableSchema,
};

/// recordstore - Work with DynamoDB tables of schema-less records
#[derive(Parser, Debug)]
#[command(name = "recordstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: Global,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct Global {
    /// Endpoint of a local DynamoDB emulator
    #[arg(long, global = true, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// AWS region
    #[arg(long, global = true, default_value = AwsSettings::DEFAULT_REGION, env = "AWS_REGION")]
    pub region: String,

    /// Prepended to every table name
    #[arg(long, global = true, default_value = "", env = "RECORDSTORE_TABLE_PREFIX")]
    pub table_prefix: String,

    /// Appended to every table name
    #[arg(long, global = true, default_value = "", env = "RECORDSTORE_TABLE_SUFFIX")]
    pub table_suffix: String,

    /// Pages a single query or scan may fetch before giving up
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_PAGES, env = "RECORDSTORE_MAX_PAGES")]
    pub max_pages: usize,
}

impl Global {
    pub fn aws_settings(&self) -> AwsSettings {
        AwsSettings {
            endpoint_url: self.endpoint_url.clone(),
            region: self.region.clone(),
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            table_name_prefix: self.table_prefix.clone(),
            table_name_suffix: self.table_suffix.clone(),
            max_pages: self.max_pages,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a table (succeeds if it already exists)
    CreateTable(CreateTableArgs),

    /// Insert every record of a JSON array file into a table
    Load {
        /// Logical table name
        table: String,
        /// JSON file holding an array of records
        file: PathBuf,
    },

    /// Write records from a table to JSON files
    Dump {
        #[command(subcommand)]
        command: DumpCommand,
    },

    /// Print one record as JSON
    Get {
        table: String,
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Delete one record and print what it was
    Delete {
        table: String,
        #[command(flatten)]
        key: KeyArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    String,
    Number,
}

impl From<KindArg> for KeyKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::String => KeyKind::String,
            KindArg::Number => KeyKind::Number,
        }
    }
}

#[derive(Debug, Args)]
pub struct CreateTableArgs {
    /// Logical table name
    pub table: String,

    /// Hash key attribute name
    #[arg(long)]
    pub hash_key: String,

    #[arg(long, value_enum, default_value = "string")]
    pub hash_kind: KindArg,

    /// Range key attribute name
    #[arg(long)]
    pub range_key: Option<String>,

    #[arg(long, value_enum, default_value = "number")]
    pub range_kind: KindArg,

    #[arg(long, default_value_t = TableSchema::DEFAULT_CAPACITY_UNITS)]
    pub read_capacity: i64,

    #[arg(long, default_value_t = TableSchema::DEFAULT_CAPACITY_UNITS)]
    pub write_capacity: i64,
}

impl CreateTableArgs {
    pub fn schema(&self) -> TableSchema {
        let mut schema = TableSchema::new(KeyAttribute::new(&self.hash_key, self.hash_kind.into()))
            .with_capacity(self.read_capacity, self.write_capacity);
        if let Some(range_key) = &self.range_key {
            schema = schema.with_range_key(KeyAttribute::new(range_key, self.range_kind.into()));
        }
        schema
    }
}

/// A primary key given as `name=value` pairs.
#[derive(Debug, Clone, Args)]
pub struct KeyArgs {
    /// Hash key as name=value
    #[arg(long, value_parser = parse_key_field)]
    pub hash: KeyField,

    /// Range key as name=value
    #[arg(long, value_parser = parse_key_field)]
    pub range: Option<KeyField>,
}

#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Folder the dump files are written to
    #[arg(long, default_value = ".")]
    pub folder: PathBuf,

    /// Base file name (defaults to dump.<table>)
    #[arg(long)]
    pub name: Option<String>,

    /// Split the dump into files of this many records
    #[arg(long)]
    pub records_per_file: Option<usize>,
}

impl OutputArgs {
    pub fn target(&self, table: &str) -> DumpTarget {
        let base_name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("dump.{}", table));
        DumpTarget {
            folder: self.folder.clone(),
            base_name,
            records_per_file: self.records_per_file,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum DumpCommand {
    /// Every record of a table
    Table {
        table: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// The records for a comma separated list of hash keys
    Keys {
        table: String,
        /// Hash key attribute name
        #[arg(long)]
        hash_key: String,
        /// Comma separated hash key values
        #[arg(long)]
        keys: String,
        /// Treat the key values as strings instead of numbers
        #[arg(long)]
        string_keys: bool,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Every record under one hash key
    Hash {
        table: String,
        #[arg(long, value_parser = parse_key_field)]
        hash: KeyField,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// A single record
    Record {
        table: String,
        #[command(flatten)]
        key: KeyArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Records matching a hash/range query
    Query {
        table: String,
        #[arg(long, value_parser = parse_key_field)]
        hash: KeyField,
        /// Comparison applied to the range key (or the hash key without one)
        #[arg(long)]
        operator: Option<ComparisonOperator>,
        /// Range key attribute name
        #[arg(long)]
        range_key: Option<String>,
        /// Range key operand, repeat for BETWEEN and IN
        #[arg(long = "value", value_parser = parse_json_value)]
        values: Vec<Value>,
        /// Return records in descending range key order
        #[arg(long)]
        descending: bool,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Records matching an attribute filter
    Filter {
        table: String,
        /// Attribute to filter on
        #[arg(long)]
        attribute: String,
        #[arg(long)]
        operator: ComparisonOperator,
        /// Operand, repeat for BETWEEN and IN
        #[arg(long = "value", value_parser = parse_json_value)]
        values: Vec<Value>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

// ============================================================================
// Argument parsing
// ============================================================================

/// Parse a command line value as JSON, falling back to a plain string.
///
/// `123` is a number, `abc` and `"123"` are strings.
pub fn parse_json_value(raw: &str) -> Result<Value, String> {
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

/// Parse `name=value` into a key field.
pub fn parse_key_field(raw: &str) -> Result<KeyField, String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    if name.is_empty() {
        return Err(format!("missing key name in '{}'", raw));
    }
    Ok(KeyField::new(name, parse_json_value(value)?))
}

/// Split a comma separated key list into typed values.
pub fn parse_key_list(name: &str, keys: &str, kind: KeyKind) -> Result<Vec<Value>> {
    keys.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| {
            kind.typed_value(name, key)
                .with_context(|| format!("Invalid value for {}", name))
        })
        .collect()
}

// ============================================================================
// Dispatch
// ============================================================================

fn print_record(record: Option<recordstore_core::Record>) -> Result<()> {
    match record {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("null"),
    }
    Ok(())
}

fn report(paths: Vec<PathBuf>) {
    for path in paths {
        println!("{}", path.display());
    }
}

/// Run a parsed command against a configured client.
pub async fn run<S: RecordStore>(client: &RecordStoreClient<S>, command: Command) -> Result<()> {
    match command {
        Command::CreateTable(args) => {
            let name = client.create_table(&args.table, args.schema()).await?;
            println!("{}", name);
        }
        Command::Load { table, file } => {
            let count = load::load_table(client, &table, &file).await?;
            println!("{}", count);
        }
        Command::Get { table, key } => {
            let record = client
                .get_record_for_hash_and_range_key(&table, &key.hash, key.range.as_ref())
                .await?;
            print_record(record)?;
        }
        Command::Delete { table, key } => {
            let record = client
                .delete_record(&table, &key.hash, key.range.as_ref())
                .await?;
            print_record(record)?;
        }
        Command::Dump { command } => report(run_dump(client, command).await?),
    }
    Ok(())
}

async fn run_dump<S: RecordStore>(
    client: &RecordStoreClient<S>,
    command: DumpCommand,
) -> Result<Vec<PathBuf>> {
    let paths = match command {
        DumpCommand::Table { table, output } => {
            dump::dump_table(client, &table, &output.target(&table)).await?
        }
        DumpCommand::Keys {
            table,
            hash_key,
            keys,
            string_keys,
            output,
        } => {
            let kind = if string_keys {
                KeyKind::String
            } else {
                KeyKind::Number
            };
            let values = parse_key_list(&hash_key, &keys, kind)?;
            dump::dump_hash_keys(client, &table, &hash_key, &values, &output.target(&table))
                .await?
        }
        DumpCommand::Hash {
            table,
            hash,
            output,
        } => dump::dump_hash_key_record_set(client, &table, &hash, &output.target(&table)).await?,
        DumpCommand::Record { table, key, output } => {
            dump::dump_record(
                client,
                &table,
                &key.hash,
                key.range.as_ref(),
                &output.target(&table),
            )
            .await?
        }
        DumpCommand::Query {
            table,
            hash,
            operator,
            range_key,
            values,
            descending,
            output,
        } => {
            let spec = query_spec(hash, operator, range_key, values, descending)?;
            dump::dump_query(client, &table, &spec, &output.target(&table)).await?
        }
        DumpCommand::Filter {
            table,
            attribute,
            operator,
            values,
            output,
        } => {
            let filter = attribute_filter(&attribute, operator, &values)?;
            dump::dump_filter(client, &table, filter, &output.target(&table)).await?
        }
    };
    Ok(paths)
}

fn query_spec(
    hash: KeyField,
    operator: Option<ComparisonOperator>,
    range_key: Option<String>,
    values: Vec<Value>,
    descending: bool,
) -> Result<QuerySpec> {
    let mut spec = QuerySpec::for_hash_key(hash.name, hash.value);
    if let Some(operator) = operator {
        spec = spec.with_comparison(operator);
    }
    match range_key {
        Some(name) => spec = spec.with_range(name, values),
        None if !values.is_empty() => bail!("--value requires --range-key"),
        None => {}
    }
    if descending {
        spec = spec.descending();
    }
    Ok(spec)
}

/// Confirm a data file exists before any store access.
pub fn check_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("Data file not found: {}", path.display());
    }
    Ok(())
}
