//! Bulk operations over lists of keys or records.
//!
//! Requests are issued strictly one at a time, in input order.

use serde_json::Value;

use recordstore_core::{KeyField, Record, RecordStore};

use super::{RecordStoreClient, Result};

impl<S: RecordStore> RecordStoreClient<S> {
    /// Gets the record for each hash key value, skipping keys with no record.
    pub async fn get_records_for_hash_keys(
        &self,
        table: &str,
        hash_key_name: &str,
        hash_key_values: &[Value],
    ) -> Result<Vec<Record>> {
        self.ensure_configured("get_records_for_hash_keys")?;
        tracing::debug!(table, keys = hash_key_values.len(), "Getting records by hash key");

        let mut records = Vec::with_capacity(hash_key_values.len());
        for value in hash_key_values {
            let key = KeyField::new(hash_key_name, value.clone());
            match self.get_record_for_hash_key(table, &key).await? {
                Some(record) => records.push(record),
                None => tracing::debug!(table, hash_value = %value, "No record for hash key"),
            }
        }

        Ok(records)
    }

    /// Puts each record in order, stopping at the first failure.
    ///
    /// Returns the record each put replaced, position by position.
    pub async fn put_records(&self, table: &str, records: &[Record]) -> Result<Vec<Option<Record>>> {
        self.ensure_configured("put_records")?;
        tracing::debug!(table, records = records.len(), "Putting records");

        let mut previous = Vec::with_capacity(records.len());
        for record in records {
            previous.push(self.put_record(table, record).await?);
        }

        Ok(previous)
    }
}
