//! Record store client (Imperative Shell).
//!
//! Wraps a [`RecordStore`] with the attribute codec, the key condition
//! builder and the paginated fetcher, and enforces the configure-first
//! lifecycle. The client starts Unconfigured; a successful connectivity
//! probe moves it to Configured for the rest of its life.

mod bulk;
mod error;
mod records;

use std::sync::OnceLock;

use recordstore_core::{PaginatedFetcher, RecordStore, TableNameMapper};

use crate::config::ClientSettings;

pub use error::{ClientError, Result};

/// State recorded by a successful `configure`.
#[derive(Debug, Clone)]
struct Configured {
    endpoint: String,
}

/// Outcome of [`RecordStoreClient::configure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigureOutcome {
    /// The probe succeeded and the client is now usable.
    Connected { endpoint: String },
    /// The client was configured before; nothing was done.
    AlreadyConfigured,
}

/// Client over a record store.
pub struct RecordStoreClient<S> {
    store: S,
    tables: TableNameMapper,
    fetcher: PaginatedFetcher,
    state: OnceLock<Configured>,
}

impl<S: RecordStore> RecordStoreClient<S> {
    /// Creates an Unconfigured client. No network access happens here.
    pub fn new(store: S, settings: ClientSettings) -> Self {
        Self {
            store,
            tables: settings.table_names(),
            fetcher: PaginatedFetcher::new(settings.max_pages),
            state: OnceLock::new(),
        }
    }

    /// Probes the store and, on success, moves the client to Configured.
    ///
    /// Calling this on a Configured client logs a warning and returns
    /// [`ConfigureOutcome::AlreadyConfigured`]. A failed probe leaves the
    /// client Unconfigured, so configuration can be retried.
    pub async fn configure(&self) -> Result<ConfigureOutcome> {
        tracing::debug!("Configuring record store client");

        if self.state.get().is_some() {
            tracing::warn!("Record store client is already configured");
            return Ok(ConfigureOutcome::AlreadyConfigured);
        }

        if let Err(e) = self.store.list_tables(1).await {
            tracing::error!(
                endpoint = %self.store.endpoint(),
                error = %e,
                "Connectivity probe failed"
            );
            return Err(e.into());
        }

        let endpoint = self.store.endpoint();
        if self
            .state
            .set(Configured {
                endpoint: endpoint.clone(),
            })
            .is_err()
        {
            tracing::warn!("Record store client is already configured");
            return Ok(ConfigureOutcome::AlreadyConfigured);
        }

        tracing::info!(endpoint = %endpoint, "Connected to record store");
        Ok(ConfigureOutcome::Connected { endpoint })
    }

    pub fn is_configured(&self) -> bool {
        self.state.get().is_some()
    }

    /// The endpoint recorded at configuration time.
    pub fn current_endpoint(&self) -> Option<&str> {
        self.state.get().map(|state| state.endpoint.as_str())
    }

    /// Physical name for a logical table name.
    pub fn table_name(&self, short_name: &str) -> String {
        self.tables.long_name(short_name)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn ensure_configured(&self, operation: &'static str) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            tracing::error!(operation, "Record store client is not configured");
            Err(ClientError::NotConfigured { operation })
        }
    }
}

/// Logs a failed operation before it is returned to the caller.
fn log_error<'a, E>(operation: &'static str, table: &'a str) -> impl FnOnce(E) -> ClientError + 'a
where
    E: Into<ClientError>,
{
    move |e| {
        let error = e.into();
        tracing::error!(operation, table, error = %error, "Record store operation failed");
        error
    }
}
