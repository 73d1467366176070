use recordstore_core::{CodecError, FetchError, StoreError};
use thiserror::Error;

/// Errors surfaced by [`RecordStoreClient`](super::RecordStoreClient).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A data operation was issued before `configure` succeeded.
    #[error("Client is not configured; call configure() before {operation}")]
    NotConfigured { operation: &'static str },
    #[error("Transport error: {0}")]
    Transport(String),
    /// The store reported an error, including operand arity violations.
    #[error("Store error {code}: {message}")]
    Store { code: String, message: String },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Gave up after {pages} pages; the store kept returning a continuation key")]
    PageLimitExceeded { pages: usize },
}

impl From<StoreError> for ClientError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Transport(message) => ClientError::Transport(message),
            StoreError::Service { code, message } => ClientError::Store { code, message },
            StoreError::ResourceInUse(message) => ClientError::Store {
                code: "ResourceInUseException".to_string(),
                message,
            },
            StoreError::MalformedResponse(codec) => ClientError::Codec(codec),
            StoreError::InvalidRequest(message) => ClientError::Store {
                code: "ValidationException".to_string(),
                message,
            },
        }
    }
}

impl From<FetchError> for ClientError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Store(store) => store.into(),
            FetchError::PageLimitExceeded { pages } => ClientError::PageLimitExceeded { pages },
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_display() {
        let error = ClientError::NotConfigured {
            operation: "get_all_records",
        };
        assert_eq!(
            error.to_string(),
            "Client is not configured; call configure() before get_all_records"
        );
    }

    #[test]
    fn test_service_error_maps_to_store_error() {
        let error: ClientError = StoreError::service("ValidationException", "bad operands").into();
        assert_eq!(
            error,
            ClientError::Store {
                code: "ValidationException".to_string(),
                message: "bad operands".to_string(),
            }
        );
    }

    #[test]
    fn test_fetch_error_conversion() {
        let limit: ClientError = FetchError::PageLimitExceeded { pages: 4 }.into();
        assert_eq!(limit, ClientError::PageLimitExceeded { pages: 4 });

        let transport: ClientError =
            FetchError::Store(StoreError::Transport("timed out".to_string())).into();
        assert_eq!(transport, ClientError::Transport("timed out".to_string()));
    }
}
