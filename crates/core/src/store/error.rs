use thiserror::Error;

use crate::codec::CodecError;

/// Errors reported by a [`RecordStore`](super::RecordStore) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Network or protocol failure before the store produced an answer.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The store answered with an error of its own.
    #[error("Store error {code}: {message}")]
    Service { code: String, message: String },
    /// Table creation hit an existing table.
    #[error("Resource in use: {0}")]
    ResourceInUse(String),
    /// The store answered with attributes the codec cannot represent.
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] CodecError),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl StoreError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Service {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let error = StoreError::service("ValidationException", "Invalid KeyConditions");
        assert_eq!(
            error.to_string(),
            "Store error ValidationException: Invalid KeyConditions"
        );
    }

    #[test]
    fn test_codec_error_converts() {
        let error: StoreError = CodecError::UnsupportedAttribute {
            field: "flag".to_string(),
            tag: "BOOL".to_string(),
        }
        .into();
        assert!(matches!(error, StoreError::MalformedResponse(_)));
    }
}
