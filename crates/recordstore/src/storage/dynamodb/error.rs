//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `recordstore_core::store`.

use std::error::Error;
use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use recordstore_core::StoreError;

const RESOURCE_IN_USE: &str = "ResourceInUseException";

/// Map any SDK operation error to `StoreError`.
///
/// Errors the service answered with keep their error code and message.
/// Everything else (connection, timeout, dispatch, response parsing) is a
/// transport failure.
pub fn map_sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let error = match &err {
        SdkError::ServiceError(_) => match err.code() {
            Some(RESOURCE_IN_USE) => {
                StoreError::ResourceInUse(err.message().unwrap_or(RESOURCE_IN_USE).to_string())
            }
            Some(code) => StoreError::service(code, err.message().unwrap_or_default()),
            None => StoreError::service("Unknown", DisplayErrorContext(&err).to_string()),
        },
        _ => StoreError::Transport(format!("{} failed: {}", operation, DisplayErrorContext(&err))),
    };

    tracing::debug!(operation, error = %error, "DynamoDB request failed");
    error
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::error::ErrorMetadata;
    use aws_sdk_dynamodb::operation::create_table::CreateTableError;
    use aws_sdk_dynamodb::types::error::ResourceInUseException;

    use super::*;

    #[test]
    fn test_construction_failure_is_transport() {
        let err: SdkError<CreateTableError, ()> = SdkError::construction_failure("bad request");
        assert!(matches!(
            map_sdk_error("CreateTable", err),
            StoreError::Transport(_)
        ));
    }

    fn service_error(err: CreateTableError) -> SdkError<CreateTableError, ()> {
        SdkError::service_error(err, ())
    }

    #[test]
    fn test_resource_in_use_maps_to_resource_in_use() {
        let exception = ResourceInUseException::builder()
            .message("Table already exists")
            .meta(
                ErrorMetadata::builder()
                    .code(RESOURCE_IN_USE)
                    .message("Table already exists")
                    .build(),
            )
            .build();
        let err = service_error(CreateTableError::ResourceInUseException(exception));

        match map_sdk_error("CreateTable", err) {
            StoreError::ResourceInUse(message) => assert_eq!(message, "Table already exists"),
            other => panic!("expected ResourceInUse, got {:?}", other),
        }
    }

    #[test]
    fn test_other_service_codes_are_kept() {
        let err = service_error(CreateTableError::generic(
            ErrorMetadata::builder()
                .code("LimitExceededException")
                .message("Too many tables")
                .build(),
        ));

        assert!(matches!(
            map_sdk_error("CreateTable", err),
            StoreError::Service { code, message }
                if code == "LimitExceededException" && message == "Too many tables"
        ));
    }

    #[test]
    fn test_service_error_without_code() {
        let err = service_error(CreateTableError::generic(ErrorMetadata::builder().build()));

        assert!(matches!(
            map_sdk_error("CreateTable", err),
            StoreError::Service { code, .. } if code == "Unknown"
        ));
    }
}
