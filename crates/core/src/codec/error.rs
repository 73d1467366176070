use thiserror::Error;

/// Errors that can occur while encoding or decoding wire attributes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unsupported {kind} value in field '{field}'")]
    UnsupportedValue { field: String, kind: &'static str },
    #[error("Unsupported wire attribute type '{tag}' in field '{field}'")]
    UnsupportedAttribute { field: String, tag: String },
    #[error("Malformed number in field '{field}': {value}")]
    MalformedNumber { field: String, value: String },
    #[error("Malformed structured value in field '{field}': {reason}")]
    MalformedStructured { field: String, reason: String },
    #[error("Malformed escaped text in field '{field}': {reason}")]
    MalformedText { field: String, reason: String },
    #[error("Operand {index} for '{attribute}' is null or empty and cannot be sent")]
    EmptyOperand { attribute: String, index: usize },
    #[error("Serialization error: {0}")]
    Serialization(String),
}
