use thiserror::Error;

use crate::store::StoreError;

/// Errors that abort a multi-page fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Gave up after {pages} pages; the store kept returning a continuation key")]
    PageLimitExceeded { pages: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_limit_display() {
        let error = FetchError::PageLimitExceeded { pages: 3 };
        assert_eq!(
            error.to_string(),
            "Gave up after 3 pages; the store kept returning a continuation key"
        );
    }

    #[test]
    fn test_store_error_is_transparent() {
        let error = FetchError::from(StoreError::Transport("connection reset".to_string()));
        assert_eq!(error.to_string(), "Transport error: connection reset");
    }
}
