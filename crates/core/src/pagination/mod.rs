//! Paginated fetching.
//!
//! Follows continuation cursors until the store reports no more pages and
//! returns every item, still in wire form, in arrival order.

mod error;
mod fetcher;
mod source;

pub use error::FetchError;
pub use fetcher::{PaginatedFetcher, DEFAULT_MAX_PAGES};
pub use source::{PageSource, QueryPages, ScanPages};
