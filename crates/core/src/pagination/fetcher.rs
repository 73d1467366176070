use crate::codec::WireItem;

use super::{FetchError, PageSource};

/// Upper bound on pages drained by one fetch unless configured otherwise.
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Drains every page of a query or scan into one sequence.
///
/// Pages are requested strictly one after another, each with the cursor of
/// the page before. Any failure discards what was accumulated so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatedFetcher {
    max_pages: usize,
}

impl Default for PaginatedFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGES)
    }
}

impl PaginatedFetcher {
    /// Creates a fetcher that gives up after `max_pages` pages (at least one).
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
        }
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub async fn drain<P>(&self, source: &P) -> Result<Vec<WireItem>, FetchError>
    where
        P: PageSource + ?Sized,
    {
        let mut items = Vec::new();
        let mut cursor: Option<WireItem> = None;
        let mut pages = 0usize;

        loop {
            if pages == self.max_pages {
                tracing::error!(
                    source = source.label(),
                    pages,
                    "Continuation cursor still present after page limit"
                );
                return Err(FetchError::PageLimitExceeded { pages });
            }

            let page = source.fetch_page(cursor.take()).await.map_err(|e| {
                tracing::error!(
                    source = source.label(),
                    page = pages + 1,
                    error = %e,
                    "Page fetch failed"
                );
                FetchError::Store(e)
            })?;
            pages += 1;

            if let Some(capacity) = page.consumed_capacity {
                tracing::info!(
                    source = source.label(),
                    page = pages,
                    consumed_capacity = capacity,
                    "Consumed capacity"
                );
            }
            tracing::debug!(
                source = source.label(),
                page = pages,
                items = page.items.len(),
                total = items.len() + page.items.len(),
                "Fetched page"
            );

            let next = page.cursor().cloned();
            items.extend(page.items);

            match next {
                Some(key) => cursor = Some(key),
                None => break,
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::codec::WireAttribute;
    use crate::store::{ResultPage, StoreError};

    /// Replays a fixed list of responses and records the cursors it was given.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<ResultPage, StoreError>>>,
        cursors: Mutex<Vec<Option<WireItem>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<ResultPage, StoreError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                cursors: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.cursors.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch_page(&self, cursor: Option<WireItem>) -> Result<ResultPage, StoreError> {
            self.cursors.lock().unwrap().push(cursor);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ResultPage::default()))
        }

        fn label(&self) -> &str {
            "scripted"
        }
    }

    fn item(id: i64) -> WireItem {
        let mut item = WireItem::new();
        item.insert("hashId".to_string(), WireAttribute::N(id.to_string()));
        item
    }

    fn page(ids: &[i64], cursor: Option<i64>) -> Result<ResultPage, StoreError> {
        Ok(ResultPage {
            items: ids.iter().copied().map(item).collect(),
            last_evaluated_key: cursor.map(item),
            consumed_capacity: Some(0.5),
        })
    }

    #[tokio::test]
    async fn test_drains_all_pages_in_order() {
        let source = ScriptedSource::new(vec![
            page(&[1, 2], Some(2)),
            page(&[3, 4], Some(4)),
            page(&[5], None),
        ]);

        let items = PaginatedFetcher::default().drain(&source).await.unwrap();

        assert_eq!(items, vec![item(1), item(2), item(3), item(4), item(5)]);
        assert_eq!(
            *source.cursors.lock().unwrap(),
            vec![None, Some(item(2)), Some(item(4))]
        );
    }

    #[tokio::test]
    async fn test_single_page() {
        let source = ScriptedSource::new(vec![page(&[7], None)]);

        let items = PaginatedFetcher::default().drain(&source).await.unwrap();

        assert_eq!(items, vec![item(7)]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_cursor_ends_pagination() {
        let source = ScriptedSource::new(vec![Ok(ResultPage {
            items: vec![item(1)],
            last_evaluated_key: Some(WireItem::new()),
            consumed_capacity: None,
        })]);

        let items = PaginatedFetcher::default().drain(&source).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_on_second_page_aborts() {
        let source = ScriptedSource::new(vec![
            page(&[1, 2], Some(2)),
            Err(StoreError::Transport("connection reset".to_string())),
            page(&[3], None),
        ]);

        let result = PaginatedFetcher::default().drain(&source).await;

        assert_eq!(
            result,
            Err(FetchError::Store(StoreError::Transport(
                "connection reset".to_string()
            )))
        );
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_page_limit_exceeded() {
        let source = ScriptedSource::new(vec![
            page(&[1], Some(1)),
            page(&[2], Some(2)),
            page(&[3], Some(3)),
        ]);

        let result = PaginatedFetcher::new(2).drain(&source).await;

        assert_eq!(result, Err(FetchError::PageLimitExceeded { pages: 2 }));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_page_limit_reached_exactly_is_fine() {
        let source = ScriptedSource::new(vec![page(&[1], Some(1)), page(&[2], None)]);

        let items = PaginatedFetcher::new(2).drain(&source).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        assert_eq!(PaginatedFetcher::new(0).max_pages(), 1);
    }
}
