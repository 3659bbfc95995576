use tracing::{debug, info};

use crate::app::ports::RecordSourcePort;
use crate::domain::RawRecord;
use crate::error::{Result, WardeadError};
use crate::observability::metrics;

/// Read every row of `table`, one page of `page_size` rows at a time, until
/// the source returns an empty page. Fetch errors propagate unchanged.
pub async fn fetch_all(
    source: &dyn RecordSourcePort,
    table: &str,
    page_size: usize,
) -> Result<Vec<RawRecord>> {
    if page_size == 0 {
        return Err(WardeadError::Config("page size must be at least 1".to_string()));
    }

    let mut all_rows = Vec::new();
    let mut offset = 0;

    loop {
        debug!("Fetching rows {} to {} from {}", offset, offset + page_size, table);
        let page = source.fetch_page(table, offset, page_size).await?;
        if page.is_empty() {
            break;
        }
        metrics::fetch::page_fetched(page.len());
        offset += page.len();
        all_rows.extend(page);
    }

    info!("Downloaded {} rows from {}", all_rows.len(), table);
    Ok(all_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct PagedSource {
        rows: Vec<RawRecord>,
        requests: Arc<tokio::sync::Mutex<Vec<(usize, usize)>>>,
    }

    #[async_trait]
    impl RecordSourcePort for PagedSource {
        async fn fetch_page(&self, _table: &str, offset: usize, limit: usize) -> Result<Vec<RawRecord>> {
            self.requests.lock().await.push((offset, limit));
            Ok(self.rows.iter().skip(offset).take(limit).cloned().collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RecordSourcePort for FailingSource {
        async fn fetch_page(&self, _table: &str, _offset: usize, _limit: usize) -> Result<Vec<RawRecord>> {
            Err(WardeadError::Api { status: 500, message: "boom".to_string() })
        }
    }

    fn rows(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| serde_json::from_value(json!({ "id": i })).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_all_walks_pages_until_empty() {
        let requests = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let source = PagedSource { rows: rows(5), requests: requests.clone() };

        let fetched = fetch_all(&source, "t", 2).await.unwrap();
        assert_eq!(fetched.len(), 5);
        assert_eq!(fetched[4].id, Some(json!(4)));
        assert_eq!(*requests.lock().await, vec![(0, 2), (2, 2), (4, 2), (5, 2)]);
    }

    #[tokio::test]
    async fn test_fetch_all_empty_table() {
        let requests = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let source = PagedSource { rows: Vec::new(), requests: requests.clone() };

        assert!(fetch_all(&source, "t", 1000).await.unwrap().is_empty());
        assert_eq!(requests.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let err = fetch_all(&FailingSource, "t", 10).await.unwrap_err();
        assert!(matches!(err, WardeadError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_zero_page_size_rejected() {
        assert!(fetch_all(&FailingSource, "t", 0).await.is_err());
    }
}
