use super::{lock, Loading};
use crate::api::{PaginatedRequestParams, PaginatedResponse, RequestEndpoint, Transaction};
use crate::client::FetchClient;
use crate::Result;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Flat transaction list loaded one page at a time.
///
/// Every successful `fetch_all` appends the next page to what was loaded
/// before; `next_page` always reflects the most recent page.
pub struct PaginatedTransactions {
    client: Arc<FetchClient>,
    data: Mutex<Option<PaginatedResponse<Vec<Transaction>>>>,
    loading: AtomicUsize,
    // bumped by invalidate_data; pages fetched under an older value are dropped
    generation: AtomicU64,
    // one page fetch at a time, so pages are appended in order
    fetching: tokio::sync::Mutex<()>,
}

impl PaginatedTransactions {
    pub fn new(client: Arc<FetchClient>) -> Self {
        Self {
            client,
            data: Mutex::new(None),
            loading: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            fetching: tokio::sync::Mutex::new(()),
        }
    }

    pub fn data(&self) -> Option<PaginatedResponse<Vec<Transaction>>> {
        lock(&self.data).clone()
    }

    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    pub fn next_page(&self) -> Option<u32> {
        lock(&self.data).as_ref().and_then(|r| r.next_page)
    }

    /// Loads the next page (page 0 when nothing is loaded yet).
    ///
    /// Once the last page is loaded this returns the current data without a
    /// request. A page that arrives after [`invalidate_data`](Self::invalidate_data)
    /// is returned as is and not merged into the list.
    pub async fn fetch_all(&self) -> Result<PaginatedResponse<Vec<Transaction>>> {
        let _fetching = self.fetching.lock().await;

        let generation = self.generation.load(Ordering::SeqCst);
        let page = match self.data() {
            None => 0,
            Some(current) => match current.next_page {
                Some(page) => page,
                None => return Ok(current),
            },
        };

        let _loading = Loading::start(&self.loading);
        let response = self
            .client
            .fetch_with_cache(&PaginatedRequestParams::page(page))
            .await?;

        let mut data = lock(&self.data);
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(page, "dropping page fetched before invalidation");
            return Ok(response);
        }
        let merged = match data.take() {
            Some(mut previous) => {
                previous.data.extend(response.data);
                previous.next_page = response.next_page;
                previous
            }
            None => response,
        };
        *data = Some(merged.clone());
        Ok(merged)
    }

    /// Forgets loaded pages and their cached responses.
    pub fn invalidate_data(&self) {
        {
            let mut data = lock(&self.data);
            self.generation.fetch_add(1, Ordering::SeqCst);
            *data = None;
        }
        self.client
            .clear_cache_by_endpoint(&[RequestEndpoint::PaginatedTransactions]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockApi, MockApiConfig, DEFAULT_PAGE_SIZE};

    fn resource() -> (Arc<MockApi>, PaginatedTransactions) {
        let api = Arc::new(MockApi::new(MockApiConfig::instant()));
        let client = Arc::new(FetchClient::with_default_cache(api.clone()));
        (api, PaginatedTransactions::new(client))
    }

    #[tokio::test]
    async fn test_pages_accumulate() {
        let (_, resource) = resource();

        let first = resource.fetch_all().await.unwrap();
        assert_eq!(first.data.len(), DEFAULT_PAGE_SIZE);
        assert_eq!(first.next_page, Some(1));

        let second = resource.fetch_all().await.unwrap();
        assert_eq!(second.data.len(), DEFAULT_PAGE_SIZE * 2);
        assert_eq!(second.data[..DEFAULT_PAGE_SIZE], first.data[..]);
        assert_eq!(resource.next_page(), Some(2));
    }

    #[tokio::test]
    async fn test_stops_after_last_page() {
        let (api, resource) = resource();
        for _ in 0..4 {
            resource.fetch_all().await.unwrap();
        }
        assert_eq!(resource.next_page(), None);
        assert_eq!(resource.data().unwrap().data.len(), 16);

        let again = resource.fetch_all().await.unwrap();
        assert_eq!(again.data.len(), 16);
        assert_eq!(api.calls(RequestEndpoint::PaginatedTransactions), 4);
    }

    #[tokio::test]
    async fn test_invalidate_restarts_from_first_page() {
        let (api, resource) = resource();
        resource.fetch_all().await.unwrap();
        resource.fetch_all().await.unwrap();

        resource.invalidate_data();
        assert!(resource.data().is_none());

        let fresh = resource.fetch_all().await.unwrap();
        assert_eq!(fresh.data.len(), DEFAULT_PAGE_SIZE);
        // page 0 was evicted from the cache too, so the API is hit again
        assert_eq!(api.calls(RequestEndpoint::PaginatedTransactions), 3);
    }

    #[tokio::test]
    async fn test_invalidate_during_fetch_discards_late_page() {
        let api = Arc::new(MockApi::new(
            MockApiConfig::new().with_latency(std::time::Duration::from_millis(40)),
        ));
        let client = Arc::new(FetchClient::with_default_cache(api.clone()));
        let resource = Arc::new(PaginatedTransactions::new(client));
        resource.fetch_all().await.unwrap();

        let pending = {
            let resource = resource.clone();
            tokio::spawn(async move { resource.fetch_all().await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        resource.invalidate_data();

        let late = pending.await.unwrap().unwrap();
        assert_eq!(late.next_page, Some(2));
        assert!(resource.data().is_none());

        let fresh = resource.fetch_all().await.unwrap();
        assert_eq!(fresh.data.len(), DEFAULT_PAGE_SIZE);
        assert_eq!(fresh.next_page, Some(1));
        assert_eq!(fresh.data[0].id, crate::api::data::transactions(&crate::api::data::employees())[0].id);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_loaded_pages() {
        let (api, resource) = resource();
        resource.fetch_all().await.unwrap();

        api.fail_next(RequestEndpoint::PaginatedTransactions);
        assert!(resource.fetch_all().await.is_err());
        assert!(!resource.loading());
        let data = resource.data().unwrap();
        assert_eq!(data.data.len(), DEFAULT_PAGE_SIZE);
        assert_eq!(data.next_page, Some(1));

        resource.fetch_all().await.unwrap();
        assert_eq!(resource.data().unwrap().data.len(), DEFAULT_PAGE_SIZE * 2);
    }
}
