use super::{lock, Loading};
use crate::api::{RequestByEmployeeParams, RequestEndpoint, Transaction};
use crate::client::FetchClient;
use crate::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Transactions of one selected employee.
pub struct TransactionsByEmployee {
    client: Arc<FetchClient>,
    data: Mutex<Option<Vec<Transaction>>>,
    loading: AtomicUsize,
}

impl TransactionsByEmployee {
    pub fn new(client: Arc<FetchClient>) -> Self {
        Self {
            client,
            data: Mutex::new(None),
            loading: AtomicUsize::new(0),
        }
    }

    pub fn data(&self) -> Option<Vec<Transaction>> {
        lock(&self.data).clone()
    }

    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    pub async fn fetch_by_id(&self, employee_id: &str) -> Result<Vec<Transaction>> {
        let _loading = Loading::start(&self.loading);
        let transactions = self
            .client
            .fetch_with_cache(&RequestByEmployeeParams::new(employee_id))
            .await?;
        *lock(&self.data) = Some(transactions.clone());
        Ok(transactions)
    }

    pub fn invalidate_data(&self) {
        *lock(&self.data) = None;
        self.client
            .clear_cache_by_endpoint(&[RequestEndpoint::TransactionsByEmployee]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{data, MockApi, MockApiConfig};
    use crate::Error;

    #[tokio::test]
    async fn test_fetch_by_id_is_cached_per_employee() {
        let api = Arc::new(MockApi::new(MockApiConfig::instant()));
        let resource =
            TransactionsByEmployee::new(Arc::new(FetchClient::with_default_cache(api.clone())));
        let employees = data::employees();

        let first = resource.fetch_by_id(&employees[0].id).await.unwrap();
        assert!(first.iter().all(|t| t.employee.id == employees[0].id));
        resource.fetch_by_id(&employees[1].id).await.unwrap();
        let again = resource.fetch_by_id(&employees[0].id).await.unwrap();

        assert_eq!(first, again);
        assert_eq!(resource.data(), Some(again));
        assert_eq!(api.calls(RequestEndpoint::TransactionsByEmployee), 2);
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected_without_touching_data() {
        let api = Arc::new(MockApi::new(MockApiConfig::instant()));
        let resource = TransactionsByEmployee::new(Arc::new(FetchClient::with_default_cache(api)));

        let err = resource.fetch_by_id("").await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
        assert!(resource.data().is_none());
        assert!(!resource.loading());
    }

    #[tokio::test]
    async fn test_loading_stays_raised_while_any_fetch_runs() {
        let api = Arc::new(MockApi::new(
            MockApiConfig::new().with_latency(std::time::Duration::from_millis(40)),
        ));
        let resource = Arc::new(TransactionsByEmployee::new(Arc::new(
            FetchClient::with_default_cache(api),
        )));
        let employees = data::employees();

        let first = {
            let resource = resource.clone();
            let id = employees[0].id.clone();
            tokio::spawn(async move { resource.fetch_by_id(&id).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let second = {
            let resource = resource.clone();
            let id = employees[1].id.clone();
            tokio::spawn(async move { resource.fetch_by_id(&id).await })
        };

        first.await.unwrap().unwrap();
        assert!(resource.loading());

        second.await.unwrap().unwrap();
        assert!(!resource.loading());
    }

    #[tokio::test]
    async fn test_invalidate_data() {
        let api = Arc::new(MockApi::new(MockApiConfig::instant()));
        let resource =
            TransactionsByEmployee::new(Arc::new(FetchClient::with_default_cache(api.clone())));
        let id = data::employees()[2].id.clone();

        resource.fetch_by_id(&id).await.unwrap();
        resource.invalidate_data();
        assert!(resource.data().is_none());

        resource.fetch_by_id(&id).await.unwrap();
        assert_eq!(api.calls(RequestEndpoint::TransactionsByEmployee), 2);
    }
}
