use super::{lock, Loading};
use crate::api::{Employee, RequestEndpoint};
use crate::client::{FetchClient, GetEmployees};
use crate::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// The employee list shown in the filter picker.
pub struct EmployeesResource {
    client: Arc<FetchClient>,
    data: Mutex<Option<Vec<Employee>>>,
    loading: AtomicUsize,
}

impl EmployeesResource {
    pub fn new(client: Arc<FetchClient>) -> Self {
        Self {
            client,
            data: Mutex::new(None),
            loading: AtomicUsize::new(0),
        }
    }

    pub fn data(&self) -> Option<Vec<Employee>> {
        lock(&self.data).clone()
    }

    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    pub async fn fetch_all(&self) -> Result<Vec<Employee>> {
        let _loading = Loading::start(&self.loading);
        let employees = self.client.fetch_with_cache(&GetEmployees).await?;
        *lock(&self.data) = Some(employees.clone());
        Ok(employees)
    }

    pub fn invalidate_data(&self) {
        *lock(&self.data) = None;
        self.client
            .clear_cache_by_endpoint(&[RequestEndpoint::Employees]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockApi, MockApiConfig};

    #[tokio::test]
    async fn test_fetch_all_and_invalidate() {
        let api = Arc::new(MockApi::new(MockApiConfig::instant()));
        let resource = EmployeesResource::new(Arc::new(FetchClient::with_default_cache(api.clone())));
        assert!(resource.data().is_none());

        let employees = resource.fetch_all().await.unwrap();
        assert_eq!(employees.len(), 6);
        assert_eq!(resource.data(), Some(employees));
        assert!(!resource.loading());

        resource.fetch_all().await.unwrap();
        assert_eq!(api.calls(RequestEndpoint::Employees), 1);

        resource.invalidate_data();
        assert!(resource.data().is_none());
        resource.fetch_all().await.unwrap();
        assert_eq!(api.calls(RequestEndpoint::Employees), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_data() {
        let api = Arc::new(MockApi::new(MockApiConfig::instant()));
        let client = Arc::new(FetchClient::with_default_cache(api.clone()));
        let resource = EmployeesResource::new(client.clone());

        resource.fetch_all().await.unwrap();
        let before = resource.data();

        client.clear_cache();
        api.fail_next(RequestEndpoint::Employees);
        assert!(resource.fetch_all().await.is_err());
        assert_eq!(resource.data(), before);
        assert!(!resource.loading());
    }
}
