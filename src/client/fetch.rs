use crate::api::{
    Employee, PaginatedRequestParams, PaginatedResponse, RequestByEmployeeParams,
    RequestEndpoint, SetTransactionApprovalParams, Transaction, TransactionsApi,
};
use crate::cache::{CacheKey, RequestCache};
use crate::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

/// A typed call against one [`RequestEndpoint`].
///
/// The request value doubles as the parameter object hashed into the cache
/// key, so equal requests share one cache entry.
#[async_trait]
pub trait ApiRequest: Serialize + Send + Sync {
    type Response: Serialize + DeserializeOwned + Send;

    const ENDPOINT: RequestEndpoint;

    async fn send(&self, api: &dyn TransactionsApi) -> Result<Self::Response>;

    fn cache_key(&self) -> Result<CacheKey> {
        CacheKey::for_request(Self::ENDPOINT.as_str(), self)
    }
}

/// Request for the full employee list. Has no parameters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GetEmployees;

#[async_trait]
impl ApiRequest for GetEmployees {
    type Response = Vec<Employee>;
    const ENDPOINT: RequestEndpoint = RequestEndpoint::Employees;

    async fn send(&self, api: &dyn TransactionsApi) -> Result<Self::Response> {
        api.get_employees().await
    }

    fn cache_key(&self) -> Result<CacheKey> {
        CacheKey::for_operation(Self::ENDPOINT.as_str())
    }
}

#[async_trait]
impl ApiRequest for PaginatedRequestParams {
    type Response = PaginatedResponse<Vec<Transaction>>;
    const ENDPOINT: RequestEndpoint = RequestEndpoint::PaginatedTransactions;

    async fn send(&self, api: &dyn TransactionsApi) -> Result<Self::Response> {
        api.get_transactions_paginated(self).await
    }
}

#[async_trait]
impl ApiRequest for RequestByEmployeeParams {
    type Response = Vec<Transaction>;
    const ENDPOINT: RequestEndpoint = RequestEndpoint::TransactionsByEmployee;

    async fn send(&self, api: &dyn TransactionsApi) -> Result<Self::Response> {
        api.get_transactions_by_employee(self).await
    }
}

#[async_trait]
impl ApiRequest for SetTransactionApprovalParams {
    type Response = ();
    const ENDPOINT: RequestEndpoint = RequestEndpoint::SetTransactionApproval;

    async fn send(&self, api: &dyn TransactionsApi) -> Result<Self::Response> {
        api.set_transaction_approval(self).await
    }
}

/// Session-scoped request client.
///
/// Owns the session's request cache; two clients never share entries.
pub struct FetchClient {
    api: Arc<dyn TransactionsApi>,
    cache: RequestCache,
    in_flight: AtomicUsize,
}

impl FetchClient {
    pub fn new(api: Arc<dyn TransactionsApi>, cache: RequestCache) -> Self {
        Self {
            api,
            cache,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Client with an unbounded in-memory cache.
    pub fn with_default_cache(api: Arc<dyn TransactionsApi>) -> Self {
        Self::new(api, RequestCache::in_memory())
    }

    /// Serves `request` from the cache, calling the API only on a miss.
    ///
    /// Mutations are never cached and go straight to the API.
    pub async fn fetch_with_cache<R: ApiRequest>(&self, request: &R) -> Result<R::Response> {
        if R::ENDPOINT.is_mutation() {
            return self.fetch_without_cache(request).await;
        }
        let key = request.cache_key()?;
        let api = self.api.as_ref();
        self.tracked(
            R::ENDPOINT,
            self.cache.fetch_with_cache(&key, || request.send(api)),
        )
        .await
    }

    /// Calls the API directly. Used for mutations.
    pub async fn fetch_without_cache<R: ApiRequest>(&self, request: &R) -> Result<R::Response> {
        self.tracked(R::ENDPOINT, request.send(self.api.as_ref()))
            .await
    }

    /// Drops every cached response.
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Drops cached responses of the given endpoints only.
    pub fn clear_cache_by_endpoint(&self, endpoints: &[RequestEndpoint]) -> usize {
        endpoints
            .iter()
            .map(|endpoint| self.cache.invalidate_endpoint(endpoint.as_str()))
            .sum()
    }

    /// True while any request issued through this client is pending.
    pub fn loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    pub fn api(&self) -> &Arc<dyn TransactionsApi> {
        &self.api
    }

    async fn tracked<T>(
        &self,
        endpoint: RequestEndpoint,
        request: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let _guard = InFlight::enter(&self.in_flight);
        let result = request.await;
        if let Err(ref e) = result {
            warn!(endpoint = %endpoint, error = %e, "request failed");
        }
        result
    }
}

/// Keeps the in-flight counter raised until dropped, including on failure.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
