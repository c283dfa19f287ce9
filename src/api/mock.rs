//! In-memory transactions backend with simulated latency.

use super::types::{
    Employee, PaginatedRequestParams, PaginatedResponse, RequestByEmployeeParams,
    SetTransactionApprovalParams, Transaction,
};
use super::{data, RequestEndpoint, TransactionsApi};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct MockApiConfig {
    /// Delay applied to every request.
    pub latency: Duration,
    /// Transactions per page for `paginatedTransactions`.
    pub page_size: usize,
}

impl Default for MockApiConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_secs(1),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl MockApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// No simulated latency; handy in tests.
    pub fn instant() -> Self {
        Self::default().with_latency(Duration::ZERO)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

struct Dataset {
    employees: Vec<Employee>,
    transactions: Vec<Transaction>,
}

/// Fake server backed by the fixture data set.
///
/// Approval changes persist for the lifetime of the instance, so later reads
/// observe them. Failures can be injected per endpoint with
/// [`MockApi::fail_next`].
pub struct MockApi {
    config: MockApiConfig,
    data: RwLock<Dataset>,
    calls: Mutex<HashMap<RequestEndpoint, usize>>,
    failures: Mutex<HashSet<RequestEndpoint>>,
}

impl MockApi {
    pub fn new(config: MockApiConfig) -> Self {
        let employees = data::employees();
        let transactions = data::transactions(&employees);
        Self::with_data(config, employees, transactions)
    }

    pub fn with_data(
        config: MockApiConfig,
        employees: Vec<Employee>,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            config,
            data: RwLock::new(Dataset {
                employees,
                transactions,
            }),
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashSet::new()),
        }
    }

    /// Makes the next request to `endpoint` fail with a backend error.
    pub fn fail_next(&self, endpoint: RequestEndpoint) {
        lock(&self.failures).insert(endpoint);
    }

    /// Number of requests received for `endpoint`.
    pub fn calls(&self, endpoint: RequestEndpoint) -> usize {
        lock(&self.calls).get(&endpoint).copied().unwrap_or(0)
    }

    pub fn config(&self) -> &MockApiConfig {
        &self.config
    }

    async fn simulate(&self, endpoint: RequestEndpoint, params: &(impl Debug + ?Sized)) -> Result<()> {
        debug!(endpoint = %endpoint, params = ?params, "mock request");
        *lock(&self.calls).entry(endpoint).or_insert(0) += 1;

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        if lock(&self.failures).remove(&endpoint) {
            return Err(Error::backend_with_context(
                format!("request to {} failed", endpoint),
                ErrorContext::new()
                    .with_details("injected failure")
                    .with_source("mock_api"),
            ));
        }
        Ok(())
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new(MockApiConfig::default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl TransactionsApi for MockApi {
    async fn get_employees(&self) -> Result<Vec<Employee>> {
        self.simulate(RequestEndpoint::Employees, "()").await?;
        Ok(self.data.read().await.employees.clone())
    }

    async fn get_transactions_paginated(
        &self,
        params: &PaginatedRequestParams,
    ) -> Result<PaginatedResponse<Vec<Transaction>>> {
        self.simulate(RequestEndpoint::PaginatedTransactions, params)
            .await?;

        let page = params.page.ok_or_else(|| {
            Error::invalid_request_with_context(
                "Page cannot be null",
                ErrorContext::new()
                    .with_field_path("params.page")
                    .with_source("mock_api"),
            )
        })?;

        let data = self.data.read().await;
        let total = data.transactions.len();
        let start = page as usize * self.config.page_size;
        if start > total {
            return Err(Error::not_found_with_context(
                format!("Invalid page {}", page),
                ErrorContext::new()
                    .with_field_path("params.page")
                    .with_details(format!("{} transactions available", total))
                    .with_source("mock_api"),
            ));
        }
        let end = (start + self.config.page_size).min(total);
        let next_page = if end < total { Some(page + 1) } else { None };

        Ok(PaginatedResponse {
            data: data.transactions[start..end].to_vec(),
            next_page,
        })
    }

    async fn get_transactions_by_employee(
        &self,
        params: &RequestByEmployeeParams,
    ) -> Result<Vec<Transaction>> {
        self.simulate(RequestEndpoint::TransactionsByEmployee, params)
            .await?;

        if params.employee_id.is_empty() {
            return Err(Error::invalid_request_with_context(
                "Employee id cannot be empty",
                ErrorContext::new()
                    .with_field_path("params.employeeId")
                    .with_source("mock_api"),
            ));
        }

        let data = self.data.read().await;
        Ok(data
            .transactions
            .iter()
            .filter(|t| t.employee.id == params.employee_id)
            .cloned()
            .collect())
    }

    async fn set_transaction_approval(&self, params: &SetTransactionApprovalParams) -> Result<()> {
        self.simulate(RequestEndpoint::SetTransactionApproval, params)
            .await?;

        let mut data = self.data.write().await;
        let transaction = data
            .transactions
            .iter_mut()
            .find(|t| t.id == params.transaction_id)
            .ok_or_else(|| {
                Error::not_found_with_context(
                    "Invalid transaction to approve",
                    ErrorContext::new()
                        .with_field_path("params.transactionId")
                        .with_details(params.transaction_id.clone())
                        .with_source("mock_api"),
                )
            })?;
        transaction.approved = params.value;
        Ok(())
    }
}
