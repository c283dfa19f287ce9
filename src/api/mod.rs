//! 交易数据接口：请求/响应类型、端点枚举与内存模拟后端。
//!
//! # Transactions API
//!
//! The data-fetching layer the viewer talks to. [`TransactionsApi`] is the
//! seam; [`MockApi`] is an in-memory implementation with simulated latency
//! that serves the fixture data set.
//!
//! Endpoint names double as cache-key operation names, which is what lets
//! the client clear cached results per endpoint.

pub mod data;
mod mock;
pub mod types;

pub use mock::{MockApi, MockApiConfig, DEFAULT_PAGE_SIZE};
pub use types::{
    Employee, PaginatedRequestParams, PaginatedResponse, RequestByEmployeeParams,
    SetTransactionApprovalParams, Transaction, EMPTY_EMPLOYEE_ID,
};

use crate::Result;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestEndpoint {
    Employees,
    PaginatedTransactions,
    TransactionsByEmployee,
    SetTransactionApproval,
}

impl RequestEndpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::PaginatedTransactions => "paginatedTransactions",
            Self::TransactionsByEmployee => "transactionsByEmployee",
            Self::SetTransactionApproval => "setTransactionApproval",
        }
    }

    /// Whether calling this endpoint changes server-side state.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::SetTransactionApproval)
    }
}

impl fmt::Display for RequestEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend serving employees and transactions.
#[async_trait]
pub trait TransactionsApi: Send + Sync {
    async fn get_employees(&self) -> Result<Vec<Employee>>;

    async fn get_transactions_paginated(
        &self,
        params: &PaginatedRequestParams,
    ) -> Result<PaginatedResponse<Vec<Transaction>>>;

    async fn get_transactions_by_employee(
        &self,
        params: &RequestByEmployeeParams,
    ) -> Result<Vec<Transaction>>;

    async fn set_transaction_approval(&self, params: &SetTransactionApprovalParams) -> Result<()>;
}
