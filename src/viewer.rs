//! Transactions viewer session.
//!
//! [`TransactionViewer`] ties the resources together the way the screen uses
//! them: an employee filter, a transaction list that grows page by page, and
//! per-transaction approval toggles.

use crate::api::{Employee, MockApi, Transaction, TransactionsApi};
use crate::approval::{ApprovalState, ApprovalToggle};
use crate::cache::RequestCache;
use crate::client::FetchClient;
use crate::config::ViewerConfig;
use crate::resources::{EmployeesResource, PaginatedTransactions, TransactionsByEmployee};
use crate::{Error, ErrorContext, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

pub struct TransactionViewer {
    client: Arc<FetchClient>,
    employees: EmployeesResource,
    paginated: PaginatedTransactions,
    by_employee: TransactionsByEmployee,
    employee_view: AtomicBool,
    approvals: Mutex<HashMap<String, Arc<ApprovalToggle>>>,
}

impl TransactionViewer {
    pub fn new(api: Arc<dyn TransactionsApi>, cache: RequestCache) -> Self {
        Self::with_client(Arc::new(FetchClient::new(api, cache)))
    }

    pub fn with_client(client: Arc<FetchClient>) -> Self {
        Self {
            employees: EmployeesResource::new(client.clone()),
            paginated: PaginatedTransactions::new(client.clone()),
            by_employee: TransactionsByEmployee::new(client.clone()),
            client,
            employee_view: AtomicBool::new(false),
            approvals: Mutex::new(HashMap::new()),
        }
    }

    /// Viewer over a fresh [`MockApi`] built from `config`.
    pub fn from_config(config: &ViewerConfig) -> Result<Self> {
        config.validate()?;
        let api = Arc::new(MockApi::new(config.mock_api_config()));
        let cache = RequestCache::from_config(config.cache_config())?;
        Ok(Self::new(api, cache))
    }

    pub fn client(&self) -> &Arc<FetchClient> {
        &self.client
    }

    /// Switches to the full list and loads its next page.
    pub async fn load_all_transactions(&self) -> Result<()> {
        debug!("loading all transactions");
        self.employee_view.store(false, Ordering::SeqCst);
        self.by_employee.invalidate_data();
        self.employees.fetch_all().await?;
        self.paginated.fetch_all().await?;
        Ok(())
    }

    /// Switches to the per-employee list for `employee_id`.
    pub async fn load_transactions_by_employee(&self, employee_id: &str) -> Result<()> {
        debug!(employee_id, "loading transactions by employee");
        self.employee_view.store(true, Ordering::SeqCst);
        self.paginated.invalidate_data();
        self.by_employee.fetch_by_id(employee_id).await?;
        Ok(())
    }

    /// Applies an employee filter choice. `None` and the "All Employees"
    /// entry both go back to the full list.
    pub async fn select_employee(&self, selection: Option<&Employee>) -> Result<()> {
        match selection {
            Some(employee) if !employee.is_empty_selection() => {
                self.load_transactions_by_employee(&employee.id).await
            }
            _ => self.load_all_transactions().await,
        }
    }

    /// Loads the next page of the full list. Does nothing when
    /// [`can_view_more`](Self::can_view_more) is false.
    pub async fn view_more(&self) -> Result<()> {
        if !self.can_view_more() {
            return Ok(());
        }
        self.load_all_transactions().await
    }

    pub fn can_view_more(&self) -> bool {
        !self.is_employee_view() && self.paginated.next_page().is_some()
    }

    pub fn is_employee_view(&self) -> bool {
        self.employee_view.load(Ordering::SeqCst)
    }

    /// Transactions currently on screen, with settled approval changes applied.
    pub fn transactions(&self) -> Option<Vec<Transaction>> {
        let mut transactions = self
            .paginated
            .data()
            .map(|page| page.data)
            .or_else(|| self.by_employee.data())?;

        let approvals = self.approvals();
        for transaction in &mut transactions {
            if let Some(toggle) = approvals.get(&transaction.id) {
                transaction.approved = toggle.state().displayed();
            }
        }
        Some(transactions)
    }

    /// Filter choices: "All Employees" followed by every employee. Empty until
    /// the employee list is loaded.
    pub fn employee_options(&self) -> Vec<Employee> {
        match self.employees.data() {
            Some(employees) => std::iter::once(Employee::empty()).chain(employees).collect(),
            None => Vec::new(),
        }
    }

    /// Sets the approval flag of a transaction on screen.
    pub async fn set_transaction_approval(
        &self,
        transaction_id: &str,
        value: bool,
    ) -> Result<ApprovalState> {
        let toggle = self.toggle_for(transaction_id)?;
        toggle.set(&self.client, value).await
    }

    pub fn approval_state(&self, transaction_id: &str) -> Option<ApprovalState> {
        if let Some(toggle) = self.approvals().get(transaction_id) {
            return Some(toggle.state());
        }
        self.transactions()?
            .iter()
            .find(|t| t.id == transaction_id)
            .map(|t| ApprovalState::from_flag(t.approved))
    }

    pub fn employees_loading(&self) -> bool {
        self.employees.loading()
    }

    pub fn transactions_loading(&self) -> bool {
        self.paginated.loading() || self.by_employee.loading()
    }

    fn toggle_for(&self, transaction_id: &str) -> Result<Arc<ApprovalToggle>> {
        if let Some(toggle) = self.approvals().get(transaction_id) {
            return Ok(toggle.clone());
        }

        let transaction = self
            .transactions()
            .unwrap_or_default()
            .into_iter()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| {
                Error::not_found_with_context(
                    "transaction is not displayed",
                    ErrorContext::new()
                        .with_field_path("transactionId")
                        .with_details(transaction_id)
                        .with_source("viewer"),
                )
            })?;

        Ok(self
            .approvals()
            .entry(transaction.id.clone())
            .or_insert_with(|| Arc::new(ApprovalToggle::new(&transaction)))
            .clone())
    }

    fn approvals(&self) -> MutexGuard<'_, HashMap<String, Arc<ApprovalToggle>>> {
        self.approvals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
