//! 数据访问资源：员工列表、分页交易、按员工筛选的交易。
//!
//! # Data-access Resources
//!
//! Each resource owns the last successfully loaded `data` and a `loading`
//! flag, and fetches through the shared [`FetchClient`](crate::client::FetchClient)
//! so repeated loads are served from the session cache.
//!
//! A failed fetch clears `loading` and leaves `data` exactly as it was.
//!
//! | Resource | Endpoint |
//! |----------|----------|
//! | [`EmployeesResource`] | `employees` |
//! | [`PaginatedTransactions`] | `paginatedTransactions` |
//! | [`TransactionsByEmployee`] | `transactionsByEmployee` |

mod by_employee;
mod employees;
mod paginated;

pub use by_employee::TransactionsByEmployee;
pub use employees::EmployeesResource;
pub use paginated::PaginatedTransactions;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Counts one in-flight fetch of a resource until dropped.
///
/// A resource is loading while its counter is non-zero, so overlapping
/// fetches keep it loading until the last one finishes.
struct Loading<'a>(&'a AtomicUsize);

impl<'a> Loading<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
