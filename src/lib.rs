//! # txn-cache
//!
//! 员工交易查看器的会话级请求缓存与数据访问层。
//!
//! Session-scoped request cache and data-access layer for an employee
//! transactions viewer.
//!
//! ## Overview
//!
//! Every read goes through a [`FetchClient`], which derives a cache key from
//! the endpoint name and its parameters and serves repeated reads from its
//! [`RequestCache`]. The cache is memoization only: there is no request
//! deduplication, no revalidation, and a failed request never writes an
//! entry. Mutations bypass the cache and clear it on success.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use txn_cache::{TransactionViewer, ViewerConfig};
//!
//! #[tokio::main]
//! async fn main() -> txn_cache::Result<()> {
//!     let viewer = TransactionViewer::from_config(&ViewerConfig::from_env())?;
//!     viewer.load_all_transactions().await?;
//!
//!     for tx in viewer.transactions().unwrap_or_default() {
//!         println!("{} {:>10.2} {}", tx.date, tx.amount, tx.merchant);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Cache keys, storage backends and the request cache |
//! | [`api`] | Domain types, the backend trait and the simulated backend |
//! | [`client`] | Cached and uncached request execution |
//! | [`resources`] | Employees, paginated and per-employee transaction loaders |
//! | [`approval`] | Two-phase approval toggle |
//! | [`viewer`] | The viewer session tying it all together |
//! | [`config`] | YAML and environment configuration |

pub mod api;
pub mod approval;
pub mod cache;
pub mod client;
pub mod config;
pub mod resources;
pub mod viewer;

// Re-export main types for convenience
pub use api::{Employee, MockApi, MockApiConfig, RequestEndpoint, Transaction, TransactionsApi};
pub use approval::{ApprovalState, ApprovalToggle};
pub use cache::{CacheConfig, CacheKey, RequestCache};
pub use client::{ApiRequest, FetchClient};
pub use config::ViewerConfig;
pub use viewer::TransactionViewer;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
