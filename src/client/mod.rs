//! 请求客户端：封装会话缓存、加载状态跟踪以及缓存清理。
//!
//! # Fetch Client
//!
//! [`FetchClient`] sits between the data-access resources and the
//! [`TransactionsApi`](crate::api::TransactionsApi). It owns the session's
//! [`RequestCache`](crate::cache::RequestCache), derives cache keys from the
//! endpoint and its parameters, and reports whether any request is in flight.

mod fetch;

pub use fetch::{ApiRequest, FetchClient, GetEmployees};
