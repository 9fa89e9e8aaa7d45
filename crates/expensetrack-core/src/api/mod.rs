//! HTTP client for the ExpenseTrack REST API.

mod client;
mod error;

pub use client::{ApiClient, USER_AGENT};
pub use error::{ApiError, ApiErrorKind, ApiResult};
