use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use expensetrack_types::{LoginRequest, LoginResponse, NewExpense};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::error::{ApiError, ApiResult};
use crate::collection::Resource;
use crate::config::Config;

/// Standard User-Agent header for ExpenseTrack API requests.
pub const USER_AGENT: &str = concat!("expensetrack/", env!("CARGO_PKG_VERSION"));

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const ADD_EXPENSE_FAILED: &str = "Failed to add expense";

/// Stateless client for the ExpenseTrack API.
///
/// Every call is bounded by `timeout` and aborts as soon as the
/// cancellation token fires.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    cancel: CancellationToken,
}

impl ApiClient {
    /// Creates a client for `base_url` (no trailing slash).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            cancel: CancellationToken::new(),
        })
    }

    /// Creates a client from the `[api]` config section.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.api.resolve_base_url()?;
        Self::new(base_url, config.api.timeout())
    }

    /// Uses `token` to cancel in-flight and future requests.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `POST /login`.
    ///
    /// # Errors
    /// Returns the server's message (or a generic one) on a non-2xx answer,
    /// and transport, timeout or cancellation errors otherwise.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let request = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest { email, password });

        self.guarded(async {
            let response = Self::send(request).await?;
            let response = Self::ensure_success(response, LOGIN_FAILED).await?;
            Self::decode(response, "login response").await
        })
        .await
    }

    /// `POST /expenses`. The created record in the response is not used.
    ///
    /// # Errors
    /// Returns the server's message (or a generic one) on a non-2xx answer.
    pub async fn create_expense(&self, token: &str, expense: &NewExpense) -> ApiResult<()> {
        let request = self
            .http
            .post(self.url("/expenses"))
            .bearer_auth(token)
            .json(expense);

        self.guarded(async {
            let response = Self::send(request).await?;
            Self::ensure_success(response, ADD_EXPENSE_FAILED).await?;
            Ok(())
        })
        .await
    }

    /// `GET` of a list endpoint.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        token: &str,
    ) -> ApiResult<Vec<T>> {
        let path = resource.path();
        let request = self.http.get(self.url(path)).bearer_auth(token);

        self.guarded(async {
            let response = Self::send(request).await?;
            let response = Self::ensure_success(response, resource.failure_message()).await?;
            Self::decode(response, path.trim_start_matches('/')).await
        })
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Races `fut` against the timeout and the cancellation token.
    async fn guarded<T, F>(&self, fut: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(ApiError::cancelled());
        }

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ApiError::cancelled()),
            result = tokio::time::timeout(self.timeout, fut) => {
                result.unwrap_or_else(|_| Err(ApiError::timeout(self.timeout)))
            }
        }
    }

    async fn send(request: RequestBuilder) -> ApiResult<Response> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        tracing::debug!(
            path = %response.url().path(),
            status = response.status().as_u16(),
            "API response"
        );
        Ok(response)
    }

    async fn ensure_success(response: Response, fallback: &str) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body, fallback);
        tracing::warn!(status = status.as_u16(), kind = %err.kind, "API request failed");
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> ApiResult<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::parse(format!("Failed to parse {what}: {e}")))
    }
}
