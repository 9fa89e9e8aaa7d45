//! Server-mirrored collections that follow the session token.
//!
//! A [`SyncedCollection`] holds the last successful response of one list
//! endpoint. It never merges or patches items: every fetch replaces the
//! whole list. Failures are recorded in [`CollectionState::error`] instead
//! of being returned.

use expensetrack_types::{BankAccount, Expense};
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::api::{ApiClient, ApiError};
use crate::session::Session;

/// A list endpoint mirrored on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Banks,
    Expenses,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Banks => "/banks",
            Resource::Expenses => "/expenses",
        }
    }

    /// Message recorded when the server answers with a non-2xx status.
    pub fn failure_message(self) -> &'static str {
        match self {
            Resource::Banks => "Failed to fetch banks",
            Resource::Expenses => "Failed to fetch expenses",
        }
    }
}

/// Item type served by a [`Resource`].
pub trait Record: DeserializeOwned + Clone + Send + Sync + 'static {
    const RESOURCE: Resource;
}

impl Record for BankAccount {
    const RESOURCE: Resource = Resource::Banks;
}

impl Record for Expense {
    const RESOURCE: Resource = Resource::Expenses;
}

/// Immutable view handed to readers.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            error: None,
        }
    }
}

pub struct SyncedCollection<T> {
    api: ApiClient,
    session: watch::Receiver<Session>,
    seen_token: Option<String>,
    state: watch::Sender<CollectionState<T>>,
}

impl<T: Record> SyncedCollection<T> {
    pub fn new(api: ApiClient, session: watch::Receiver<Session>) -> Self {
        let (state, _) = watch::channel(CollectionState::default());
        Self {
            api,
            session,
            seen_token: None,
            state,
        }
    }

    pub fn snapshot(&self) -> CollectionState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<T>> {
        self.state.subscribe()
    }

    /// Runs `f` against the current items without cloning them.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.state.borrow().items)
    }

    pub(crate) fn api(&self) -> &ApiClient {
        &self.api
    }

    pub(crate) fn current_token(&self) -> Option<String> {
        self.session.borrow().token().map(str::to_string)
    }

    /// Reacts to a token change: drops the old data and fetches for the new
    /// token. Returns false when the token is the one already seen.
    pub async fn sync(&mut self) -> bool {
        let token = self.session.borrow_and_update().token().map(str::to_string);
        if token == self.seen_token {
            return false;
        }

        tracing::debug!(
            resource = T::RESOURCE.path(),
            authenticated = token.is_some(),
            "Session changed, invalidating collection"
        );
        self.seen_token = token;
        self.state.send_modify(|state| {
            state.items.clear();
            state.error = None;
        });
        self.fetch().await;
        true
    }

    /// Pull-to-refresh.
    pub async fn refresh(&mut self) {
        self.fetch().await;
    }

    /// Replaces the items with the server's list.
    ///
    /// Does nothing without a token. A response that arrives after the
    /// token changed is dropped.
    pub async fn fetch(&mut self) {
        let Some(token) = self.current_token() else {
            tracing::debug!(resource = T::RESOURCE.path(), "No token, skipping fetch");
            return;
        };

        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let resource = T::RESOURCE;
        let result = self
            .api
            .get_list::<T>(resource, &token)
            .await;

        let stale = self.current_token().as_deref() != Some(token.as_str());
        if stale {
            tracing::debug!(resource = resource.path(), "Dropping response for old session");
        }

        self.state.send_modify(|state| {
            state.is_loading = false;
            if stale {
                return;
            }
            match result {
                Ok(items) => {
                    tracing::debug!(resource = resource.path(), count = items.len(), "Fetched");
                    state.items = items;
                }
                Err(err) => {
                    let message = failure_text(&err, resource);
                    tracing::warn!(resource = resource.path(), kind = %err.kind, error = %message, "Fetch failed");
                    state.error = Some(message);
                }
            }
        });
    }
}

fn failure_text(err: &ApiError, resource: Resource) -> String {
    if err.is_http_status() {
        resource.failure_message().to_string()
    } else {
        err.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::session::SessionStore;
    use crate::storage::MemoryStore;

    async fn logged_in(server: &MockServer, token: &str) -> SessionStore {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": token,
                "user": {"id": 1, "name": "Asha"},
                "role": "user"
            })))
            .mount(server)
            .await;

        let api = ApiClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let mut store = SessionStore::new(MemoryStore::new(), api);
        store.restore();
        store.login("asha@example.com", "pw").await.unwrap();
        store
    }

    fn bank(id: i64, balance: &str) -> serde_json::Value {
        json!({"id": id, "user_id": 1, "name": format!("Bank {id}"), "purpose": "Savings", "balance": balance})
    }

    #[tokio::test]
    async fn test_fetch_without_token_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let mut store = SessionStore::new(MemoryStore::new(), api.clone());
        store.restore();

        let mut banks = SyncedCollection::<BankAccount>::new(api, store.subscribe());
        banks.fetch().await;

        assert_eq!(banks.snapshot(), CollectionState::default());
    }

    #[tokio::test]
    async fn test_sync_fetches_after_login() {
        let server = MockServer::start().await;
        let store = logged_in(&server, "tok-1").await;
        Mock::given(method("GET"))
            .and(path("/banks"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([bank(1, "100"), bank(2, "50.5")])))
            .expect(1)
            .mount(&server)
            .await;

        let mut banks = SyncedCollection::<BankAccount>::new(store.api().clone(), store.subscribe());
        assert!(banks.sync().await);
        assert!(!banks.sync().await, "same token should not refetch");

        let state = banks.snapshot();
        assert_eq!(state.items.len(), 2);
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_sync_after_logout_clears_items() {
        let server = MockServer::start().await;
        let mut store = logged_in(&server, "tok-1").await;
        Mock::given(method("GET"))
            .and(path("/expenses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "user_id": 1, "bank_id": 1, "amount": 10, "category": "Other", "description": "x", "date": "2024-01-01"}
            ])))
            .mount(&server)
            .await;

        let mut expenses = SyncedCollection::<Expense>::new(store.api().clone(), store.subscribe());
        expenses.sync().await;
        assert_eq!(expenses.snapshot().items.len(), 1);

        store.logout().unwrap();
        assert!(expenses.sync().await);
        assert!(expenses.snapshot().items.is_empty());
    }

    #[tokio::test]
    async fn test_http_failure_keeps_items_and_records_fixed_message() {
        let server = MockServer::start().await;
        let store = logged_in(&server, "tok-1").await;
        Mock::given(method("GET"))
            .and(path("/banks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([bank(1, "100")])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/banks"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"message": "Server Error"})),
            )
            .mount(&server)
            .await;

        let mut banks = SyncedCollection::<BankAccount>::new(store.api().clone(), store.subscribe());
        banks.sync().await;
        banks.refresh().await;

        let state = banks.snapshot();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.error.as_deref(), Some("Failed to fetch banks"));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_timeout_clears_loading_and_records_error() {
        let server = MockServer::start().await;
        let store = logged_in(&server, "tok-1").await;
        Mock::given(method("GET"))
            .and(path("/expenses"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), Duration::from_millis(50)).unwrap();
        let mut expenses = SyncedCollection::<Expense>::new(api, store.subscribe());
        expenses.sync().await;

        let state = expenses.snapshot();
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("Request timed out"));
    }

    #[tokio::test]
    async fn test_successful_fetch_clears_previous_error() {
        let server = MockServer::start().await;
        let store = logged_in(&server, "tok-1").await;
        Mock::given(method("GET"))
            .and(path("/banks"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/banks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([bank(1, "5")])))
            .mount(&server)
            .await;

        let mut banks = SyncedCollection::<BankAccount>::new(store.api().clone(), store.subscribe());
        banks.sync().await;
        assert_eq!(banks.snapshot().error.as_deref(), Some("Failed to fetch banks"));

        banks.refresh().await;
        let state = banks.snapshot();
        assert_eq!(state.error, None);
        assert_eq!(state.items.len(), 1);
    }
}
