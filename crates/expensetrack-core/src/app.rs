//! Application container: owns the stores and keeps the collections in
//! step with the session.

use anyhow::Result;
use expensetrack_types::NewExpense;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, ApiError};
use crate::banks::BankRegistry;
use crate::config::{Config, paths};
use crate::expenses::{ExpenseDraft, ExpenseLedger};
use crate::session::{RestoreOutcome, Session, SessionStore};
use crate::storage::{FileStore, KeyValueStore};

pub struct App {
    session: SessionStore,
    banks: BankRegistry,
    expenses: ExpenseLedger,
}

impl App {
    pub fn new(storage: impl KeyValueStore + 'static, api: ApiClient) -> Self {
        let session = SessionStore::new(storage, api.clone());
        let banks = BankRegistry::new(api.clone(), session.subscribe());
        let expenses = ExpenseLedger::new(api, session.subscribe());
        Self {
            session,
            banks,
            expenses,
        }
    }

    /// Builds the app against the configured API and the session file in
    /// `EXPENSETRACK_HOME`.
    ///
    /// # Errors
    /// Returns an error if the API settings are invalid.
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self> {
        let api = ApiClient::from_config(config)?.with_cancellation(cancel);
        tracing::debug!(base_url = api.base_url(), "Using API");
        Ok(Self::new(FileStore::new(paths::session_path()), api))
    }

    /// Restores the stored session without loading any data.
    pub fn restore(&mut self) -> RestoreOutcome {
        self.session.restore()
    }

    /// Restores the stored session and loads data for it.
    pub async fn start(&mut self) -> RestoreOutcome {
        let outcome = self.restore();
        self.sync_all().await;
        outcome
    }

    /// # Errors
    /// Returns the login failure; the session is unchanged in that case.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        self.session.login(email, password).await?;
        self.sync_all().await;
        Ok(())
    }

    /// Logs out and empties both collections.
    ///
    /// # Errors
    /// Returns an error if the stored session could not be removed. The
    /// in-memory session is cleared regardless.
    pub async fn logout(&mut self) -> Result<bool> {
        let result = self.session.logout();
        self.sync_all().await;
        result
    }

    /// Lets both collections react to the current token.
    pub async fn sync_all(&mut self) {
        tokio::join!(self.banks.sync(), self.expenses.sync());
    }

    /// Validates `draft`, posts it, and reloads the expense list.
    ///
    /// # Errors
    /// Returns "Please enter a valid amount" for a bad amount, and the
    /// create failure otherwise.
    pub async fn add_expense(&mut self, draft: ExpenseDraft) -> Result<NewExpense> {
        let session = self.session.session();
        let new_expense = draft.build(session.user()).map_err(anyhow::Error::msg)?;
        if !session.is_authenticated() {
            return Err(ApiError::authentication("Not authenticated").into());
        }

        self.expenses.create(&new_expense).await?;
        Ok(new_expense)
    }

    pub fn session(&self) -> Session {
        self.session.session()
    }

    pub fn banks(&self) -> &BankRegistry {
        &self.banks
    }

    pub fn expenses(&self) -> &ExpenseLedger {
        &self.expenses
    }
}
