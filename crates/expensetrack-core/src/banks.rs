//! Bank Registry: the user's bank accounts.

use std::ops::{Deref, DerefMut};

use expensetrack_types::BankAccount;
use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::api::ApiClient;
use crate::collection::SyncedCollection;
use crate::money::sum_amounts;
use crate::session::Session;

/// Mirror of `GET /banks`.
pub struct BankRegistry {
    inner: SyncedCollection<BankAccount>,
}

impl BankRegistry {
    pub fn new(api: ApiClient, session: watch::Receiver<Session>) -> Self {
        Self {
            inner: SyncedCollection::new(api, session),
        }
    }

    /// Sum of all balances currently held.
    pub fn total_balance(&self) -> Decimal {
        self.inner.with_items(total_balance)
    }
}

impl Deref for BankRegistry {
    type Target = SyncedCollection<BankAccount>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for BankRegistry {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

pub fn total_balance(banks: &[BankAccount]) -> Decimal {
    sum_amounts(banks.iter().map(|bank| bank.balance))
}
