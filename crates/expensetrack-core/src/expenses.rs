//! Expense Ledger: expense records, creation, and spending totals.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use chrono::{Local, NaiveDate};
use expensetrack_types::lenient::parse_decimal;
use expensetrack_types::{Category, Expense, NewExpense, UserProfile};
use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::collection::SyncedCollection;
use crate::money::sum_amounts;
use crate::session::Session;

/// Bank used when the user has no salary bank configured.
pub const FALLBACK_BANK_ID: i64 = 1;

const INVALID_AMOUNT: &str = "Please enter a valid amount";

/// Mirror of `GET /expenses`, plus `POST /expenses`.
pub struct ExpenseLedger {
    inner: SyncedCollection<Expense>,
}

impl ExpenseLedger {
    pub fn new(api: ApiClient, session: watch::Receiver<Session>) -> Self {
        Self {
            inner: SyncedCollection::new(api, session),
        }
    }

    /// Posts a new expense, then re-fetches the whole list.
    ///
    /// The created record is never inserted locally; the list only changes
    /// through the re-fetch.
    ///
    /// # Errors
    /// Returns an authentication error without a token, and the server's
    /// message (or "Failed to add expense") when the POST is rejected.
    pub async fn create(&mut self, expense: &NewExpense) -> ApiResult<()> {
        let token = self
            .inner
            .current_token()
            .ok_or_else(|| ApiError::authentication("Not authenticated"))?;

        self.inner.api().create_expense(&token, expense).await?;
        tracing::info!(category = %expense.category, bank_id = expense.bank_id, "Expense added");

        self.inner.fetch().await;
        Ok(())
    }

    pub fn total_spent(&self) -> Decimal {
        self.inner.with_items(total_spent)
    }

    pub fn category_totals(&self) -> BTreeMap<String, Decimal> {
        self.inner.with_items(category_totals)
    }
}

impl Deref for ExpenseLedger {
    type Target = SyncedCollection<Expense>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ExpenseLedger {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

pub fn total_spent(expenses: &[Expense]) -> Decimal {
    sum_amounts(expenses.iter().map(|expense| expense.amount))
}

/// Sum of amounts per category label. Every category present appears once.
pub fn category_totals(expenses: &[Expense]) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for expense in expenses {
        let total = totals
            .entry(expense.category.clone())
            .or_insert(Decimal::ZERO);
        *total = total.saturating_add(expense.amount);
    }
    totals
}

/// Raw expense input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub amount: String,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub bank_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

impl ExpenseDraft {
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            ..Self::default()
        }
    }

    /// Validates the draft and fills in defaults.
    ///
    /// The bank falls back to the user's salary bank, then to
    /// [`FALLBACK_BANK_ID`]. A blank description becomes the category label.
    ///
    /// # Errors
    /// Returns "Please enter a valid amount" when the amount does not parse.
    pub fn build(self, user: Option<&UserProfile>) -> Result<NewExpense, String> {
        let amount = parse_decimal(&self.amount).map_err(|err| {
            tracing::debug!(error = %err, "Rejected expense amount");
            INVALID_AMOUNT.to_string()
        })?;

        let category = self.category.unwrap_or_default();
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| category.label().to_string());
        let bank_id = self
            .bank_id
            .or_else(|| user.and_then(UserProfile::salary_bank))
            .unwrap_or(FALLBACK_BANK_ID);
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());

        Ok(NewExpense {
            bank_id,
            amount,
            category: category.label().to_string(),
            description,
            date,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::ApiErrorKind;
    use crate::session::SessionStore;
    use crate::storage::MemoryStore;

    fn expense(id: i64, amount: &str, category: &str) -> Expense {
        serde_json::from_value(json!({
            "id": id, "user_id": 1, "bank_id": 1, "amount": amount,
            "category": category, "description": "", "date": "2024-05-01"
        }))
        .unwrap()
    }

    #[test]
    fn test_totals_for_mixed_categories() {
        let expenses = vec![
            expense(1, "100", "Food & Dining"),
            expense(2, "250", "Food & Dining"),
            expense(3, "50", "Transportation"),
        ];

        assert_eq!(total_spent(&expenses), Decimal::from(400));

        let totals = category_totals(&expenses);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Food & Dining"], Decimal::from(350));
        assert_eq!(totals["Transportation"], Decimal::from(50));
        assert_eq!(totals.values().copied().sum::<Decimal>(), total_spent(&expenses));
    }

    #[test]
    fn test_totals_of_nothing() {
        assert_eq!(total_spent(&[]), Decimal::ZERO);
        assert!(category_totals(&[]).is_empty());
    }

    #[test]
    fn test_totals_saturate_on_huge_amounts() {
        let expenses = vec![
            expense(1, "50000000000000000000000000000", "Other"),
            expense(2, "50000000000000000000000000000", "Other"),
        ];

        assert_eq!(total_spent(&expenses), Decimal::MAX);
        assert_eq!(category_totals(&expenses)["Other"], Decimal::MAX);
    }

    #[test]
    fn test_draft_rejects_non_numeric_amount() {
        for raw in ["", "abc", "12abc", "1,000"] {
            let err = ExpenseDraft::new(raw).build(None).unwrap_err();
            assert_eq!(err, "Please enter a valid amount", "input {raw:?}");
        }
    }

    #[test]
    fn test_draft_fills_defaults() {
        let user: UserProfile =
            serde_json::from_value(json!({"id": 1, "salary_bank_id": "4"})).unwrap();

        let built = ExpenseDraft::new("99.90").build(Some(&user)).unwrap();
        assert_eq!(built.amount, Decimal::new(9990, 2));
        assert_eq!(built.category, "Food & Dining");
        assert_eq!(built.description, "Food & Dining");
        assert_eq!(built.bank_id, 4);
        assert_eq!(built.date, Local::now().date_naive());

        let built = ExpenseDraft::new("5").build(None).unwrap();
        assert_eq!(built.bank_id, FALLBACK_BANK_ID);
    }

    #[test]
    fn test_draft_explicit_values_win() {
        let user: UserProfile =
            serde_json::from_value(json!({"id": 1, "salary_bank_id": "4"})).unwrap();
        let draft = ExpenseDraft {
            amount: " 42 ".to_string(),
            category: Some(Category::Transportation),
            description: Some("Metro card".to_string()),
            bank_id: Some(7),
            date: NaiveDate::from_ymd_opt(2024, 2, 29),
        };

        let built = draft.build(Some(&user)).unwrap();
        assert_eq!(built.amount, Decimal::from(42));
        assert_eq!(built.category, "Transportation");
        assert_eq!(built.description, "Metro card");
        assert_eq!(built.bank_id, 7);
        assert_eq!(built.date.to_string(), "2024-02-29");
    }

    async fn ledger_for(server: &MockServer) -> (SessionStore, ExpenseLedger) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok", "user": {"id": 1, "name": "Asha"}, "role": "user"
            })))
            .mount(server)
            .await;

        let api = ApiClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let mut store = SessionStore::new(MemoryStore::new(), api.clone());
        store.restore();
        store.login("asha@example.com", "pw").await.unwrap();
        let ledger = ExpenseLedger::new(api, store.subscribe());
        (store, ledger)
    }

    #[tokio::test]
    async fn test_create_refetches_list() {
        let server = MockServer::start().await;
        let (_store, mut ledger) = ledger_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/expenses"))
            .and(body_partial_json(json!({"amount": 100.0, "category": "Food & Dining"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/expenses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 9, "user_id": 1, "bank_id": 1, "amount": "100.00",
                 "category": "Food & Dining", "description": "Food & Dining", "date": "2024-05-01"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let new_expense = ExpenseDraft::new("100").build(None).unwrap();
        ledger.create(&new_expense).await.unwrap();

        assert_eq!(ledger.snapshot().items.len(), 1);
        assert_eq!(ledger.total_spent(), Decimal::from(100));
    }

    #[tokio::test]
    async fn test_create_refetch_replaces_existing_records() {
        let server = MockServer::start().await;
        let (_store, mut ledger) = ledger_for(&server).await;

        let existing = json!({"id": 1, "user_id": 1, "bank_id": 1, "amount": "40",
            "category": "Transportation", "description": "Bus", "date": "2024-04-30"});
        let created = json!({"id": 9, "user_id": 1, "bank_id": 1, "amount": "100.00",
            "category": "Food & Dining", "description": "Food & Dining", "date": "2024-05-01"});

        Mock::given(method("GET"))
            .and(path("/expenses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([existing.clone()])))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/expenses"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/expenses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([created, existing])))
            .expect(1)
            .mount(&server)
            .await;

        assert!(ledger.sync().await);
        assert_eq!(ledger.total_spent(), Decimal::from(40));

        let new_expense = ExpenseDraft::new("100").build(None).unwrap();
        ledger.create(&new_expense).await.unwrap();

        let ids: Vec<i64> = ledger.snapshot().items.iter().map(|e| e.id).collect();
        assert_eq!(ids, [9, 1]);
        assert_eq!(ledger.total_spent(), Decimal::from(140));
    }

    #[tokio::test]
    async fn test_create_failure_uses_server_message_and_skips_refetch() {
        let server = MockServer::start().await;
        let (_store, mut ledger) = ledger_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/expenses"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"message": "The bank id field is invalid."})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/expenses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let new_expense = ExpenseDraft::new("10").build(None).unwrap();
        let err = ledger.create(&new_expense).await.unwrap_err();
        assert_eq!(err.message, "The bank id field is invalid.");
    }

    #[tokio::test]
    async fn test_create_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let mut store = SessionStore::new(MemoryStore::new(), api.clone());
        store.restore();
        let mut ledger = ExpenseLedger::new(api, store.subscribe());

        let new_expense = ExpenseDraft::new("10").build(None).unwrap();
        let err = ledger.create(&new_expense).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Authentication);
        assert_eq!(err.message, "Not authenticated");
    }
}
