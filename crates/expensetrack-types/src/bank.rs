use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::lenient;

/// A bank account owned by the authenticated user (`GET /banks`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(deserialize_with = "lenient::id")]
    pub user_id: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub purpose: String,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub balance: Decimal,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub card_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub expiry_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub cvv: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub holder_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
}

impl BankAccount {
    /// Card number reduced to its last four digits, e.g. `•••• 4242`.
    pub fn masked_card_number(&self) -> Option<String> {
        let digits: Vec<char> = self
            .card_number
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if digits.len() < 4 {
            return None;
        }
        let last_four: String = digits[digits.len() - 4..].iter().collect();
        Some(format!("•••• {last_four}"))
    }
}
