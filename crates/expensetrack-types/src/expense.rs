//! Expense records and the categories the client offers.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::lenient;

/// A recorded expense (`GET /expenses`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(deserialize_with = "lenient::id")]
    pub user_id: i64,
    #[serde(deserialize_with = "lenient::id")]
    pub bank_id: i64,
    #[serde(deserialize_with = "lenient::decimal")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
}

impl Expense {
    /// Description, or the category when no description was given.
    pub fn display_label(&self) -> &str {
        if self.description.trim().is_empty() {
            &self.category
        } else {
            &self.description
        }
    }

    /// `HH:MM` taken from an ISO `created_at` timestamp.
    pub fn time_of_day(&self) -> Option<&str> {
        let (_, time) = self.created_at.as_deref()?.split_once('T')?;
        time.get(..5)
    }
}

/// Body of `POST /expenses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub bank_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

/// Spending categories offered when adding an expense.
///
/// The server stores categories as free text; these are the labels the
/// client writes and groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    FoodAndDining,
    Transportation,
    Shopping,
    BillsAndUtilities,
    Entertainment,
    Other,
}

impl Category {
    /// All categories in display order.
    pub fn all() -> &'static [Category] {
        &[
            Category::FoodAndDining,
            Category::Transportation,
            Category::Shopping,
            Category::BillsAndUtilities,
            Category::Entertainment,
            Category::Other,
        ]
    }

    /// Label sent to and received from the server.
    pub fn label(self) -> &'static str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Shopping => "Shopping",
            Category::BillsAndUtilities => "Bills & Utilities",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }

    /// Short form accepted on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            Category::FoodAndDining => "food",
            Category::Transportation => "transport",
            Category::Shopping => "shopping",
            Category::BillsAndUtilities => "bills",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Category::all()
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(needle) || c.slug().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                let known: Vec<&str> = Category::all().iter().map(|c| c.slug()).collect();
                format!("Unknown category: {needle} (expected one of: {})", known.join(", "))
            })
    }
}
