//! User identity as returned by `POST /login`.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

/// Role attached to a user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
}

/// Snapshot of the authenticated user.
///
/// The client never edits a profile in place; a new login replaces it whole.
/// Fields the client does not model are kept in `extra` so that a persisted
/// profile restores to exactly what the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub email_verified_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub role_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub saving_goal: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub notifications_enabled: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub salary_bank_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub last_notification_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub profile_pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// First word of the display name, or "User" when the name is blank.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("User")
    }

    /// Monthly salary; unparsable or missing values count as zero.
    pub fn salary_amount(&self) -> Decimal {
        parse_amount(self.salary.as_deref())
    }

    /// Saving goal; unparsable or missing values count as zero.
    pub fn saving_goal_amount(&self) -> Decimal {
        parse_amount(self.saving_goal.as_deref())
    }

    /// Bank the salary is paid into, if the profile names one.
    pub fn salary_bank(&self) -> Option<i64> {
        self.salary_bank_id
            .as_deref()
            .and_then(|id| id.trim().parse().ok())
    }

    /// Role name from the nested role object, if any.
    pub fn role_name(&self) -> Option<&str> {
        self.role
            .as_ref()
            .map(|role| role.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Date part (`YYYY-MM-DD`) of `created_at`.
    pub fn member_since(&self) -> Option<&str> {
        self.created_at.as_deref().and_then(|ts| ts.get(..10))
    }
}

fn parse_amount(value: Option<&str>) -> Decimal {
    value
        .and_then(|v| lenient::parse_decimal(v).ok())
        .unwrap_or(Decimal::ZERO)
}

/// Body of `POST /login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful `POST /login` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub role: Option<String>,
}
