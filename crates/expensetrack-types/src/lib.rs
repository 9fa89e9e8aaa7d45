//! Wire types shared by the ExpenseTrack API client and the CLI.
//!
//! Everything here mirrors what the server sends or accepts. The server is
//! loose about JSON types (ids and amounts arrive as numbers or strings), so
//! deserialization goes through the helpers in [`lenient`].

pub mod bank;
pub mod expense;
pub mod lenient;
pub mod user;

pub use bank::BankAccount;
pub use expense::{Category, Expense, NewExpense};
pub use user::{LoginRequest, LoginResponse, UserProfile, UserRole};
