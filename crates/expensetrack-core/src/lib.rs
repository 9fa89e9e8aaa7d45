//! Session and data-cache layer for the ExpenseTrack client.
//!
//! [`session::SessionStore`] owns the credential and publishes changes;
//! [`banks::BankRegistry`] and [`expenses::ExpenseLedger`] mirror the server
//! lists and re-fetch when the token changes. [`app::App`] wires them up.

pub mod api;
pub mod app;
pub mod banks;
pub mod collection;
pub mod config;
pub mod expenses;
pub mod interrupt;
pub mod logging;
pub mod money;
pub mod report;
pub mod session;
pub mod storage;

pub use app::App;
pub use config::Config;
