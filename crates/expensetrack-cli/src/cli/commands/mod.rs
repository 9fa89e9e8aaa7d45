//! CLI command handlers.

use anyhow::{Result, bail};
use expensetrack_core::collection::CollectionState;
use expensetrack_core::session::RestoreOutcome;
use expensetrack_core::{App, Config, interrupt};

pub mod auth;
pub mod banks;
pub mod config;
pub mod dashboard;
pub mod expenses;
pub mod profile;
pub mod report;

const NOT_LOGGED_IN: &str = "Not logged in. Run `expensetrack login` first.";

/// Builds the app and restores the stored session, without fetching data.
pub fn restore_app(config: &Config) -> Result<App> {
    let mut app = App::from_config(config, interrupt::cancellation_token())?;
    warn_if_corrupted(&app.restore());
    Ok(app)
}

/// Builds the app, restores the stored session and loads its data.
pub async fn open_app(config: &Config) -> Result<App> {
    let mut app = App::from_config(config, interrupt::cancellation_token())?;
    warn_if_corrupted(&app.start().await);
    check_interrupted()?;

    Ok(app)
}

fn warn_if_corrupted(outcome: &RestoreOutcome) {
    if let RestoreOutcome::Corrupted { reason } = outcome {
        eprintln!("Warning: the stored session could not be read ({reason}). Please log in again.");
    }
}

pub fn check_interrupted() -> Result<()> {
    if interrupt::is_interrupted() {
        return Err(interrupt::InterruptedError.into());
    }
    Ok(())
}

pub fn require_login(app: &App) -> Result<()> {
    if !app.session().is_authenticated() {
        bail!(NOT_LOGGED_IN);
    }
    Ok(())
}

/// Turns an error recorded by a store into a command failure.
pub fn ensure_loaded<T>(state: &CollectionState<T>) -> Result<()> {
    check_interrupted()?;
    match &state.error {
        Some(error) => bail!("{error}"),
        None => Ok(()),
    }
}
