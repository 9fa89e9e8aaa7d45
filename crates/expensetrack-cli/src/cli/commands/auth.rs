//! Login and logout handlers.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use expensetrack_core::App;

pub async fn login(app: &mut App, email: &str, password: Option<String>) -> Result<()> {
    let email = email.trim();
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    if email.is_empty() || password.trim().is_empty() {
        bail!("Please enter your email and password.");
    }

    app.login(email, &password).await?;
    super::check_interrupted()?;

    let session = app.session();
    if let Some(user) = session.user() {
        println!("Logged in as {} <{}>", user.name, user.email);
    }
    if let Some(role) = session.role() {
        println!("Role: {role}");
    }
    Ok(())
}

pub async fn logout(app: &mut App) -> Result<()> {
    if app.logout().await? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
