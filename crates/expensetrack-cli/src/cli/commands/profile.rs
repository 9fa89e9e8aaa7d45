use anyhow::Result;
use expensetrack_core::money::format_money;
use expensetrack_core::session::mask_token;
use expensetrack_core::{App, Config};

pub fn whoami(app: &App, config: &Config) -> Result<()> {
    super::require_login(app)?;

    let session = app.session();
    let Some(user) = session.user() else {
        return Ok(());
    };
    let symbol = &config.currency_symbol;

    println!("{}", user.name);
    println!("  Email:        {}", user.email);
    if let Some(phone) = user.phone_number.as_deref() {
        println!("  Phone:        {phone}");
    }
    if let Some(address) = user.address.as_deref() {
        println!("  Address:      {address}");
    }
    if let Some(role) = session.role().or_else(|| user.role_name()) {
        println!("  Role:         {role}");
    }
    if let Some(since) = user.member_since() {
        println!("  Member since: {since}");
    }
    println!("  Salary:       {}", format_money(user.salary_amount(), symbol));
    println!("  Saving goal:  {}", format_money(user.saving_goal_amount(), symbol));
    if let Some(token) = session.token() {
        println!("  Session:      {}", mask_token(token));
    }
    Ok(())
}
