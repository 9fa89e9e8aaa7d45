use anyhow::Result;
use expensetrack_core::money::format_money;
use expensetrack_core::{App, Config};

pub fn list(app: &App, config: &Config) -> Result<()> {
    super::require_login(app)?;

    let registry = app.banks();
    let state = registry.snapshot();
    super::ensure_loaded(&state)?;

    if state.items.is_empty() {
        println!("No bank accounts.");
        return Ok(());
    }

    let symbol = &config.currency_symbol;
    for bank in &state.items {
        let card = bank.masked_card_number().unwrap_or_default();
        println!(
            "  #{:<4} {:<20} {:<14} {:>14}  {card}",
            bank.id,
            bank.name,
            bank.purpose,
            format_money(bank.balance, symbol)
        );
    }
    println!();
    println!("Total balance: {}", format_money(registry.total_balance(), symbol));
    Ok(())
}
