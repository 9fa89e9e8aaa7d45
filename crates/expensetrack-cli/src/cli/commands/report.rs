use anyhow::Result;
use expensetrack_core::money::{format_money, format_percent};
use expensetrack_core::report::CategoryBreakdown;
use expensetrack_core::{App, Config};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const BAR_WIDTH: usize = 20;

pub fn show(app: &App, config: &Config) -> Result<()> {
    super::require_login(app)?;

    let state = app.expenses().snapshot();
    super::ensure_loaded(&state)?;

    let breakdown = CategoryBreakdown::from_expenses(&state.items);
    let symbol = &config.currency_symbol;

    println!("Total spent: {}", format_money(breakdown.total_spent, symbol));
    println!();

    if breakdown.is_empty() {
        println!("No data to analyze.");
        return Ok(());
    }

    for share in &breakdown.categories {
        println!(
            "  {:<18} {:<20} {:>7}  {}",
            share.category,
            bar(share.percentage),
            format_percent(share.percentage),
            format_money(share.amount, symbol)
        );
    }

    if let Some(top) = breakdown.top() {
        println!();
        println!(
            "Your biggest expense category is {}, accounting for {}% of your spending.",
            top.category,
            top.percentage
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        );
    }
    Ok(())
}

fn bar(percentage: Decimal) -> String {
    let filled = (percentage.saturating_mul(Decimal::from(BAR_WIDTH)) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_usize()
        .unwrap_or(0)
        .min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
