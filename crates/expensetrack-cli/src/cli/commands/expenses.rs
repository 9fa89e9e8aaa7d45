//! Expense history, entry and category listing.

use anyhow::Result;
use expensetrack_core::expenses::ExpenseDraft;
use expensetrack_core::money::{format_money, sum_amounts};
use expensetrack_core::report::history_by_date;
use expensetrack_core::{App, Config};
use expensetrack_types::Category;

pub fn list(app: &App, config: &Config) -> Result<()> {
    super::require_login(app)?;

    let state = app.expenses().snapshot();
    super::ensure_loaded(&state)?;

    let groups = history_by_date(&state.items);
    if groups.is_empty() {
        println!("No expenses yet.");
        return Ok(());
    }

    let symbol = &config.currency_symbol;
    for group in groups {
        let day_total = sum_amounts(group.expenses.iter().map(|e| e.amount));
        println!("{}  ({})", group.date, format_money(day_total, symbol));
        for expense in group.expenses {
            let time = expense.time_of_day().unwrap_or("--:--");
            println!(
                "  {time}  {:<24}  {:<18}  -{}",
                expense.display_label(),
                expense.category,
                format_money(expense.amount, symbol)
            );
        }
    }
    Ok(())
}

pub async fn add(app: &mut App, config: &Config, draft: ExpenseDraft) -> Result<()> {
    super::require_login(app)?;

    let created = app.add_expense(draft).await?;
    super::check_interrupted()?;

    println!(
        "Expense added: {} for {} on {}",
        format_money(created.amount, &config.currency_symbol),
        created.description,
        created.date
    );

    // The expense exists on the server even if the reload failed.
    if let Some(error) = app.expenses().snapshot().error {
        eprintln!("Warning: could not reload expenses: {error}");
    }
    Ok(())
}

pub fn categories() {
    for category in Category::all() {
        println!("  {:<14} {}", category.slug(), category.label());
    }
}
