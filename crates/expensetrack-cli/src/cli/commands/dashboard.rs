use anyhow::Result;
use expensetrack_core::money::{format_money, format_percent};
use expensetrack_core::report::DashboardSummary;
use expensetrack_core::{App, Config};

pub fn show(app: &App, config: &Config) -> Result<()> {
    super::require_login(app)?;

    let banks = app.banks().snapshot();
    let expenses = app.expenses().snapshot();
    super::ensure_loaded(&banks)?;
    super::ensure_loaded(&expenses)?;

    let session = app.session();
    let summary = DashboardSummary::build(session.user(), &banks.items, &expenses.items);
    let money = |amount| format_money(amount, &config.currency_symbol);

    println!("Good day, {}", summary.first_name);
    println!();
    println!("  Salary:        {}", money(summary.salary));
    println!("  Spent:         {}", money(summary.total_spent));
    println!("  Remaining:     {}", money(summary.remaining));
    println!(
        "  Progress:      {} of salary spent",
        format_percent(summary.spending_progress)
    );
    println!("  Saving goal:   {}", money(summary.saving_goal));
    println!("  Bank balance:  {}", money(summary.total_balance));
    println!();

    if summary.recent.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }

    println!("Recent transactions:");
    for expense in &summary.recent {
        println!(
            "  {:<10}  {:<24}  {:<18}  -{}",
            expense.date,
            expense.display_label(),
            expense.category,
            money(expense.amount)
        );
    }
    Ok(())
}
