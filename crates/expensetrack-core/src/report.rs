//! Read-only projections over store snapshots for the dashboard,
//! history and category report views.

use expensetrack_types::{BankAccount, Expense, UserProfile};
use rust_decimal::Decimal;

use crate::banks::total_balance;
use crate::expenses::{category_totals, total_spent};

/// Number of expenses shown on the dashboard.
pub const RECENT_LIMIT: usize = 5;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// One row of the category report.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    /// Share of total spending, 0..=100.
    pub percentage: Decimal,
}

/// Category totals sorted by amount, largest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    pub total_spent: Decimal,
    pub categories: Vec<CategoryShare>,
}

impl CategoryBreakdown {
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        let total = total_spent(expenses);
        let mut categories: Vec<CategoryShare> = category_totals(expenses)
            .into_iter()
            .map(|(category, amount)| CategoryShare {
                percentage: percentage_of(amount, total),
                category,
                amount,
            })
            .collect();
        // Stable sort keeps ties in label order.
        categories.sort_by(|a, b| b.amount.cmp(&a.amount));

        Self {
            total_spent: total,
            categories,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category with the highest spending.
    pub fn top(&self) -> Option<&CategoryShare> {
        self.categories.first()
    }
}

/// `part` as a percentage of `total`, saturating when the ratio does not fit.
fn percentage_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(total)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .unwrap_or(if part.is_sign_negative() == total.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
}

/// Expenses sharing one `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup<'a> {
    pub date: &'a str,
    pub expenses: Vec<&'a Expense>,
}

/// Groups expenses by date, newest date first, server order within a day.
pub fn history_by_date(expenses: &[Expense]) -> Vec<DateGroup<'_>> {
    let mut groups: Vec<DateGroup<'_>> = Vec::new();
    for expense in expenses {
        match groups.iter_mut().find(|g| g.date == expense.date) {
            Some(group) => group.expenses.push(expense),
            None => groups.push(DateGroup {
                date: &expense.date,
                expenses: vec![expense],
            }),
        }
    }
    groups.sort_by(|a, b| b.date.cmp(a.date));
    groups
}

/// Figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub first_name: String,
    pub salary: Decimal,
    pub saving_goal: Decimal,
    pub total_spent: Decimal,
    pub remaining: Decimal,
    /// Spent share of salary, capped at 100; 0 without a salary.
    pub spending_progress: Decimal,
    pub total_balance: Decimal,
    pub recent: Vec<Expense>,
}

impl DashboardSummary {
    pub fn build(user: Option<&UserProfile>, banks: &[BankAccount], expenses: &[Expense]) -> Self {
        let salary = user.map_or(Decimal::ZERO, UserProfile::salary_amount);
        let saving_goal = user.map_or(Decimal::ZERO, UserProfile::saving_goal_amount);
        let spent = total_spent(expenses);

        let spending_progress = if salary > Decimal::ZERO {
            percentage_of(spent, salary).min(HUNDRED)
        } else {
            Decimal::ZERO
        };

        Self {
            first_name: user.map_or("User", UserProfile::first_name).to_string(),
            salary,
            saving_goal,
            total_spent: spent,
            remaining: salary.saturating_sub(spent),
            spending_progress,
            total_balance: total_balance(banks),
            recent: expenses.iter().take(RECENT_LIMIT).cloned().collect(),
        }
    }
}
