//! Context Assembler
//!
//! Collects everything the chat model needs to answer questions about the
//! user's money and renders it as a plain-text block appended to prompts:
//! - Net worth and this month's cash flow
//! - Category breakdowns for the current month
//! - Active goals with progress and deadlines
//! - The most recent transactions
//! - A few derived statistics (average daily spending, wants spending)

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;

use crate::config::{CategoryBucket, CategoryBuckets};
use crate::currency::{format_currency, format_short_date, Locale};
use crate::ledger::{month_start, CashFlow, Ledger};
use crate::models::{Goal, Transaction, TransactionType};

/// Number of recent transactions included by default
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// One goal as shown to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalLine {
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub progress_percent: f64,
    pub remaining: f64,
    pub target_date: Option<NaiveDate>,
    pub days_left: Option<i64>,
}

impl GoalLine {
    fn from_goal(goal: &Goal, today: NaiveDate) -> Self {
        Self {
            name: goal.name.clone(),
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            progress_percent: goal.progress_percent(),
            remaining: goal.remaining(),
            target_date: goal.target_date,
            days_left: goal.days_left(today),
        }
    }
}

/// Assembled financial picture for LLM prompts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialContext {
    pub as_of: DateTime<Utc>,
    pub net_worth: f64,
    pub month: CashFlow,
    /// Largest first
    pub expenses_by_category: Vec<(String, f64)>,
    pub income_by_category: Vec<(String, f64)>,
    pub goals: Vec<GoalLine>,
    /// Newest first
    pub recent_transactions: Vec<Transaction>,
    pub transaction_count: usize,
    /// This month's expenses divided by the day of month
    pub avg_daily_expense: f64,
    /// This month's spending in categories mapped to the wants bucket
    pub wants_total: f64,
    /// This month's spending in categories mapped to the savings bucket
    pub savings_total: f64,
}

impl FinancialContext {
    /// Render the context block
    pub fn render(&self, locale: Locale) -> String {
        let money = |amount: f64| format_currency(amount, locale);
        let mut out = String::new();

        let _ = writeln!(
            out,
            "\n\n--- USER FINANCIAL DATA ({} {}) ---",
            locale.month_name(self.as_of.month()),
            self.as_of.year()
        );

        out.push_str("\nFINANCIAL SUMMARY:\n");
        let _ = writeln!(out, "- Net worth: {}", money(self.net_worth));
        let _ = writeln!(out, "- Income this month: {}", money(self.month.income));
        let _ = writeln!(out, "- Expenses this month: {}", money(self.month.expense));
        let _ = writeln!(
            out,
            "- Remaining this month: {}",
            money(self.month.remaining())
        );

        if !self.expenses_by_category.is_empty() {
            out.push_str("\nEXPENSES BY CATEGORY:\n");
            for (category, amount) in &self.expenses_by_category {
                let share = if self.month.expense > 0.0 {
                    amount / self.month.expense * 100.0
                } else {
                    0.0
                };
                let _ = writeln!(out, "- {}: {} ({:.1}%)", category, money(*amount), share);
            }
        }

        if !self.income_by_category.is_empty() {
            out.push_str("\nINCOME BY CATEGORY:\n");
            for (category, amount) in &self.income_by_category {
                let _ = writeln!(out, "- {}: {}", category, money(*amount));
            }
        }

        if !self.goals.is_empty() {
            out.push_str("\nACTIVE GOALS:\n");
            for goal in &self.goals {
                let _ = writeln!(out, "- {}:", goal.name);
                let _ = writeln!(out, "  Target: {}", money(goal.target_amount));
                let _ = writeln!(
                    out,
                    "  Collected: {} ({:.1}%)",
                    money(goal.current_amount),
                    goal.progress_percent
                );
                let _ = writeln!(out, "  Remaining: {}", money(goal.remaining));
                if let (Some(date), Some(days)) = (goal.target_date, goal.days_left) {
                    let _ = writeln!(
                        out,
                        "  Deadline: {} ({} days left)",
                        format_short_date(date, locale),
                        days
                    );
                }
            }
        }

        if self.transaction_count > 0 {
            out.push_str("\nRECENT TRANSACTIONS (for pattern analysis):\n");
            for tx in &self.recent_transactions {
                let direction = match tx.tx_type {
                    TransactionType::Income => "IN",
                    TransactionType::Expense => "OUT",
                };
                let _ = write!(
                    out,
                    "- [{}] {}: {} - {}",
                    format_short_date(tx.transaction_at.date_naive(), locale),
                    direction,
                    money(tx.amount),
                    tx.category
                );
                if let Some(notes) = &tx.notes {
                    let _ = write!(out, " ({})", notes);
                }
                out.push('\n');
            }

            out.push_str("\nSTATISTICS:\n");
            let _ = writeln!(out, "- Transactions recorded: {}", self.transaction_count);
            let _ = writeln!(
                out,
                "- Average daily expense: {}",
                money(self.avg_daily_expense)
            );
            if self.wants_total > 0.0 {
                let _ = writeln!(out, "- Wants spending: {}", money(self.wants_total));
            }
            if self.savings_total > 0.0 {
                let _ = writeln!(
                    out,
                    "- Moved into savings: {}",
                    money(self.savings_total)
                );
            }
        }

        out.push_str("\n--- END OF FINANCIAL DATA ---\n");
        out
    }

    /// Template variables for prompt rendering
    pub fn to_template_vars(&self, locale: Locale) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        vars.insert("context", self.render(locale));
        vars.insert("net_worth", format_currency(self.net_worth, locale));
        vars.insert("month_income", format_currency(self.month.income, locale));
        vars.insert("month_expense", format_currency(self.month.expense, locale));
        vars.insert("goal_count", self.goals.len().to_string());

        if let Some((category, amount)) = self.expenses_by_category.first() {
            vars.insert(
                "top_expense",
                format!("{} ({})", category, format_currency(*amount, locale)),
            );
        }

        if !self.goals.is_empty() {
            let goals = self
                .goals
                .iter()
                .enumerate()
                .map(|(i, goal)| render_goal_detail(i + 1, goal, locale))
                .collect::<Vec<_>>()
                .join("\n");
            vars.insert("goals", goals);
        }

        vars
    }
}

/// Numbered goal entry used by the priority prompt
fn render_goal_detail(index: usize, goal: &GoalLine, locale: Locale) -> String {
    let mut out = format!(
        "{}. {}\n   - Target: {}\n   - Collected: {} ({:.1}%)\n   - Remaining: {}",
        index,
        goal.name,
        format_currency(goal.target_amount, locale),
        format_currency(goal.current_amount, locale),
        goal.progress_percent,
        format_currency(goal.remaining, locale)
    );
    if let (Some(date), Some(days)) = (goal.target_date, goal.days_left) {
        let _ = write!(
            out,
            "\n   - Deadline: {} ({} days left)",
            format_short_date(date, locale),
            days
        );
    }
    out
}

/// Assembles financial context from a ledger
pub struct ContextAssembler<'a> {
    categories: &'a CategoryBuckets,
    recent_limit: usize,
}

impl<'a> ContextAssembler<'a> {
    /// Create a new context assembler using `categories` for wants/savings
    pub fn new(categories: &'a CategoryBuckets) -> Self {
        Self {
            categories,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    /// Build the context as of `now`
    pub fn build(&self, ledger: &Ledger, now: DateTime<Utc>) -> FinancialContext {
        let today = now.date_naive();
        let month = ledger.month_cash_flow(now);

        let mut expenses_by_category: Vec<(String, f64)> =
            ledger.expense_by_category(now).into_iter().collect();
        expenses_by_category.sort_by(|a, b| b.1.total_cmp(&a.1));

        let (wants_total, savings_total) = self.bucket_totals(ledger, now);

        FinancialContext {
            as_of: now,
            net_worth: ledger.net_worth(),
            month,
            expenses_by_category,
            income_by_category: ledger.income_by_category(now).into_iter().collect(),
            goals: ledger
                .goals
                .iter()
                .map(|g| GoalLine::from_goal(g, today))
                .collect(),
            recent_transactions: ledger
                .recent_transactions(self.recent_limit)
                .into_iter()
                .cloned()
                .collect(),
            transaction_count: ledger.transactions.len(),
            avg_daily_expense: month.expense / f64::from(now.day()),
            wants_total,
            savings_total,
        }
    }

    /// This month's expenses in the wants and savings buckets
    fn bucket_totals(&self, ledger: &Ledger, now: DateTime<Utc>) -> (f64, f64) {
        let start = month_start(now);
        let mut wants = 0.0;
        let mut savings = 0.0;
        for tx in ledger
            .transactions
            .iter()
            .filter(|tx| tx.tx_type == TransactionType::Expense && tx.transaction_at >= start)
        {
            match self.categories.bucket_of(&tx.category) {
                Some(CategoryBucket::Wants) => wants += tx.amount,
                Some(CategoryBucket::Savings) => savings += tx.amount,
                Some(CategoryBucket::Needs) | None => {}
            }
        }
        (wants, savings)
    }
}
