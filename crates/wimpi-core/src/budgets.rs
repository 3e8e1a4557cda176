//! Monthly category budgets
//!
//! Budgets belong to a period written `YYYY-MM`. Spending is matched to a
//! budget by exact category name within that calendar month.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Budget, Transaction, TransactionType};

/// A budget with its spending for the period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetItem {
    pub id: i64,
    pub category: String,
    pub amount: f64,
    pub period: String,
    pub spent: f64,
    /// Negative when overspent
    pub remaining: f64,
    /// Share of the budget spent, 0 when the budget amount is 0
    pub percentage: f64,
}

/// Spending in a category that has no budget for the period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnbudgetedSpending {
    pub category: String,
    pub spent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
}

/// Budgets of one period with actual spending applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetReport {
    pub period: String,
    /// Highest percentage first
    pub items: Vec<BudgetItem>,
    /// Largest spending first
    pub unbudgeted: Vec<UnbudgetedSpending>,
}

impl BudgetReport {
    pub fn summary(&self) -> BudgetSummary {
        let total_budget: f64 = self.items.iter().map(|i| i.amount).sum();
        let total_spent: f64 = self.items.iter().map(|i| i.spent).sum();
        BudgetSummary {
            total_budget,
            total_spent,
            total_remaining: total_budget - total_spent,
        }
    }
}

/// Parse a `YYYY-MM` period into the first day of that month
pub fn parse_period(period: &str) -> Result<NaiveDate> {
    let invalid = || {
        Error::InvalidData(format!(
            "Invalid budget period: {} (expected YYYY-MM)",
            period
        ))
    };
    let (year, month) = period.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Period containing `now`
pub fn current_period(now: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", now.year(), now.month())
}

/// Period immediately before `period`
pub fn previous_period(period: &str) -> Result<String> {
    let start = parse_period(period)?;
    let prev = start
        .checked_sub_months(Months::new(1))
        .ok_or_else(|| Error::InvalidData(format!("No period before {}", period)))?;
    Ok(format!("{:04}-{:02}", prev.year(), prev.month()))
}

/// Apply a period's expenses to its budgets
pub fn process_budgets(
    budgets: &[Budget],
    transactions: &[Transaction],
    period: &str,
) -> Result<BudgetReport> {
    let start = parse_period(period)?;

    let mut spending: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| {
        let date = tx.transaction_at.date_naive();
        tx.tx_type == TransactionType::Expense
            && date.year() == start.year()
            && date.month() == start.month()
    }) {
        *spending.entry(tx.category.as_str()).or_insert(0.0) += tx.amount;
    }

    let mut items: Vec<BudgetItem> = budgets
        .iter()
        .filter(|b| b.period == period)
        .map(|b| {
            let spent = spending.get(b.category.as_str()).copied().unwrap_or(0.0);
            BudgetItem {
                id: b.id,
                category: b.category.clone(),
                amount: b.amount,
                period: b.period.clone(),
                spent,
                remaining: b.amount - spent,
                percentage: if b.amount > 0.0 {
                    spent / b.amount * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();
    items.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

    let budgeted: HashSet<&str> = items.iter().map(|i| i.category.as_str()).collect();
    let mut unbudgeted: Vec<UnbudgetedSpending> = spending
        .into_iter()
        .filter(|(category, _)| !budgeted.contains(category))
        .map(|(category, spent)| UnbudgetedSpending {
            category: category.to_string(),
            spent,
        })
        .collect();
    unbudgeted.sort_by(|a, b| b.spent.total_cmp(&a.spent));

    Ok(BudgetReport {
        period: period.to_string(),
        items,
        unbudgeted,
    })
}

/// Create or update the budget for `category` in `period`. Returns its id.
pub fn set_budget(
    budgets: &mut Vec<Budget>,
    category: &str,
    amount: f64,
    period: &str,
) -> Result<i64> {
    parse_period(period)?;
    if amount.is_nan() || amount < 0.0 {
        return Err(Error::InvalidAmount(format!(
            "Budget amount must not be negative (got {})",
            amount
        )));
    }
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::InvalidData("Budget category must not be empty".into()));
    }

    if let Some(existing) = budgets
        .iter_mut()
        .find(|b| b.period == period && b.category == category)
    {
        existing.amount = amount;
        return Ok(existing.id);
    }

    let id = budgets.iter().map(|b| b.id).max().unwrap_or(0) + 1;
    budgets.push(Budget {
        id,
        category: category.to_string(),
        amount,
        period: period.to_string(),
    });
    Ok(id)
}

/// Remove one budget by id
pub fn delete_budget(budgets: &mut Vec<Budget>, id: i64) -> Result<Budget> {
    let pos = budgets
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(|| Error::NotFound(format!("Budget {}", id)))?;
    Ok(budgets.remove(pos))
}

/// Copy every budget of `from_period` into `to_period`
///
/// Existing budgets for the same category in `to_period` are replaced.
/// Returns the number of budgets written.
pub fn copy_budgets(
    budgets: &mut Vec<Budget>,
    from_period: &str,
    to_period: &str,
) -> Result<usize> {
    parse_period(from_period)?;
    parse_period(to_period)?;

    let source: Vec<Budget> = budgets
        .iter()
        .filter(|b| b.period == from_period)
        .cloned()
        .collect();
    if source.is_empty() {
        return Err(Error::NotFound(format!(
            "No budgets found for {} to copy",
            from_period
        )));
    }

    let mut next_id = budgets.iter().map(|b| b.id).max().unwrap_or(0) + 1;
    for budget in &source {
        match budgets
            .iter_mut()
            .find(|b| b.period == to_period && b.category == budget.category)
        {
            Some(existing) => existing.amount = budget.amount,
            None => {
                budgets.push(Budget {
                    id: next_id,
                    category: budget.category.clone(),
                    amount: budget.amount,
                    period: to_period.to_string(),
                });
                next_id += 1;
            }
        }
    }

    debug!(from_period, to_period, count = source.len(), "Copied budgets");
    Ok(source.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn budget(id: i64, category: &str, amount: f64, period: &str) -> Budget {
        Budget {
            id,
            category: category.into(),
            amount,
            period: period.into(),
        }
    }

    fn expense(y: i32, m: u32, d: u32, amount: f64, category: &str) -> Transaction {
        Transaction::new(
            Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            TransactionType::Expense,
            amount,
            category,
        )
    }

    #[test]
    fn test_process_budgets() {
        let budgets = vec![
            budget(1, "Food", 1_000_000.0, "2026-10"),
            budget(2, "Transport", 500_000.0, "2026-10"),
            budget(3, "Gifts", 0.0, "2026-10"),
            budget(4, "Food", 900_000.0, "2026-09"),
        ];
        let txs = vec![
            expense(2026, 10, 2, 300_000.0, "Food"),
            expense(2026, 10, 31, 200_000.0, "Food"),
            expense(2026, 10, 5, 450_000.0, "Transport"),
            expense(2026, 10, 6, 80_000.0, "Games"),
            expense(2026, 9, 30, 999.0, "Food"),
            Transaction::new(
                Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
                TransactionType::Income,
                5_000_000.0,
                "Food",
            ),
        ];

        let report = process_budgets(&budgets, &txs, "2026-10").unwrap();
        let categories: Vec<&str> = report.items.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(categories, vec!["Transport", "Food", "Gifts"]);

        let food = &report.items[1];
        assert_eq!(food.spent, 500_000.0);
        assert_eq!(food.remaining, 500_000.0);
        assert_eq!(food.percentage, 50.0);
        assert_eq!(report.items[2].percentage, 0.0);

        assert_eq!(
            report.unbudgeted,
            vec![UnbudgetedSpending {
                category: "Games".into(),
                spent: 80_000.0
            }]
        );

        let summary = report.summary();
        assert_eq!(summary.total_budget, 1_500_000.0);
        assert_eq!(summary.total_spent, 950_000.0);
        assert_eq!(summary.total_remaining, 550_000.0);
    }

    #[test]
    fn test_overspent_budget() {
        let budgets = vec![budget(1, "Food", 100.0, "2026-10")];
        let txs = vec![expense(2026, 10, 2, 150.0, "Food")];
        let report = process_budgets(&budgets, &txs, "2026-10").unwrap();
        assert_eq!(report.items[0].remaining, -50.0);
        assert_eq!(report.items[0].percentage, 150.0);
    }

    #[test]
    fn test_copy_budgets_upserts() {
        let mut budgets = vec![
            budget(1, "Food", 1_000_000.0, "2026-09"),
            budget(2, "Transport", 500_000.0, "2026-09"),
            budget(3, "Food", 750_000.0, "2026-10"),
        ];
        let copied = copy_budgets(&mut budgets, "2026-09", "2026-10").unwrap();
        assert_eq!(copied, 2);
        assert_eq!(budgets.len(), 4);

        let october: Vec<&Budget> = budgets.iter().filter(|b| b.period == "2026-10").collect();
        assert_eq!(october.len(), 2);
        let food = october.iter().find(|b| b.category == "Food").unwrap();
        assert_eq!(food.id, 3);
        assert_eq!(food.amount, 1_000_000.0);
        let transport = october.iter().find(|b| b.category == "Transport").unwrap();
        assert_eq!(transport.id, 4);
    }

    #[test]
    fn test_copy_budgets_empty_source() {
        let mut budgets = vec![budget(1, "Food", 1.0, "2026-10")];
        assert!(matches!(
            copy_budgets(&mut budgets, "2026-08", "2026-10"),
            Err(Error::NotFound(_))
        ));
        assert_eq!(budgets.len(), 1);
    }

    #[test]
    fn test_set_budget_upserts() {
        let mut budgets = vec![budget(1, "Food", 100.0, "2026-10")];
        assert_eq!(set_budget(&mut budgets, "Food", 250.0, "2026-10").unwrap(), 1);
        assert_eq!(budgets[0].amount, 250.0);
        assert_eq!(set_budget(&mut budgets, "Rent", 900.0, "2026-10").unwrap(), 2);
        assert_eq!(budgets.len(), 2);
        assert!(matches!(
            set_budget(&mut budgets, "Rent", -1.0, "2026-10"),
            Err(Error::InvalidAmount(_))
        ));
        assert!(set_budget(&mut budgets, "Rent", 1.0, "Oct").is_err());
    }

    #[test]
    fn test_delete_budget() {
        let mut budgets = vec![
            budget(1, "Food", 100.0, "2026-10"),
            budget(2, "Rent", 900.0, "2026-10"),
        ];
        let removed = delete_budget(&mut budgets, 1).unwrap();
        assert_eq!(removed.category, "Food");
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].id, 2);
        assert!(matches!(
            delete_budget(&mut budgets, 1),
            Err(Error::NotFound(_))
        ));
        // Ids keep increasing after a delete
        assert_eq!(set_budget(&mut budgets, "Food", 50.0, "2026-10").unwrap(), 3);
    }

    #[test]
    fn test_period_helpers() {
        assert_eq!(
            parse_period("2026-02").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
        );
        assert!(parse_period("2026-13").is_err());
        assert!(parse_period("2026-1").is_err());
        assert!(parse_period("October").is_err());
        assert_eq!(previous_period("2026-01").unwrap(), "2025-12");
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        assert_eq!(current_period(now), "2026-10");
    }
}
