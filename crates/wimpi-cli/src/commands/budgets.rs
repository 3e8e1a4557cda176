//! Budget command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use wimpi_core::budgets::{current_period, previous_period};
use wimpi_core::{
    copy_budgets, delete_budget, format_currency, process_budgets, set_budget, WimpiConfig,
};

use super::core::{open_ledger, open_ledger_for_write, save_ledger};
use super::truncate;

/// Budgets of a period with actual spending
pub fn cmd_budgets_report(
    data: &Path,
    config: &WimpiConfig,
    now: DateTime<Utc>,
    period: Option<&str>,
) -> Result<()> {
    let ledger = open_ledger(data)?;
    let locale = config.display.locale;
    let period = period.map_or_else(|| current_period(now), String::from);

    let report = process_budgets(&ledger.budgets, &ledger.transactions, &period)?;

    println!("💰 Budgets for {}", report.period);
    println!();

    if report.items.is_empty() {
        println!("   No budgets for this period.");
        println!(
            "   Set one with: wimpi budgets set --category Food --amount 1500000 --period {}",
            report.period
        );
    } else {
        println!(
            "{:<20} {:>16} {:>16} {:>16} {:>7}",
            "CATEGORY", "BUDGET", "SPENT", "REMAINING", "USED"
        );
        println!("{}", "-".repeat(79));
        for item in &report.items {
            let flag = if item.remaining < 0.0 { " ⚠️" } else { "" };
            println!(
                "{:<20} {:>16} {:>16} {:>16} {:>6.0}%{}",
                truncate(&item.category, 20),
                format_currency(item.amount, locale),
                format_currency(item.spent, locale),
                format_currency(item.remaining, locale),
                item.percentage,
                flag
            );
        }

        let summary = report.summary();
        println!("{}", "-".repeat(79));
        println!(
            "{:<20} {:>16} {:>16} {:>16}",
            "TOTAL",
            format_currency(summary.total_budget, locale),
            format_currency(summary.total_spent, locale),
            format_currency(summary.total_remaining, locale)
        );
    }

    if !report.unbudgeted.is_empty() {
        println!();
        println!("Spending without a budget:");
        for item in &report.unbudgeted {
            println!(
                "   {:<20} {:>16}",
                truncate(&item.category, 20),
                format_currency(item.spent, locale)
            );
        }
    }

    Ok(())
}

/// Create or update one budget
pub fn cmd_budgets_set(
    data: &Path,
    now: DateTime<Utc>,
    category: &str,
    amount: f64,
    period: Option<&str>,
) -> Result<()> {
    let mut ledger = open_ledger_for_write(data)?;
    let period = period.map_or_else(|| current_period(now), String::from);

    let id = set_budget(&mut ledger.budgets, category, amount, &period)?;
    save_ledger(&ledger, data)?;

    println!("✅ Budget #{} for {} in {} saved", id, category.trim(), period);
    Ok(())
}

pub fn cmd_budgets_delete(data: &Path, id: i64) -> Result<()> {
    let mut ledger = open_ledger_for_write(data)?;
    let budget = delete_budget(&mut ledger.budgets, id)?;
    save_ledger(&ledger, data)?;

    println!(
        "🗑️  Deleted budget #{} for {} in {}",
        budget.id, budget.category, budget.period
    );
    Ok(())
}

/// Copy budgets between periods (default: previous month into this month)
pub fn cmd_budgets_copy(
    data: &Path,
    now: DateTime<Utc>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let mut ledger = open_ledger_for_write(data)?;
    let to = to.map_or_else(|| current_period(now), String::from);
    let from = match from {
        Some(p) => p.to_string(),
        None => previous_period(&to).context("Invalid --to period")?,
    };

    let count = copy_budgets(&mut ledger.budgets, &from, &to)?;
    save_ledger(&ledger, data)?;

    println!("✅ Copied {} budget(s) from {} to {}", count, from, to);
    Ok(())
}
