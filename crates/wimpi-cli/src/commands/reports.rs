//! Report command implementations

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Utc};
use serde_json::json;
use wimpi_core::{format_currency, format_short_date, Locale, TrendRange, WimpiConfig};

use super::core::open_ledger;
use super::truncate;

/// Net worth, this month's cash flow and category breakdowns
pub fn cmd_summary(
    data: &Path,
    config: &WimpiConfig,
    now: DateTime<Utc>,
    json_output: bool,
) -> Result<()> {
    let ledger = open_ledger(data)?;
    let locale = config.display.locale;

    let net_worth = ledger.net_worth();
    let month = ledger.month_cash_flow(now);
    let expenses = sorted_desc(ledger.expense_by_category(now));
    let income = sorted_desc(ledger.income_by_category(now));

    if json_output {
        let out = json!({
            "as_of": now,
            "net_worth": net_worth,
            "month": {
                "income": month.income,
                "expense": month.expense,
                "remaining": month.remaining(),
            },
            "expense_by_category": expenses,
            "income_by_category": income,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "📊 Summary for {} {}",
        locale.month_name(now.month()),
        now.year()
    );
    println!();
    println!("   Net worth:      {}", format_currency(net_worth, locale));
    println!("   Income:         {}", format_currency(month.income, locale));
    println!("   Expenses:       {}", format_currency(month.expense, locale));
    println!(
        "   Remaining:      {}",
        format_currency(month.remaining(), locale)
    );

    print_breakdown("Expenses by category", &expenses, month.expense, locale);
    print_breakdown("Income by category", &income, month.income, locale);

    Ok(())
}

fn sorted_desc(map: BTreeMap<String, f64>) -> Vec<(String, f64)> {
    let mut items: Vec<(String, f64)> = map.into_iter().collect();
    items.sort_by(|a, b| b.1.total_cmp(&a.1));
    items
}

fn print_breakdown(title: &str, items: &[(String, f64)], total: f64, locale: Locale) {
    println!();
    println!("{}:", title);
    if items.is_empty() {
        println!("   (none this month)");
        return;
    }
    for (category, amount) in items {
        let pct = if total > 0.0 {
            amount / total * 100.0
        } else {
            0.0
        };
        println!(
            "   {:<24} {:>18} {:>6.1}%",
            truncate(category, 24),
            format_currency(*amount, locale),
            pct
        );
    }
}

/// Income and expense per bucket over a range
pub fn cmd_trend(data: &Path, config: &WimpiConfig, now: DateTime<Utc>, range: &str) -> Result<()> {
    let range: TrendRange = range.parse().map_err(|e: String| anyhow!(e))?;
    let ledger = open_ledger(data)?;
    let locale = config.display.locale;

    let points = ledger.cash_flow_trend(range, now);

    println!("📈 Cash flow ({})", range);
    println!();
    println!(
        "{:<12} {:>18} {:>18} {:>18}",
        "PERIOD", "INCOME", "EXPENSE", "NET"
    );
    println!("{}", "-".repeat(69));
    for point in &points {
        let net = point.income - point.expense;
        println!(
            "{:<12} {:>18} {:>18} {:>18}",
            point.label,
            format_currency(point.income, locale),
            format_currency(point.expense, locale),
            format_currency(net, locale)
        );
    }

    Ok(())
}

/// Running balance after every transaction
pub fn cmd_net_worth_trend(data: &Path, config: &WimpiConfig) -> Result<()> {
    let ledger = open_ledger(data)?;
    let locale = config.display.locale;

    let points = ledger.net_worth_trend();
    if points.is_empty() {
        println!("Not enough transactions for a net worth trend (need at least 2).");
        return Ok(());
    }

    println!("📈 Net worth");
    println!();
    for point in &points {
        println!(
            "   {:<12} {}",
            format_short_date(point.transaction_at.date_naive(), locale),
            format_currency(point.balance, locale)
        );
    }

    Ok(())
}
