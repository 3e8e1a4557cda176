//! Goal and transaction command implementations

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use wimpi_core::{
    format_currency, format_short_date, GoalUpdate, Ledger, Transaction, TransactionType,
    TransactionUpdate, WimpiConfig,
};

use super::core::{open_ledger, open_ledger_for_write, parse_date, save_ledger};
use super::truncate;

/// Resolve a goal id or name to its id
fn resolve_goal(ledger: &Ledger, key: &str) -> Result<i64> {
    ledger
        .find_goal(key)
        .map(|g| g.id)
        .ok_or_else(|| anyhow!("Goal not found: {}", key))
}

pub fn cmd_goals_list(data: &Path, config: &WimpiConfig, now: DateTime<Utc>) -> Result<()> {
    let ledger = open_ledger(data)?;
    let locale = config.display.locale;
    let today = now.date_naive();

    if ledger.goals.is_empty() {
        println!("No goals yet. Create one with: wimpi goals add <name> --target <amount>");
        return Ok(());
    }

    println!(
        "{:>4}  {:<22} {:>16} {:>16} {:>7}  {}",
        "ID", "NAME", "TARGET", "COLLECTED", "DONE", "DEADLINE"
    );
    println!("{}", "-".repeat(90));
    for goal in &ledger.goals {
        let deadline = match (goal.target_date, goal.days_left(today)) {
            (Some(date), Some(days)) if days >= 0 => {
                format!("{} ({} days left)", format_short_date(date, locale), days)
            }
            (Some(date), Some(_)) => format!("{} (passed)", format_short_date(date, locale)),
            _ => "-".to_string(),
        };
        println!(
            "{:>4}  {:<22} {:>16} {:>16} {:>6.1}%  {}",
            goal.id,
            truncate(&goal.name, 22),
            format_currency(goal.target_amount, locale),
            format_currency(goal.current_amount, locale),
            goal.progress_percent(),
            deadline
        );
    }

    Ok(())
}

pub fn cmd_goals_add(
    data: &Path,
    config: &WimpiConfig,
    name: &str,
    target: f64,
    date: Option<&str>,
) -> Result<()> {
    let mut ledger = open_ledger_for_write(data)?;
    let target_date = date.map(parse_date).transpose()?;

    let name = name.trim();
    if name.is_empty() {
        bail!("Goal name must not be empty");
    }

    let id = ledger.add_goal(name, target, target_date)?;
    save_ledger(&ledger, data)?;

    println!(
        "✅ Created goal #{} {} ({})",
        id,
        name,
        format_currency(target, config.display.locale)
    );
    Ok(())
}

/// Edit a goal's details and/or set its collected amount directly
pub fn cmd_goals_update(
    data: &Path,
    config: &WimpiConfig,
    now: DateTime<Utc>,
    key: &str,
    amount: Option<f64>,
    update: GoalUpdate,
) -> Result<()> {
    if amount.is_none() && update.is_empty() {
        bail!("Nothing to update: pass --amount, --name, --target, --date or --clear-date");
    }

    let mut ledger = open_ledger_for_write(data)?;
    let locale = config.display.locale;
    let id = resolve_goal(&ledger, key)?;

    if !update.is_empty() {
        let goal = ledger.update_goal(id, update)?;
        let deadline = goal
            .target_date
            .map(|d| format_short_date(d, locale))
            .unwrap_or_else(|| "no date".to_string());
        println!(
            "✅ Goal #{} {}: target {} by {}",
            goal.id,
            goal.name,
            format_currency(goal.target_amount, locale),
            deadline
        );
    }

    if let Some(amount) = amount {
        match ledger.update_goal_amount(id, amount, now)? {
            Some(tx_id) => println!(
                "✅ Goal #{} now at {} (correction recorded as transaction #{})",
                id,
                format_currency(amount, locale),
                tx_id
            ),
            None => println!("Goal #{} already at that amount", id),
        }
    }

    save_ledger(&ledger, data)
}

pub fn cmd_goals_delete(data: &Path, key: &str) -> Result<()> {
    let mut ledger = open_ledger_for_write(data)?;
    let id = resolve_goal(&ledger, key)?;

    let goal = ledger.delete_goal(id)?;
    save_ledger(&ledger, data)?;

    println!("🗑️  Deleted goal #{} {}", goal.id, goal.name);
    Ok(())
}

/// Move money into a goal
pub fn cmd_fund(
    data: &Path,
    config: &WimpiConfig,
    now: DateTime<Utc>,
    key: &str,
    amount: f64,
) -> Result<()> {
    let mut ledger = open_ledger_for_write(data)?;
    let locale = config.display.locale;
    let id = resolve_goal(&ledger, key)?;

    let goal = ledger.add_funds(id, amount, now)?;
    let line = format!(
        "✅ Added {} to {}: {} of {} ({:.1}%)",
        format_currency(amount, locale),
        goal.name,
        format_currency(goal.current_amount, locale),
        format_currency(goal.target_amount, locale),
        goal.progress_percent()
    );
    save_ledger(&ledger, data)?;

    println!("{}", line);
    Ok(())
}

pub fn cmd_transactions_list(data: &Path, config: &WimpiConfig, limit: usize) -> Result<()> {
    let ledger = open_ledger(data)?;
    let locale = config.display.locale;

    let recent = ledger.recent_transactions(limit);
    if recent.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<10}  {:<7} {:>16}  {:<18} {}",
        "ID", "DATE", "TYPE", "AMOUNT", "CATEGORY", "NOTES"
    );
    println!("{}", "-".repeat(90));
    for tx in recent {
        println!(
            "{:>5}  {:<10}  {:<7} {:>16}  {:<18} {}",
            tx.id,
            tx.transaction_at.format("%Y-%m-%d"),
            tx.tx_type.as_str(),
            format_currency(tx.amount, locale),
            truncate(&tx.category, 18),
            truncate(tx.notes.as_deref().unwrap_or(""), 30)
        );
    }

    Ok(())
}

pub fn cmd_transactions_add(
    data: &Path,
    now: DateTime<Utc>,
    tx_type: &str,
    amount: f64,
    category: &str,
    notes: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let tx_type: TransactionType = tx_type.parse().map_err(|e: String| anyhow!(e))?;
    if amount.is_nan() || amount <= 0.0 {
        bail!("Amount must be greater than zero");
    }
    let category = category.trim();
    if category.is_empty() {
        bail!("Category must not be empty");
    }
    let transaction_at = match date {
        Some(d) => parse_noon(d)?,
        None => now,
    };

    let mut ledger = open_ledger_for_write(data)?;
    let mut tx = Transaction::new(transaction_at, tx_type, amount, category);
    if let Some(n) = notes.filter(|n| !n.trim().is_empty()) {
        tx = tx.with_notes(n.trim());
    }
    let id = ledger.add_transaction(tx);
    save_ledger(&ledger, data)?;

    println!("✅ Recorded {} #{} in {}", tx_type.as_str(), id, category);
    Ok(())
}

pub fn cmd_transactions_update(
    data: &Path,
    id: i64,
    tx_type: Option<&str>,
    amount: Option<f64>,
    category: Option<&str>,
    notes: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let update = TransactionUpdate {
        tx_type: tx_type
            .map(|t| t.parse::<TransactionType>().map_err(|e| anyhow!(e)))
            .transpose()?,
        amount,
        category: category.map(String::from),
        notes: notes.map(String::from),
        transaction_at: date.map(parse_noon).transpose()?,
    };
    if update.is_empty() {
        bail!("Nothing to update: pass --type, --amount, --category, --notes or --date");
    }

    let mut ledger = open_ledger_for_write(data)?;
    let tx = ledger.update_transaction(id, update)?;
    println!(
        "✅ Updated transaction #{} ({} in {})",
        tx.id,
        tx.tx_type.as_str(),
        tx.category
    );
    save_ledger(&ledger, data)
}

pub fn cmd_transactions_delete(data: &Path, id: i64) -> Result<()> {
    let mut ledger = open_ledger_for_write(data)?;
    let tx = ledger.delete_transaction(id)?;
    save_ledger(&ledger, data)?;

    match tx.funded_goal() {
        Some(goal) => println!(
            "🗑️  Deleted transaction #{} and took it back out of goal {}",
            tx.id, goal
        ),
        None => println!("🗑️  Deleted transaction #{}", tx.id),
    }
    Ok(())
}

/// A YYYY-MM-DD argument as noon UTC on that day
fn parse_noon(date: &str) -> Result<DateTime<Utc>> {
    parse_date(date)?
        .and_hms_opt(12, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| anyhow!("Invalid date: {}", date))
}
