//! Shared command utilities
//!
//! This module contains:
//! - `resolve_now` - Reference instant from `--today` or the clock
//! - `load_config` - Advisor/display configuration
//! - `open_ledger` / `save_ledger` - Ledger file access

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use wimpi_core::{Ledger, WimpiConfig};

/// Reference instant for all date math: noon UTC on `--today`, else now
pub fn resolve_now(today: Option<&str>) -> Result<DateTime<Utc>> {
    match today {
        Some(s) => {
            let date = parse_date(s).context("Invalid --today date")?;
            date.and_hms_opt(12, 0, 0)
                .map(|dt| dt.and_utc())
                .context("Invalid --today date")
        }
        None => Ok(Utc::now()),
    }
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", s))
}

pub fn load_config(path: Option<&Path>) -> Result<WimpiConfig> {
    WimpiConfig::load(path).context("Failed to load configuration")
}

/// Open the ledger, starting empty when the file does not exist yet
pub fn open_ledger(path: &Path) -> Result<Ledger> {
    Ledger::load_or_default(path)
        .with_context(|| format!("Failed to open ledger {}", path.display()))
}

/// Open a ledger that will be written back, rejecting CSV sources
pub fn open_ledger_for_write(path: &Path) -> Result<Ledger> {
    if is_csv(path) {
        bail!(
            "{} is a CSV file; use a JSON ledger (--data wimpi.json) for changes, \
             and `wimpi import` to load CSV data into it",
            path.display()
        );
    }
    open_ledger(path)
}

pub fn save_ledger(ledger: &Ledger, path: &Path) -> Result<()> {
    ledger
        .save(path)
        .with_context(|| format!("Failed to save ledger {}", path.display()))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
