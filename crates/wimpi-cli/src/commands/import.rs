//! CSV import command

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use super::core::{open_ledger_for_write, save_ledger};

/// Append CSV transactions to the ledger file
pub fn cmd_import(data: &Path, file: &Path) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let mut ledger = open_ledger_for_write(data)?;
    let before = ledger.transactions.len();

    let reader = File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let count = ledger
        .import_csv(BufReader::new(reader))
        .with_context(|| format!("Failed to import {}", file.display()))?;

    save_ledger(&ledger, data)?;

    println!("✅ Imported {} transaction(s)", count);
    println!(
        "   Ledger {} now holds {} transaction(s) (was {})",
        data.display(),
        ledger.transactions.len(),
        before
    );

    Ok(())
}
