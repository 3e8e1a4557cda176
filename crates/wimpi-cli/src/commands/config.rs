//! Configuration display commands

use std::path::Path;

use anyhow::Result;
use wimpi_core::config::{default_config_path, resolve_config_path, AveragingPolicy};

use super::core::load_config;

/// Print the effective configuration and where it came from
pub fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    let advisor = &config.advisor;

    let source = resolve_config_path(path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());
    println!("Configuration ({})", source);
    println!();

    println!("[advisor]");
    println!("  lookback_months           = {}", advisor.lookback_months);
    match advisor.averaging {
        AveragingPolicy::Fixed(months) => {
            println!("  averaging                 = fixed ({} months)", months)
        }
        AveragingPolicy::ElapsedMonths => println!("  averaging                 = elapsed"),
    }
    println!("  net_worth_multiplier      = {}", advisor.net_worth_multiplier);
    println!("  annual_income_months      = {}", advisor.annual_income_months);
    println!("  spending_warning_ratio    = {}", advisor.spending_warning_ratio);
    println!(
        "  revised_date_padding_days = {}",
        advisor.revised_date_padding_days
    );
    println!("  default_frequency         = {}", advisor.default_frequency);
    println!();
    println!("[display]");
    println!("  locale                    = {}", config.display.locale.as_str());
    println!("  markup                    = {}", config.display.markup);
    println!();
    println!("[categories]");
    println!("  {} categories mapped to buckets", config.categories.len());

    Ok(())
}

/// Show the config override location
pub fn cmd_config_path(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("{}", p.display());
            if !p.exists() {
                eprintln!();
                eprintln!("Note: This file does not exist; commands using it will fail.");
            }
        }
        None => match default_config_path() {
            Some(p) => {
                println!("{}", p.display());
                if !p.exists() {
                    eprintln!();
                    eprintln!("Note: No override yet. Create it to change advisor settings.");
                }
            }
            None => {
                eprintln!("Could not determine config directory.");
                eprintln!("The data directory is not available on this system.");
            }
        },
    }

    Ok(())
}
