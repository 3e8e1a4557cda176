//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (reference date, config, ledger open/save)
//! - `advise` - Goal savings recommendations
//! - `reports` - Summary and trend reports
//! - `budgets` - Budget report, set and copy
//! - `goals` - Goal management and funding
//! - `import` - CSV import into the ledger
//! - `ai` - Financial context and AI assistant commands
//! - `prompts` - Prompt library management commands
//! - `config` - Effective configuration display

pub mod advise;
pub mod ai;
pub mod budgets;
pub mod config;
pub mod core;
pub mod goals;
pub mod import;
pub mod prompts;
pub mod reports;

// Re-export command functions for main.rs
pub use advise::*;
pub use ai::*;
pub use budgets::*;
pub use config::*;
pub use core::*;
pub use goals::*;
pub use import::*;
pub use prompts::*;
pub use reports::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
