//! Wimpi Core Library
//!
//! Shared functionality for the Wimpi personal finance assistant:
//! - Goal advisor (savings plan evaluation and recommendations)
//! - Ledger aggregates and goal fund movements
//! - Monthly budgets
//! - CSV transaction import
//! - Locale-aware currency and date formatting
//! - Financial context assembler for LLM prompts
//! - Prompt library for customizable AI prompts
//! - Pluggable AI chat backends (Gemini, mock)

pub mod advisor;
pub mod ai;
pub mod budgets;
pub mod config;
pub mod context;
pub mod currency;
pub mod error;
pub mod import;
pub mod ledger;
pub mod models;
pub mod prompts;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::{
    evaluate_goal, round_to_sensible_amount, AnalysisFigures, Decision, GoalAdvisor, GoalStatus,
    Markup, MessageRenderer, Recommendation, Severity, StatusInfo,
};
pub use ai::{ChatBackend, ChatClient, FinancialAssistant, GeminiBackend, MockBackend};
pub use budgets::{
    copy_budgets, delete_budget, process_budgets, set_budget, BudgetItem, BudgetReport,
    BudgetSummary,
};
pub use config::{AdvisorConfig, AveragingPolicy, CategoryBucket, CategoryBuckets, WimpiConfig};
pub use context::{ContextAssembler, FinancialContext};
pub use currency::{format_currency, format_long_date, format_short_date, Locale};
pub use error::{Error, Result};
pub use ledger::{
    CashFlow, GoalUpdate, Ledger, NetWorthPoint, TransactionUpdate, TrendPoint, TrendRange,
};
pub use models::{Budget, FinancialSnapshot, Frequency, Goal, Transaction, TransactionType};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary, QuickAction};
