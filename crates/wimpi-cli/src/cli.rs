//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Wimpi - Savings goals, budgets and an AI money coach
#[derive(Parser)]
#[command(name = "wimpi")]
#[command(about = "Personal finance assistant for savings goals and budgets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger file (JSON), or a transaction CSV for read-only use
    #[arg(long, default_value = "wimpi.json", global = true)]
    pub data: PathBuf,

    /// Advisor config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Reference date (YYYY-MM-DD) used instead of the current date
    #[arg(long, global = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Savings recommendation for one or all goals
    Advise {
        /// Goal id or name (all goals when omitted)
        #[arg(short, long)]
        goal: Option<String>,

        /// Saving cadence: daily, weekly, monthly (defaults to config)
        #[arg(short, long)]
        frequency: Option<String>,

        /// Message emphasis: html, markdown, plain (default: plain in the
        /// terminal, the configured markup with --json)
        #[arg(long)]
        markup: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Net worth, this month's cash flow and category breakdowns
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Income and expense over time
    Trend {
        /// Range: 7d, 1m, 6m, 1y, 5y
        #[arg(short, long, default_value = "6m")]
        range: String,

        /// Show the running balance after every transaction instead
        #[arg(long)]
        net_worth: bool,
    },

    /// Monthly category budgets
    Budgets {
        /// Period to report (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        period: Option<String>,

        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Manage savings goals
    Goals {
        #[command(subcommand)]
        action: Option<GoalsAction>,
    },

    /// List, record or delete transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Add funds to a goal
    Fund {
        /// Goal id or name
        #[arg(short, long)]
        goal: String,

        /// Amount to move into the goal
        #[arg(short, long)]
        amount: f64,
    },

    /// Import transactions from CSV into the ledger
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the financial context sent to the AI assistant
    Context {
        /// Number of recent transactions to include
        #[arg(long, default_value = "50")]
        recent: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the AI assistant a question
    Ask {
        /// The question (omit when using --action)
        question: Vec<String>,

        /// Quick action: priority, analyze, expense, tips, savings, predict
        #[arg(short, long, conflicts_with = "question")]
        action: Option<String>,
    },

    /// Guided AI analyses
    Coach {
        #[command(subcommand)]
        topic: CoachTopic,
    },

    /// Manage AI prompts (list, show, override paths)
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Show the effective configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// Create or update a budget
    Set {
        /// Category name (matched exactly against transactions)
        #[arg(short, long)]
        category: String,

        /// Budget amount
        #[arg(short, long)]
        amount: f64,

        /// Period (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: i64,
    },

    /// Copy all budgets from one period to another
    Copy {
        /// Source period (YYYY-MM, defaults to the previous month)
        #[arg(long)]
        from: Option<String>,

        /// Destination period (YYYY-MM, defaults to the current month)
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List the most recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Record a transaction
    Add {
        /// income or expense (Pemasukan / Pengeluaran also accepted)
        #[arg(short = 't', long = "type")]
        tx_type: String,

        /// Amount (positive)
        #[arg(short, long)]
        amount: f64,

        /// Category name
        #[arg(short, long)]
        category: String,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Edit a transaction
    Update {
        /// Transaction ID
        id: i64,

        /// income or expense
        #[arg(short = 't', long = "type")]
        tx_type: Option<String>,

        /// New amount
        #[arg(short, long)]
        amount: Option<f64>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New notes (an empty string clears them)
        #[arg(short, long)]
        notes: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete a transaction (goal contributions are taken back out of the goal)
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List goals with progress
    List,

    /// Create a goal
    Add {
        /// Goal name
        name: String,

        /// Target amount
        #[arg(short, long)]
        target: f64,

        /// Target date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Edit a goal; a new collected amount is recorded as a correction
    Update {
        /// Goal id or name
        goal: String,

        /// New collected amount
        #[arg(short, long)]
        amount: Option<f64>,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New target amount
        #[arg(short, long)]
        target: Option<f64>,

        /// New target date (YYYY-MM-DD)
        #[arg(short, long, conflicts_with = "clear_date")]
        date: Option<String>,

        /// Remove the target date
        #[arg(long)]
        clear_date: bool,
    },

    /// Delete a goal and its contributions
    Delete {
        /// Goal id or name
        goal: String,
    },
}

#[derive(Subcommand)]
pub enum CoachTopic {
    /// Spending breakdown with ways to cut back
    Expenses,

    /// Short insight on the current month
    Insight,

    /// Which goals to pursue first
    Priorities,

    /// Weekly savings plan for one goal
    Savings {
        /// Goal id or name
        #[arg(short, long)]
        goal: String,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., system, savings_advice)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration values
    Show,

    /// Show the config override path
    Path,
}
