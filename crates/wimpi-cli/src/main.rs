//! Wimpi CLI - Personal finance assistant
//!
//! Usage:
//!   wimpi import --file transactions.csv   Append transactions to the ledger
//!   wimpi goals add Laptop --target 15000000 --date 2027-03-31
//!   wimpi advise                           Savings recommendation per goal
//!   wimpi ask "Can I afford a new phone?"  Ask the AI assistant

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wimpi_core::GoalUpdate;

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    // Logs go to stderr so `--json` output stays parseable
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    let now = commands::resolve_now(cli.today.as_deref())?;

    match cli.command {
        Commands::Advise {
            goal,
            frequency,
            markup,
            json,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_advise(
                &cli.data,
                &config,
                now,
                goal.as_deref(),
                frequency.as_deref(),
                markup.as_deref(),
                json,
            )
        }
        Commands::Summary { json } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_summary(&cli.data, &config, now, json)
        }
        Commands::Trend { range, net_worth } => {
            let config = commands::load_config(cli.config.as_deref())?;
            if net_worth {
                commands::cmd_net_worth_trend(&cli.data, &config)
            } else {
                commands::cmd_trend(&cli.data, &config, now, &range)
            }
        }
        Commands::Budgets { period, action } => {
            let config = commands::load_config(cli.config.as_deref())?;
            match action {
                None => commands::cmd_budgets_report(&cli.data, &config, now, period.as_deref()),
                Some(BudgetsAction::Set {
                    category,
                    amount,
                    period,
                }) => commands::cmd_budgets_set(&cli.data, now, &category, amount, period.as_deref()),
                Some(BudgetsAction::Delete { id }) => commands::cmd_budgets_delete(&cli.data, id),
                Some(BudgetsAction::Copy { from, to }) => {
                    commands::cmd_budgets_copy(&cli.data, now, from.as_deref(), to.as_deref())
                }
            }
        }
        Commands::Goals { action } => {
            let config = commands::load_config(cli.config.as_deref())?;
            match action {
                None | Some(GoalsAction::List) => commands::cmd_goals_list(&cli.data, &config, now),
                Some(GoalsAction::Add { name, target, date }) => {
                    commands::cmd_goals_add(&cli.data, &config, &name, target, date.as_deref())
                }
                Some(GoalsAction::Update {
                    goal,
                    amount,
                    name,
                    target,
                    date,
                    clear_date,
                }) => {
                    let target_date = if clear_date {
                        Some(None)
                    } else {
                        date.as_deref().map(commands::parse_date).transpose()?.map(Some)
                    };
                    let update = GoalUpdate {
                        name,
                        target_amount: target,
                        target_date,
                    };
                    commands::cmd_goals_update(&cli.data, &config, now, &goal, amount, update)
                }
                Some(GoalsAction::Delete { goal }) => commands::cmd_goals_delete(&cli.data, &goal),
            }
        }
        Commands::Transactions { action } => {
            let config = commands::load_config(cli.config.as_deref())?;
            match action {
                None => commands::cmd_transactions_list(&cli.data, &config, 20),
                Some(TransactionsAction::List { limit }) => {
                    commands::cmd_transactions_list(&cli.data, &config, limit)
                }
                Some(TransactionsAction::Add {
                    tx_type,
                    amount,
                    category,
                    notes,
                    date,
                }) => commands::cmd_transactions_add(
                    &cli.data,
                    now,
                    &tx_type,
                    amount,
                    &category,
                    notes.as_deref(),
                    date.as_deref(),
                ),
                Some(TransactionsAction::Update {
                    id,
                    tx_type,
                    amount,
                    category,
                    notes,
                    date,
                }) => commands::cmd_transactions_update(
                    &cli.data,
                    id,
                    tx_type.as_deref(),
                    amount,
                    category.as_deref(),
                    notes.as_deref(),
                    date.as_deref(),
                ),
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&cli.data, id)
                }
            }
        }
        Commands::Fund { goal, amount } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_fund(&cli.data, &config, now, &goal, amount)
        }
        Commands::Import { file } => commands::cmd_import(&cli.data, &file),
        Commands::Context { recent, json } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_context(&cli.data, &config, now, recent, json)
        }
        Commands::Ask { question, action } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let assistant = commands::assistant_from_env(&config)?;
            commands::cmd_ask(
                &assistant,
                &cli.data,
                &config,
                now,
                &question.join(" "),
                action.as_deref(),
            )
            .await
        }
        Commands::Coach { topic } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let assistant = commands::assistant_from_env(&config)?;
            commands::cmd_coach(&assistant, &cli.data, &config, now, &topic).await
        }
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Config { action } => match action {
            None | Some(ConfigAction::Show) => commands::cmd_config_show(cli.config.as_deref()),
            Some(ConfigAction::Path) => commands::cmd_config_path(cli.config.as_deref()),
        },
    }
}
