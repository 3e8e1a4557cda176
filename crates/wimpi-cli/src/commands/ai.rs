//! Financial context and AI assistant commands

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use wimpi_core::context::ContextAssembler;
use wimpi_core::prompts::default_prompts_dir;
use wimpi_core::{
    ChatClient, FinancialAssistant, FinancialContext, PromptLibrary, QuickAction, WimpiConfig,
};

use crate::cli::CoachTopic;

use super::core::open_ledger;

/// Build the assistant from `AI_BACKEND` / `GEMINI_*` environment variables
pub fn assistant_from_env(config: &WimpiConfig) -> Result<FinancialAssistant> {
    let client = ChatClient::from_env().context(
        "AI backend not available. Set GEMINI_API_KEY, or AI_BACKEND=mock for offline testing",
    )?;
    let prompts = match default_prompts_dir() {
        Some(dir) => PromptLibrary::with_override_dir(dir),
        None => PromptLibrary::embedded_only(),
    };
    Ok(FinancialAssistant::new(client, prompts).with_locale(config.display.locale))
}

fn build_context(
    data: &Path,
    config: &WimpiConfig,
    now: DateTime<Utc>,
    recent: usize,
) -> Result<FinancialContext> {
    let ledger = open_ledger(data)?;
    Ok(ContextAssembler::new(&config.categories)
        .with_recent_limit(recent)
        .build(&ledger, now))
}

/// Print the context block that accompanies every AI request
pub fn cmd_context(
    data: &Path,
    config: &WimpiConfig,
    now: DateTime<Utc>,
    recent: usize,
    json_output: bool,
) -> Result<()> {
    let context = build_context(data, config, now, recent)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        print!("{}", context.render(config.display.locale));
    }
    Ok(())
}

/// Ask a free-form question, or send a quick action's canned question
pub async fn cmd_ask(
    assistant: &FinancialAssistant,
    data: &Path,
    config: &WimpiConfig,
    now: DateTime<Utc>,
    question: &str,
    action: Option<&str>,
) -> Result<()> {
    let context = build_context(data, config, now, wimpi_core::context::DEFAULT_RECENT_LIMIT)?;

    let reply = match action {
        Some(a) => {
            let action: QuickAction = a.parse().map_err(|e: String| anyhow!(e))?;
            println!("🤖 {} ({})", action.label(), assistant.backend_name());
            assistant.quick_action(action, &context).await?
        }
        None => {
            if question.trim().is_empty() {
                bail!(
                    "Provide a question or --action \
                     (priority, analyze, expense, tips, savings, predict)"
                );
            }
            println!("🤖 Asking {}...", assistant.backend_name());
            assistant.ask(question, &context).await?
        }
    };

    println!();
    println!("{}", reply.trim_end());
    Ok(())
}

/// Guided analyses backed by the task prompts
pub async fn cmd_coach(
    assistant: &FinancialAssistant,
    data: &Path,
    config: &WimpiConfig,
    now: DateTime<Utc>,
    topic: &CoachTopic,
) -> Result<()> {
    let ledger = open_ledger(data)?;
    let context = ContextAssembler::new(&config.categories).build(&ledger, now);

    println!("🤖 Consulting {}...", assistant.backend_name());
    let reply = match topic {
        CoachTopic::Expenses => assistant.analyze_expenses(&context).await?,
        CoachTopic::Insight => assistant.financial_insight(&context).await?,
        CoachTopic::Priorities => assistant.priority_advice(&context).await?,
        CoachTopic::Savings { goal } => {
            let goal = ledger
                .find_goal(goal)
                .ok_or_else(|| anyhow!("Goal not found: {}", goal))?;
            assistant.savings_advice(goal, &context).await?
        }
    };

    println!();
    println!("{}", reply.trim_end());
    Ok(())
}
