//! Financial chat assistant
//!
//! Every request is a single prompt made of three parts: the system persona,
//! the rendered financial context and the task (a free-form question or one
//! of the task prompts from the prompt library).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::context::FinancialContext;
use crate::currency::{format_currency, format_long_date, Locale};
use crate::error::{Error, Result};
use crate::models::Goal;
use crate::prompts::{PromptId, PromptLibrary, QuickAction};

use super::{ChatBackend, ChatClient};

/// Separator between the financial context and the task
const USER_MESSAGE_HEADER: &str = "\n\nUser message: ";

/// Chat assistant wrapping a backend and the prompt library
#[derive(Clone)]
pub struct FinancialAssistant {
    client: ChatClient,
    prompts: Arc<RwLock<PromptLibrary>>,
    locale: Locale,
}

impl FinancialAssistant {
    pub fn new(client: ChatClient, prompts: PromptLibrary) -> Self {
        Self {
            client,
            prompts: Arc::new(RwLock::new(prompts)),
            locale: Locale::default(),
        }
    }

    /// Locale used for amounts and dates in the rendered context
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.client.name()
    }

    /// Answer a free-form question
    pub async fn ask(&self, question: &str, context: &FinancialContext) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidData("Question must not be empty".into()));
        }
        self.send("ask", question, context).await
    }

    /// Send the canned question behind a quick action
    pub async fn quick_action(
        &self,
        action: QuickAction,
        context: &FinancialContext,
    ) -> Result<String> {
        if action == QuickAction::Priority {
            return self.priority_advice(context).await;
        }
        self.send(action.as_str(), action.question(), context).await
    }

    /// Spending breakdown with ways to cut back
    pub async fn analyze_expenses(&self, context: &FinancialContext) -> Result<String> {
        let task = self.render_task(
            PromptId::AnalyzeExpenses,
            &context.to_template_vars(self.locale),
        )?;
        self.send("analyze_expenses", &task, context).await
    }

    /// Weekly savings plan and feasibility check for one goal
    pub async fn savings_advice(&self, goal: &Goal, context: &FinancialContext) -> Result<String> {
        let vars = self.savings_vars(goal, context);
        let task = self.render_task(PromptId::SavingsAdvice, &vars)?;
        self.send("savings_advice", &task, context).await
    }

    /// Short insight on the current month
    pub async fn financial_insight(&self, context: &FinancialContext) -> Result<String> {
        let task = self.render_task(
            PromptId::FinancialInsight,
            &context.to_template_vars(self.locale),
        )?;
        self.send("financial_insight", &task, context).await
    }

    /// Ordering of the user's goals
    pub async fn priority_advice(&self, context: &FinancialContext) -> Result<String> {
        let task = self.render_task(
            PromptId::PriorityAdvice,
            &context.to_template_vars(self.locale),
        )?;
        self.send("priority_advice", &task, context).await
    }

    /// Full prompt for a task, as sent to the backend
    pub fn compose(&self, task: &str, context: &FinancialContext) -> Result<String> {
        let system = self.render_task(PromptId::System, &HashMap::new())?;
        Ok(format!(
            "{}{}{}{}",
            system.trim(),
            context.render(self.locale),
            USER_MESSAGE_HEADER,
            task.trim()
        ))
    }

    fn render_task(&self, id: PromptId, vars: &HashMap<&str, String>) -> Result<String> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
        Ok(prompts.get(id)?.render(vars))
    }

    fn savings_vars(&self, goal: &Goal, context: &FinancialContext) -> HashMap<&'static str, String> {
        let locale = self.locale;
        let remaining = goal.remaining();

        let mut vars = HashMap::new();
        vars.insert("goal_name", goal.name.clone());
        vars.insert("target_amount", format_currency(goal.target_amount, locale));
        vars.insert("current_amount", format_currency(goal.current_amount, locale));
        vars.insert("remaining", format_currency(remaining, locale));

        match goal.target_date {
            Some(date) => {
                vars.insert("deadline", format_long_date(date, locale));
                let days = goal.days_left(context.as_of.date_naive()).unwrap_or(0);
                let weeks = weeks_remaining(days);
                if weeks > 0 {
                    vars.insert("weeks_remaining", weeks.to_string());
                }
                vars.insert(
                    "weekly_required",
                    format_currency(weekly_required(remaining, weeks), locale),
                );
            }
            None => {
                vars.insert("deadline", "No deadline set".to_string());
            }
        }
        vars
    }

    async fn send(&self, task_name: &str, task: &str, context: &FinancialContext) -> Result<String> {
        let prompt = self.compose(task, context)?;
        info!(
            task = task_name,
            backend = self.client.name(),
            model = self.client.model(),
            prompt_len = prompt.len(),
            "Sending chat request"
        );

        match self.client.generate(&prompt).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!(task = task_name, "Chat request failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Whole weeks left, rounded up
fn weeks_remaining(days_left: i64) -> i64 {
    if days_left <= 0 {
        0
    } else {
        (days_left + 6) / 7
    }
}

/// Even weekly share of `remaining`, rounded up; everything at once when no weeks are left
fn weekly_required(remaining: f64, weeks: i64) -> f64 {
    if weeks > 0 {
        (remaining / weeks as f64).ceil()
    } else {
        remaining
    }
}
