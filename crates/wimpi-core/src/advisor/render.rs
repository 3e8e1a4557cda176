//! Turns advisor decisions into display messages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::currency::{format_currency, format_long_date, Locale};
use crate::models::Frequency;

use super::types::{Decision, GoalStatus, Recommendation};

/// Inline emphasis style embedded in messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    /// `<strong>` and `<br><br>`
    #[default]
    Html,
    /// `**bold**` and blank lines
    Markdown,
    /// No emphasis
    Plain,
}

impl Markup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::Plain => "plain",
        }
    }

    pub fn bold(&self, text: &str) -> String {
        match self {
            Self::Html => format!("<strong>{}</strong>", text),
            Self::Markdown => format!("**{}**", text),
            Self::Plain => text.to_string(),
        }
    }

    pub fn paragraph_break(&self) -> &'static str {
        match self {
            Self::Html => "<br><br>",
            Self::Markdown | Self::Plain => "\n\n",
        }
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Markup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            "plain" | "text" => Ok(Self::Plain),
            _ => Err(format!(
                "Unknown markup: {} (valid: html, markdown, plain)",
                s
            )),
        }
    }
}

/// Renders decisions in a locale and markup style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageRenderer {
    pub locale: Locale,
    pub markup: Markup,
}

impl MessageRenderer {
    pub fn new(locale: Locale, markup: Markup) -> Self {
        Self { locale, markup }
    }

    /// Attach status info and a message to a decision
    pub fn recommendation(&self, decision: Decision) -> Recommendation {
        let message = self.message(&decision);
        Recommendation {
            status: decision.status,
            status_info: decision.status.info(),
            suggestion: decision.suggestion,
            message,
            analysis: decision.analysis,
        }
    }

    /// Human-readable message for a decision
    pub fn message(&self, decision: &Decision) -> String {
        let br = self.markup.paragraph_break();
        match decision.status {
            GoalStatus::Completed => {
                "Congratulations, this goal has been reached! Time to celebrate or set a bigger one."
                    .to_string()
            }
            GoalStatus::NoDate => {
                "Please set a target date first so a savings plan can be calculated.".to_string()
            }
            GoalStatus::Overdue => {
                "The target date has already passed. Set a new date that is more realistic."
                    .to_string()
            }
            GoalStatus::Disproportionate => format!(
                "A target of {} is far above your net worth and annual income. \
                 This is a long-term goal that needs an investment strategy. \
                 Try splitting it into smaller, more realistic targets.",
                self.money(decision.target_amount)
            ),
            GoalStatus::NegativeCashflow => {
                "Based on your history, your average disposable income is negative. \
                 Committing to a new goal will be hard. Focus on fixing your cash flow first."
                    .to_string()
            }
            GoalStatus::Realistic => {
                let (required, unit) = decision
                    .analysis
                    .as_ref()
                    .map(|a| (a.required_savings, a.time_unit))
                    .unwrap_or((decision.suggestion, Frequency::default()));
                let mut message = format!(
                    "By saving {} {}, you will reach the target on schedule.",
                    self.money(required),
                    self.markup.bold(unit.as_str())
                );
                if decision.below_usual_disposable {
                    message.push_str(br);
                    message.push_str(&format!(
                        "{} Careful, your disposable income this month is lower than usual. \
                         Stay disciplined!",
                        self.markup.bold("Note:")
                    ));
                }
                message
            }
            GoalStatus::NeedsAdjustment => {
                let (required, capacity, unit) = decision
                    .analysis
                    .as_ref()
                    .map(|a| {
                        (
                            a.required_savings,
                            a.disposable_income_for_period,
                            a.time_unit,
                        )
                    })
                    .unwrap_or((0.0, 0.0, Frequency::default()));
                let mut message = format!(
                    "Your required savings ({}/{}) exceed your financial capacity ({}/{}).",
                    self.money(required),
                    unit.as_str(),
                    self.money(capacity),
                    unit.as_str()
                );
                message.push_str(br);
                message.push_str(&format!(
                    "{}, which is {}, to keep making progress.",
                    self.markup.bold("You can add funds now up to your capacity"),
                    self.money(decision.suggestion)
                ));
                if let Some(date) = decision.revised_target_date {
                    message.push_str(br);
                    message.push_str(&format!(
                        "To actually reach the target, we still recommend {} to around {}.",
                        self.markup.bold("adjusting the target date"),
                        self.markup.bold(&format_long_date(date, self.locale))
                    ));
                }
                message
            }
        }
    }

    /// Bold currency, always shown as an absolute value
    fn money(&self, amount: f64) -> String {
        self.markup.bold(&format_currency(amount.abs(), self.locale))
    }
}
