//! Core types for the goal advisor

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Frequency;

/// Outcome of a goal evaluation, in gate order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    /// Current amount already covers the target
    Completed,
    /// Goal has no target date
    NoDate,
    /// Target date is today or in the past
    Overdue,
    /// Target dwarfs both net worth and annual income
    Disproportionate,
    /// Average disposable income over the lookback window is not positive
    NegativeCashflow,
    /// Required periodic saving fits within disposable capacity
    Realistic,
    /// Required periodic saving exceeds capacity
    NeedsAdjustment,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::NoDate => "NO_DATE",
            Self::Overdue => "OVERDUE",
            Self::Disproportionate => "DISPROPORTIONATE",
            Self::NegativeCashflow => "NEGATIVE_CASHFLOW",
            Self::Realistic => "REALISTIC",
            Self::NeedsAdjustment => "NEEDS_ADJUSTMENT",
        }
    }

    /// Display metadata for this status
    pub fn info(&self) -> StatusInfo {
        let (label, icon, severity) = match self {
            Self::Completed => ("Goal Reached!", "check-circle", Severity::Realistic),
            Self::NoDate => ("Needs a Target Date", "help-circle", Severity::Adjustment),
            Self::Overdue => ("Target Date Passed", "alert-triangle", Severity::Negative),
            Self::Disproportionate => (
                "Disproportionate Target",
                "alert-octagon",
                Severity::Negative,
            ),
            Self::NegativeCashflow => ("Negative Cash Flow", "x-circle", Severity::Negative),
            Self::Realistic => ("Very Realistic", "check-circle", Severity::Realistic),
            Self::NeedsAdjustment => ("Needs Adjustment", "alert-triangle", Severity::Adjustment),
        };
        StatusInfo {
            label: label.to_string(),
            icon: icon.to_string(),
            severity,
        }
    }

    /// Whether the goal can be acted on with a non-zero periodic saving
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Realistic | Self::NeedsAdjustment)
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMPLETED" => Ok(Self::Completed),
            "NO_DATE" => Ok(Self::NoDate),
            "OVERDUE" => Ok(Self::Overdue),
            "DISPROPORTIONATE" => Ok(Self::Disproportionate),
            "NEGATIVE_CASHFLOW" => Ok(Self::NegativeCashflow),
            "REALISTIC" => Ok(Self::Realistic),
            "NEEDS_ADJUSTMENT" => Ok(Self::NeedsAdjustment),
            _ => Err(format!("Unknown goal status: {}", s)),
        }
    }
}

/// Visual tone a renderer should use for a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Realistic,
    Adjustment,
    Negative,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Realistic => "realistic",
            Self::Adjustment => "adjustment",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub label: String,
    pub icon: String,
    pub severity: Severity,
}

/// Supporting figures behind a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFigures {
    /// (income - expense) over the lookback window divided by the averaging months
    pub avg_monthly_disposable_income: f64,
    /// Caller-supplied current-month income minus expense
    pub current_month_disposable_income: f64,
    /// Average disposable income (floored at 0) normalized to one period
    pub disposable_income_for_period: f64,
    /// Rounded amount to save each period to hit the target date
    pub required_savings: f64,
    pub time_unit: Frequency,
}

/// Structured result of the decision step, before any text is produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub status: GoalStatus,
    pub suggestion: f64,
    pub target_amount: f64,
    pub analysis: Option<AnalysisFigures>,
    /// `None` when capacity is zero (treated as infinite) or no analysis ran
    pub capacity_ratio: Option<f64>,
    /// Only set for `NeedsAdjustment`
    pub revised_target_date: Option<NaiveDate>,
    /// Current month's disposable income is below the warning share of the average
    pub below_usual_disposable: bool,
}

impl Decision {
    pub(crate) fn terminal(status: GoalStatus, target_amount: f64) -> Self {
        Self {
            status,
            suggestion: 0.0,
            target_amount,
            analysis: None,
            capacity_ratio: None,
            revised_target_date: None,
            below_usual_disposable: false,
        }
    }
}

/// Advisor output intended for direct display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub status: GoalStatus,
    pub status_info: StatusInfo,
    pub suggestion: f64,
    /// May contain inline emphasis markup, see `Markup`
    pub message: String,
    pub analysis: Option<AnalysisFigures>,
}
