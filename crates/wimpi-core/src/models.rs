//! Data models for Wimpi

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Average days per calendar month used for period normalization
pub const DAYS_PER_MONTH: f64 = 30.44;

/// Average weeks per calendar month used for period normalization
pub const WEEKS_PER_MONTH: f64 = 4.33;

/// Category recorded for money moved into a savings goal
pub const GOAL_SAVINGS_CATEGORY: &str = "Goal Savings";

/// Category recorded when a goal balance is corrected by hand
pub const GOAL_CORRECTION_CATEGORY: &str = "Goal Correction";

/// Note prefix linking a goal-savings transaction to its goal
pub const GOAL_SAVINGS_NOTE_PREFIX: &str = "Added funds to goal: ";

/// Category and note prefix pairs that mark a goal contribution. The second
/// pair is what Indonesian-language ledgers record.
const GOAL_CONTRIBUTION_LABELS: [(&str, &str); 2] = [
    (GOAL_SAVINGS_CATEGORY, GOAL_SAVINGS_NOTE_PREFIX),
    ("Tabungan Target", "Menambah dana ke target: "),
];

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[serde(alias = "Income", alias = "Pemasukan")]
    Income,
    #[serde(alias = "Expense", alias = "Pengeluaran")]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "pemasukan" => Ok(Self::Income),
            "expense" | "pengeluaran" => Ok(Self::Expense),
            _ => Err(format!(
                "Unknown transaction type: {} (valid: income, expense)",
                s
            )),
        }
    }
}

/// A recorded money movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: i64,
    pub transaction_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Always non-negative; direction comes from `tx_type`
    pub amount: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn new(
        transaction_at: DateTime<Utc>,
        tx_type: TransactionType,
        amount: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            transaction_at,
            tx_type,
            amount,
            category: category.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Amount with sign applied (income positive, expense negative)
    pub fn signed_amount(&self) -> f64 {
        match self.tx_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// Name of the goal this transaction funded, if it is a goal contribution
    pub fn funded_goal(&self) -> Option<&str> {
        let prefix = self.contribution_prefix()?;
        self.notes.as_deref()?.strip_prefix(prefix)
    }

    /// Point a goal contribution at a renamed goal, keeping its label set
    pub(crate) fn relink_goal(&mut self, goal_name: &str) {
        if let Some(prefix) = self.contribution_prefix() {
            self.notes = Some(format!("{}{}", prefix, goal_name));
        }
    }

    fn contribution_prefix(&self) -> Option<&'static str> {
        let notes = self.notes.as_deref()?;
        GOAL_CONTRIBUTION_LABELS
            .iter()
            .find(|(category, prefix)| self.category == *category && notes.starts_with(prefix))
            .map(|(_, prefix)| *prefix)
    }
}

/// A savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

impl Goal {
    /// Amount still missing (never negative)
    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }

    /// Percentage collected so far (0 when the target is not positive)
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount > 0.0 {
            self.current_amount / self.target_amount * 100.0
        } else {
            0.0
        }
    }

    /// Whole days from `today` until the target date (may be negative)
    pub fn days_left(&self, today: NaiveDate) -> Option<i64> {
        self.target_date.map(|d| (d - today).num_days())
    }
}

/// A monthly spending limit for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default)]
    pub id: i64,
    pub category: String,
    pub amount: f64,
    /// Budget month as `YYYY-MM`
    pub period: String,
}

/// Cadence at which savings progress is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Number of periods of this cadence in `days`
    pub fn periods_in(&self, days: f64) -> f64 {
        match self {
            Self::Daily => days,
            Self::Weekly => days / 7.0,
            Self::Monthly => days / DAYS_PER_MONTH,
        }
    }

    /// Convert a monthly amount into the equivalent amount per period
    pub fn from_monthly(&self, monthly: f64) -> f64 {
        match self {
            Self::Daily => monthly / DAYS_PER_MONTH,
            Self::Weekly => monthly / WEEKS_PER_MONTH,
            Self::Monthly => monthly,
        }
    }

    pub fn all() -> &'static [Frequency] {
        &[Self::Daily, Self::Weekly, Self::Monthly]
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!(
                "Unknown frequency: {} (valid: daily, weekly, monthly)",
                s
            )),
        }
    }
}

/// Point-in-time view of one goal plus the cash-flow history around it
///
/// Built fresh by the caller for every advisory request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    /// Transaction history; a missing field deserializes as empty
    #[serde(default)]
    pub all_transactions: Vec<Transaction>,
    #[serde(default)]
    pub net_worth: f64,
    /// Income for the current calendar month
    #[serde(default)]
    pub monthly_income: f64,
    /// Expense for the current calendar month
    #[serde(default)]
    pub monthly_expense: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_transaction_type_aliases() {
        let income: TransactionType = serde_json::from_str("\"Pemasukan\"").unwrap();
        let expense: TransactionType = serde_json::from_str("\"expense\"").unwrap();
        assert_eq!(income, TransactionType::Income);
        assert_eq!(expense, TransactionType::Expense);
        assert_eq!(
            "Pengeluaran".parse::<TransactionType>().unwrap(),
            TransactionType::Expense
        );
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_transaction_json_shape() {
        let json = r#"{
            "transaction_at": "2026-03-01T08:30:00+00:00",
            "type": "Pengeluaran",
            "amount": 50000,
            "category": "Food"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.tx_type, TransactionType::Expense);
        assert_eq!(tx.signed_amount(), -50000.0);
        assert_eq!(tx.id, 0);
        assert!(tx.notes.is_none());
    }

    #[test]
    fn test_funded_goal() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let tx = Transaction::new(at, TransactionType::Expense, 10.0, GOAL_SAVINGS_CATEGORY)
            .with_notes(format!("{}Laptop", GOAL_SAVINGS_NOTE_PREFIX));
        assert_eq!(tx.funded_goal(), Some("Laptop"));

        let other = Transaction::new(at, TransactionType::Expense, 10.0, "Food")
            .with_notes(format!("{}Laptop", GOAL_SAVINGS_NOTE_PREFIX));
        assert_eq!(other.funded_goal(), None);
    }

    #[test]
    fn test_funded_goal_indonesian_labels() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut tx = Transaction::new(at, TransactionType::Expense, 10.0, "Tabungan Target")
            .with_notes("Menambah dana ke target: Motor");
        assert_eq!(tx.funded_goal(), Some("Motor"));

        tx.relink_goal("Motor Baru");
        assert_eq!(tx.notes.as_deref(), Some("Menambah dana ke target: Motor Baru"));
        assert_eq!(tx.funded_goal(), Some("Motor Baru"));

        // Labels from different sets do not mix
        let mixed = Transaction::new(at, TransactionType::Expense, 10.0, "Tabungan Target")
            .with_notes(format!("{}Motor", GOAL_SAVINGS_NOTE_PREFIX));
        assert_eq!(mixed.funded_goal(), None);
    }

    #[test]
    fn test_goal_progress() {
        let goal = Goal {
            id: 1,
            name: "Laptop".into(),
            target_amount: 10_000_000.0,
            current_amount: 2_500_000.0,
            target_date: NaiveDate::from_ymd_opt(2026, 12, 31),
        };
        assert_eq!(goal.progress_percent(), 25.0);
        assert_eq!(goal.remaining(), 7_500_000.0);
        let today = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        assert_eq!(goal.days_left(today), Some(30));

        let zero = Goal {
            target_amount: 0.0,
            ..goal
        };
        assert_eq!(zero.progress_percent(), 0.0);
    }

    #[test]
    fn test_frequency_normalization() {
        assert_eq!(Frequency::default(), Frequency::Weekly);
        assert_eq!(Frequency::Daily.periods_in(30.0), 30.0);
        assert!((Frequency::Weekly.periods_in(14.0) - 2.0).abs() < 1e-9);
        assert!((Frequency::Monthly.periods_in(60.88) - 2.0).abs() < 1e-9);
        assert_eq!(Frequency::Monthly.from_monthly(1000.0), 1000.0);
        assert!((Frequency::Weekly.from_monthly(433.0) - 100.0).abs() < 1e-9);
        assert_eq!("MONTHLY".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert!("yearly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_snapshot_missing_transactions_is_empty() {
        let snapshot: FinancialSnapshot =
            serde_json::from_str(r#"{"target_amount": 100.0}"#).unwrap();
        assert!(snapshot.all_transactions.is_empty());
        assert!(snapshot.target_date.is_none());
    }
}
