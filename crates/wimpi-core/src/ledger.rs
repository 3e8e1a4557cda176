//! Ledger of transactions, goals and budgets
//!
//! The ledger is a plain JSON document on disk. Aggregates are pure functions
//! of its contents plus a reference instant, so the same ledger always yields
//! the same report for the same `now`.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::import::parse_csv;
use crate::models::{
    Budget, FinancialSnapshot, Goal, Transaction, TransactionType, GOAL_CORRECTION_CATEGORY,
    GOAL_SAVINGS_CATEGORY, GOAL_SAVINGS_NOTE_PREFIX,
};

/// Prefix for goal contributions in category breakdowns
pub const GOAL_BREAKDOWN_PREFIX: &str = "Savings: ";

/// Note prefix for manual goal balance corrections
pub const GOAL_CORRECTION_NOTE_PREFIX: &str = "Corrected funds on goal: ";

/// Income and expense totals for a period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub income: f64,
    pub expense: f64,
}

impl CashFlow {
    pub fn remaining(&self) -> f64 {
        self.income - self.expense
    }

    fn add(&mut self, tx: &Transaction) {
        match tx.tx_type {
            TransactionType::Income => self.income += tx.amount,
            TransactionType::Expense => self.expense += tx.amount,
        }
    }
}

/// Running balance after one transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetWorthPoint {
    pub transaction_at: DateTime<Utc>,
    pub balance: f64,
}

/// Time span shown by the cash-flow trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrendRange {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "1m")]
    Month,
    #[default]
    #[serde(rename = "6m")]
    HalfYear,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "5y")]
    FiveYears,
}

/// Bucket size of a trend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendUnit {
    Day,
    Month,
    Year,
}

impl TrendRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "1m",
            Self::HalfYear => "6m",
            Self::Year => "1y",
            Self::FiveYears => "5y",
        }
    }

    pub fn unit(&self) -> TrendUnit {
        match self {
            Self::Week | Self::Month => TrendUnit::Day,
            Self::HalfYear | Self::Year => TrendUnit::Month,
            Self::FiveYears => TrendUnit::Year,
        }
    }

    /// First instant included in the range ending at `now`
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let months = match self {
            Self::Week => return now - Duration::days(6),
            Self::Month => 1,
            Self::HalfYear => 6,
            Self::Year => 12,
            Self::FiveYears => 60,
        };
        now.checked_sub_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn all() -> &'static [TrendRange] {
        &[
            Self::Week,
            Self::Month,
            Self::HalfYear,
            Self::Year,
            Self::FiveYears,
        ]
    }
}

impl fmt::Display for TrendRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrendRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "7d" => Ok(Self::Week),
            "1m" => Ok(Self::Month),
            "6m" => Ok(Self::HalfYear),
            "1y" => Ok(Self::Year),
            "5y" => Ok(Self::FiveYears),
            _ => Err(format!(
                "Unknown trend range: {} (valid: 7d, 1m, 6m, 1y, 5y)",
                s
            )),
        }
    }
}

impl TrendUnit {
    /// First day of the bucket containing `date`
    fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Month => date.with_day(1).unwrap_or(date),
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    fn next(&self, bucket: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Day => bucket.succ_opt(),
            Self::Month => bucket.checked_add_months(Months::new(1)),
            Self::Year => bucket.checked_add_months(Months::new(12)),
        }
    }

    fn label(&self, bucket: NaiveDate) -> String {
        match self {
            Self::Day => bucket.format("%Y-%m-%d").to_string(),
            Self::Month => bucket.format("%Y-%m").to_string(),
            Self::Year => bucket.format("%Y").to_string(),
        }
    }
}

/// One bucket of the cash-flow trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub start: NaiveDate,
    pub label: String,
    pub income: f64,
    pub expense: f64,
}

/// Midnight UTC on the first day of `now`'s month
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Field changes for an existing transaction; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub tx_type: Option<TransactionType>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    /// An empty string clears the notes
    pub notes: Option<String>,
    pub transaction_at: Option<DateTime<Utc>>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Field changes for an existing goal; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub target_amount: Option<f64>,
    /// `Some(None)` removes the target date
    pub target_date: Option<Option<NaiveDate>>,
}

impl GoalUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// All of a user's financial records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a ledger from JSON, or from a bare transaction CSV when the
    /// extension is `.csv`
    pub fn load(path: &Path) -> Result<Self> {
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        let file = File::open(path)?;
        let ledger = if is_csv {
            let mut ledger = Self::new();
            ledger.import_csv(BufReader::new(file))?;
            ledger
        } else {
            serde_json::from_reader(BufReader::new(file))?
        };

        info!(
            path = %path.display(),
            transactions = ledger.transactions.len(),
            goals = ledger.goals.len(),
            budgets = ledger.budgets.len(),
            "Loaded ledger"
        );
        Ok(ledger)
    }

    /// Load a ledger, starting empty when the file does not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "Ledger file not found, starting empty");
            Ok(Self::new())
        }
    }

    /// Write the ledger as pretty JSON, replacing the file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        info!(
            path = %path.display(),
            transactions = self.transactions.len(),
            goals = self.goals.len(),
            "Saved ledger"
        );
        Ok(())
    }

    /// Append transactions parsed from CSV, returning how many were added
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let parsed = parse_csv(reader)?;
        let count = parsed.len();
        for tx in parsed {
            self.add_transaction(tx);
        }
        debug!(count, "Imported CSV transactions");
        Ok(count)
    }

    /// Append a transaction, assigning a fresh id. Returns the id.
    pub fn add_transaction(&mut self, mut tx: Transaction) -> i64 {
        tx.id = next_id(self.transactions.iter().map(|t| t.id));
        let id = tx.id;
        self.transactions.push(tx);
        id
    }

    /// Create a goal with no funds yet. Returns the id.
    pub fn add_goal(
        &mut self,
        name: impl Into<String>,
        target_amount: f64,
        target_date: Option<NaiveDate>,
    ) -> Result<i64> {
        if target_amount.is_nan() || target_amount <= 0.0 {
            return Err(Error::InvalidAmount(format!(
                "Target amount must be greater than zero (got {})",
                target_amount
            )));
        }
        let name = name.into();
        if self.goals.iter().any(|g| g.name.eq_ignore_ascii_case(&name)) {
            return Err(Error::InvalidData(format!("Goal already exists: {}", name)));
        }
        let id = next_id(self.goals.iter().map(|g| g.id));
        self.goals.push(Goal {
            id,
            name,
            target_amount,
            current_amount: 0.0,
            target_date,
        });
        Ok(id)
    }

    /// Find a goal by numeric id or case-insensitive name
    pub fn find_goal(&self, key: &str) -> Option<&Goal> {
        let key = key.trim();
        if let Ok(id) = key.parse::<i64>() {
            if let Some(goal) = self.goals.iter().find(|g| g.id == id) {
                return Some(goal);
            }
        }
        self.goals.iter().find(|g| g.name.eq_ignore_ascii_case(key))
    }

    pub fn goal(&self, id: i64) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    fn goal_mut(&mut self, id: i64) -> Result<&mut Goal> {
        self.goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::NotFound(format!("Goal {}", id)))
    }

    /// Total income minus total expense across all transactions
    pub fn net_worth(&self) -> f64 {
        self.transactions.iter().map(Transaction::signed_amount).sum()
    }

    /// Cash flow since the start of `now`'s calendar month
    pub fn month_cash_flow(&self, now: DateTime<Utc>) -> CashFlow {
        let start = month_start(now);
        let mut flow = CashFlow::default();
        for tx in self.transactions.iter().filter(|tx| tx.transaction_at >= start) {
            flow.add(tx);
        }
        flow
    }

    /// This month's expenses per category; goal contributions are keyed
    /// `Savings: <goal name>`
    pub fn expense_by_category(&self, now: DateTime<Utc>) -> BTreeMap<String, f64> {
        self.month_by_category(now, TransactionType::Expense)
    }

    /// This month's income per category
    pub fn income_by_category(&self, now: DateTime<Utc>) -> BTreeMap<String, f64> {
        self.month_by_category(now, TransactionType::Income)
    }

    fn month_by_category(
        &self,
        now: DateTime<Utc>,
        tx_type: TransactionType,
    ) -> BTreeMap<String, f64> {
        let start = month_start(now);
        let mut totals = BTreeMap::new();
        for tx in self
            .transactions
            .iter()
            .filter(|tx| tx.tx_type == tx_type && tx.transaction_at >= start)
        {
            let key = match tx.funded_goal() {
                Some(goal) => format!("{}{}", GOAL_BREAKDOWN_PREFIX, goal),
                None => tx.category.clone(),
            };
            *totals.entry(key).or_insert(0.0) += tx.amount;
        }
        totals
    }

    /// Running balance after each transaction in time order
    ///
    /// Empty when there are fewer than two transactions.
    pub fn net_worth_trend(&self) -> Vec<NetWorthPoint> {
        if self.transactions.len() < 2 {
            return Vec::new();
        }
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        sorted.sort_by_key(|tx| tx.transaction_at);

        let mut balance = 0.0;
        sorted
            .into_iter()
            .map(|tx| {
                balance += tx.signed_amount();
                NetWorthPoint {
                    transaction_at: tx.transaction_at,
                    balance,
                }
            })
            .collect()
    }

    /// Income and expense per bucket over `range`, every bucket present
    pub fn cash_flow_trend(&self, range: TrendRange, now: DateTime<Utc>) -> Vec<TrendPoint> {
        let unit = range.unit();
        let start = range.start(now);
        let last = unit.bucket_start(now.date_naive());

        let mut points = Vec::new();
        let mut index = HashMap::new();
        let mut bucket = Some(unit.bucket_start(start.date_naive()));
        while let Some(b) = bucket.filter(|b| *b <= last) {
            index.insert(b, points.len());
            points.push(TrendPoint {
                start: b,
                label: unit.label(b),
                income: 0.0,
                expense: 0.0,
            });
            bucket = unit.next(b);
        }

        for tx in self
            .transactions
            .iter()
            .filter(|tx| tx.transaction_at >= start && tx.transaction_at <= now)
        {
            let key = unit.bucket_start(tx.transaction_at.date_naive());
            if let Some(&i) = index.get(&key) {
                match tx.tx_type {
                    TransactionType::Income => points[i].income += tx.amount,
                    TransactionType::Expense => points[i].expense += tx.amount,
                }
            }
        }

        points
    }

    /// Most recent transactions first
    pub fn recent_transactions(&self, limit: usize) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        sorted.sort_by(|a, b| b.transaction_at.cmp(&a.transaction_at));
        sorted.truncate(limit);
        sorted
    }

    /// Advisor input for one goal as of `now`
    pub fn snapshot_for(&self, goal: &Goal, now: DateTime<Utc>) -> FinancialSnapshot {
        let month = self.month_cash_flow(now);
        FinancialSnapshot {
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            target_date: goal.target_date,
            all_transactions: self.transactions.clone(),
            net_worth: self.net_worth(),
            monthly_income: month.income,
            monthly_expense: month.expense,
        }
    }

    /// Move money into a goal, recording it as a goal-savings expense
    pub fn add_funds(&mut self, goal_id: i64, amount: f64, now: DateTime<Utc>) -> Result<&Goal> {
        if amount.is_nan() || amount <= 0.0 {
            return Err(Error::InvalidAmount(format!(
                "Amount must be greater than zero (got {})",
                amount
            )));
        }

        let goal = self.goal_mut(goal_id)?;
        goal.current_amount += amount;
        let name = goal.name.clone();

        let tx = Transaction::new(now, TransactionType::Expense, amount, GOAL_SAVINGS_CATEGORY)
            .with_notes(format!("{}{}", GOAL_SAVINGS_NOTE_PREFIX, name));
        let tx_id = self.add_transaction(tx);
        info!(goal_id, amount, tx_id, "Added funds to goal");

        self.goal_mut(goal_id).map(|g| &*g)
    }

    /// Set a goal's collected amount directly, recording the difference as a
    /// correction transaction
    ///
    /// Returns the correction transaction id, or `None` when nothing changed.
    pub fn update_goal_amount(
        &mut self,
        goal_id: i64,
        new_amount: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        if new_amount.is_nan() || new_amount < 0.0 {
            return Err(Error::InvalidAmount(format!(
                "Collected amount must not be negative (got {})",
                new_amount
            )));
        }

        let goal = self.goal_mut(goal_id)?;
        let difference = new_amount - goal.current_amount;
        goal.current_amount = new_amount;
        let name = goal.name.clone();

        if difference == 0.0 {
            return Ok(None);
        }

        let tx_type = if difference > 0.0 {
            TransactionType::Expense
        } else {
            TransactionType::Income
        };
        let tx = Transaction::new(now, tx_type, difference.abs(), GOAL_CORRECTION_CATEGORY)
            .with_notes(format!("{}{}", GOAL_CORRECTION_NOTE_PREFIX, name));
        let tx_id = self.add_transaction(tx);
        debug!(goal_id, difference, tx_id, "Recorded goal correction");
        Ok(Some(tx_id))
    }

    /// Edit a transaction in place
    ///
    /// A goal contribution keeps its link: changing its amount moves the
    /// difference into or out of the goal, and edits that would detach it
    /// from the goal (or attach a plain transaction to one) are rejected.
    pub fn update_transaction(
        &mut self,
        id: i64,
        update: TransactionUpdate,
    ) -> Result<&Transaction> {
        let pos = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;
        let current = &self.transactions[pos];

        let mut updated = current.clone();
        if let Some(tx_type) = update.tx_type {
            updated.tx_type = tx_type;
        }
        if let Some(amount) = update.amount {
            if amount.is_nan() || amount <= 0.0 {
                return Err(Error::InvalidAmount(format!(
                    "Amount must be greater than zero (got {})",
                    amount
                )));
            }
            updated.amount = amount;
        }
        if let Some(category) = update.category {
            let category = category.trim();
            if category.is_empty() {
                return Err(Error::InvalidData("Category must not be empty".into()));
            }
            updated.category = category.to_string();
        }
        if let Some(notes) = update.notes {
            let notes = notes.trim();
            updated.notes = (!notes.is_empty()).then(|| notes.to_string());
        }
        if let Some(at) = update.transaction_at {
            updated.transaction_at = at;
        }

        match current.funded_goal() {
            Some(goal_name) => {
                if updated.funded_goal() != Some(goal_name)
                    || updated.tx_type != TransactionType::Expense
                {
                    return Err(Error::InvalidData(format!(
                        "Transaction {} funds goal {}; only its amount and date can change",
                        id, goal_name
                    )));
                }
                let difference = updated.amount - current.amount;
                if let Some(goal) = self.goals.iter_mut().find(|g| g.name == goal_name) {
                    goal.current_amount = (goal.current_amount + difference).max(0.0);
                    debug!(goal_id = goal.id, difference, "Adjusted goal for edited contribution");
                }
            }
            None => {
                if let Some(goal_name) = updated.funded_goal() {
                    return Err(Error::InvalidData(format!(
                        "Use add_funds to move money into goal {}",
                        goal_name
                    )));
                }
            }
        }

        self.transactions[pos] = updated;
        debug!(id, "Updated transaction");
        Ok(&self.transactions[pos])
    }

    /// Edit a goal's name, target amount or target date
    ///
    /// Renaming rewrites the notes of the goal's contributions so they stay
    /// linked to it.
    pub fn update_goal(&mut self, id: i64, update: GoalUpdate) -> Result<&Goal> {
        let name = match update.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(Error::InvalidData("Goal name must not be empty".into()));
                }
                if self
                    .goals
                    .iter()
                    .any(|g| g.id != id && g.name.eq_ignore_ascii_case(&name))
                {
                    return Err(Error::InvalidData(format!("Goal already exists: {}", name)));
                }
                Some(name)
            }
            None => None,
        };
        if let Some(target) = update.target_amount {
            if target.is_nan() || target <= 0.0 {
                return Err(Error::InvalidAmount(format!(
                    "Target amount must be greater than zero (got {})",
                    target
                )));
            }
        }

        let goal = self.goal_mut(id)?;
        if let Some(target) = update.target_amount {
            goal.target_amount = target;
        }
        if let Some(date) = update.target_date {
            goal.target_date = date;
        }
        let renamed = match name {
            Some(name) if name != goal.name => {
                Some((std::mem::replace(&mut goal.name, name.clone()), name))
            }
            _ => None,
        };

        if let Some((old_name, new_name)) = renamed {
            let mut relinked = 0;
            for tx in self
                .transactions
                .iter_mut()
                .filter(|tx| tx.funded_goal() == Some(old_name.as_str()))
            {
                tx.relink_goal(&new_name);
                relinked += 1;
            }
            debug!(goal_id = id, relinked, "Renamed goal");
        }

        self.goal_mut(id).map(|g| &*g)
    }

    /// Remove a transaction; a goal contribution is taken back out of its goal
    pub fn delete_transaction(&mut self, id: i64) -> Result<Transaction> {
        let pos = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;
        let tx = self.transactions.remove(pos);

        if let Some(goal_name) = tx.funded_goal() {
            if let Some(goal) = self.goals.iter_mut().find(|g| g.name == goal_name) {
                goal.current_amount = (goal.current_amount - tx.amount).max(0.0);
                debug!(goal_id = goal.id, amount = tx.amount, "Reversed goal contribution");
            }
        }

        Ok(tx)
    }

    /// Remove a goal together with its contribution transactions
    pub fn delete_goal(&mut self, id: i64) -> Result<Goal> {
        let pos = self
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| Error::NotFound(format!("Goal {}", id)))?;
        let goal = self.goals.remove(pos);

        let before = self.transactions.len();
        self.transactions
            .retain(|tx| tx.funded_goal() != Some(goal.name.as_str()));
        debug!(
            goal_id = id,
            removed = before - self.transactions.len(),
            "Deleted goal and its contributions"
        );

        Ok(goal)
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}
