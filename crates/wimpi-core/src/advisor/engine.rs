//! Goal advisor - gated evaluation of a savings goal
//!
//! Gates run in a fixed order and the first match decides the status:
//! completed, no date, overdue, disproportionate, negative cash flow,
//! then realistic vs. needs adjustment by capacity ratio.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::config::{AdvisorConfig, AveragingPolicy, DisplayConfig};
use crate::models::{FinancialSnapshot, Frequency, TransactionType};

use super::render::MessageRenderer;
use super::rounding::round_to_sensible_amount;
use super::types::{AnalysisFigures, Decision, GoalStatus, Recommendation};

/// Income and expense totals over the lookback window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowTotals {
    pub income: f64,
    pub expense: f64,
    /// Months the averages are divided by
    pub months: f64,
}

impl WindowTotals {
    pub fn avg_monthly_income(&self) -> f64 {
        self.income / self.months
    }

    pub fn avg_monthly_disposable(&self) -> f64 {
        (self.income - self.expense) / self.months
    }
}

/// Stateless savings-goal advisor
#[derive(Debug, Clone, Default)]
pub struct GoalAdvisor {
    config: AdvisorConfig,
    renderer: MessageRenderer,
}

impl GoalAdvisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self {
            config,
            renderer: MessageRenderer::default(),
        }
    }

    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.renderer = MessageRenderer::new(display.locale, display.markup);
        self
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Evaluate against the real clock
    pub fn evaluate(&self, snapshot: &FinancialSnapshot, frequency: Frequency) -> Recommendation {
        self.evaluate_at(snapshot, frequency, Utc::now())
    }

    /// Evaluate at a fixed reference instant
    pub fn evaluate_at(
        &self,
        snapshot: &FinancialSnapshot,
        frequency: Frequency,
        now: DateTime<Utc>,
    ) -> Recommendation {
        self.renderer
            .recommendation(self.decide_at(snapshot, frequency, now))
    }

    /// Run the gates and return the structured decision
    pub fn decide_at(
        &self,
        snapshot: &FinancialSnapshot,
        frequency: Frequency,
        now: DateTime<Utc>,
    ) -> Decision {
        let target_amount = snapshot.target_amount;
        let amount_needed = target_amount - snapshot.current_amount;
        if amount_needed <= 0.0 {
            tracing::debug!(amount_needed, "Goal already reached");
            return Decision::terminal(GoalStatus::Completed, target_amount);
        }

        let Some(target_date) = snapshot.target_date else {
            tracing::debug!("Goal has no target date");
            return Decision::terminal(GoalStatus::NoDate, target_amount);
        };

        let today = now.date_naive();
        let days_remaining = (target_date - today).num_days() as f64;
        if days_remaining <= 0.0 {
            tracing::debug!(%target_date, %today, "Goal target date passed");
            return Decision::terminal(GoalStatus::Overdue, target_amount);
        }

        let totals = self.window_totals(snapshot, now);
        let avg_monthly_income = totals.avg_monthly_income();
        let avg_disposable = totals.avg_monthly_disposable();
        let current_month_disposable = snapshot.monthly_income - snapshot.monthly_expense;

        let capacity = avg_disposable.max(0.0);
        let time_divider = frequency.periods_in(days_remaining);
        let disposable_for_period = frequency.from_monthly(capacity);
        let required_savings = if time_divider > 0.0 {
            round_to_sensible_amount(amount_needed / time_divider)
        } else {
            0.0
        };

        let analysis = AnalysisFigures {
            avg_monthly_disposable_income: avg_disposable,
            current_month_disposable_income: current_month_disposable,
            disposable_income_for_period: disposable_for_period,
            required_savings,
            time_unit: frequency,
        };

        let mut decision = Decision {
            analysis: Some(analysis),
            ..Decision::terminal(GoalStatus::Disproportionate, target_amount)
        };

        if target_amount > snapshot.net_worth * self.config.net_worth_multiplier
            && target_amount > avg_monthly_income * self.config.annual_income_months
        {
            tracing::debug!(
                target_amount,
                net_worth = snapshot.net_worth,
                avg_monthly_income,
                "Goal is disproportionate"
            );
            return decision;
        }

        if avg_disposable <= 0.0 {
            tracing::debug!(avg_disposable, "Average disposable income not positive");
            decision.status = GoalStatus::NegativeCashflow;
            return decision;
        }

        let capacity_ratio = if disposable_for_period > 0.0 {
            Some(required_savings / disposable_for_period)
        } else {
            None
        };
        decision.capacity_ratio = capacity_ratio;

        match capacity_ratio {
            Some(ratio) if ratio <= 1.0 => {
                decision.status = GoalStatus::Realistic;
                decision.suggestion = required_savings;
                decision.below_usual_disposable = current_month_disposable
                    < avg_disposable * self.config.spending_warning_ratio;
                tracing::debug!(
                    ratio,
                    required_savings,
                    frequency = frequency.as_str(),
                    "Goal is realistic"
                );
            }
            _ => {
                decision.status = GoalStatus::NeedsAdjustment;
                decision.suggestion = round_to_sensible_amount(disposable_for_period);
                decision.revised_target_date =
                    self.revised_target_date(today, amount_needed, avg_disposable);
                tracing::debug!(
                    ratio = ?capacity_ratio,
                    required_savings,
                    suggestion = decision.suggestion,
                    "Goal needs adjustment"
                );
            }
        }

        decision
    }

    /// Sum income and expense inside the lookback window ending at `now`
    pub fn window_totals(&self, snapshot: &FinancialSnapshot, now: DateTime<Utc>) -> WindowTotals {
        let start = window_start(now, self.config.lookback_months);

        let mut income = 0.0;
        let mut expense = 0.0;
        let mut oldest: Option<DateTime<Utc>> = None;
        for tx in snapshot
            .all_transactions
            .iter()
            .filter(|tx| tx.transaction_at >= start)
        {
            match tx.tx_type {
                TransactionType::Income => income += tx.amount,
                TransactionType::Expense => expense += tx.amount,
            }
            oldest = Some(oldest.map_or(tx.transaction_at, |o| o.min(tx.transaction_at)));
        }

        let months = match self.config.averaging {
            AveragingPolicy::Fixed(n) => n.max(1) as f64,
            AveragingPolicy::ElapsedMonths => {
                let covered = oldest.map_or(1, |o| months_covered(o, now));
                covered.clamp(1, self.config.lookback_months.max(1)) as f64
            }
        };

        WindowTotals {
            income,
            expense,
            months,
        }
    }

    /// Date the goal would be reached saving the full average each month
    ///
    /// The day of month is not clamped: 31 January plus one month lands on
    /// 3 March before the padding days are added.
    fn revised_target_date(
        &self,
        today: NaiveDate,
        amount_needed: f64,
        avg_disposable: f64,
    ) -> Option<NaiveDate> {
        if avg_disposable <= 0.0 {
            return None;
        }
        let required_months = (amount_needed / avg_disposable).ceil();
        if !required_months.is_finite() || required_months > u32::MAX as f64 {
            return None;
        }
        let month = today
            .with_day(1)?
            .checked_add_months(Months::new(required_months as u32))?;
        let offset = i64::from(today.day0()).checked_add(self.config.revised_date_padding_days)?;
        month.checked_add_signed(Duration::try_days(offset)?)
    }
}

/// Evaluate a goal with default configuration against the real clock
pub fn evaluate_goal(snapshot: &FinancialSnapshot, frequency: Frequency) -> Recommendation {
    GoalAdvisor::default().evaluate(snapshot, frequency)
}

/// Start of the lookback window: `now` minus whole calendar months
fn window_start(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Calendar months from `oldest` to `now`, a partial month counting as one
fn months_covered(oldest: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    if oldest >= now {
        return 1;
    }
    let diff = (now.year() - oldest.year()) * 12 + now.month() as i32 - oldest.month() as i32;
    let mut whole = diff.max(0) as u32;
    while whole > 0
        && oldest
            .checked_add_months(Months::new(whole))
            .map_or(true, |anchored| anchored > now)
    {
        whole -= 1;
    }
    let exact = oldest.checked_add_months(Months::new(whole)) == Some(now);
    let covered = if exact { whole } else { whole + 1 };
    covered.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
    }

    fn days_from_now(days: i64) -> NaiveDate {
        now().date_naive() + Duration::days(days)
    }

    /// One income and one expense in each of the last six months
    fn flat_history(income: f64, expense: f64) -> Vec<Transaction> {
        (0..6)
            .flat_map(|k| {
                let at = now() - Duration::days(10) - Duration::days(30 * k);
                vec![
                    Transaction::new(at, TransactionType::Income, income, "Salary"),
                    Transaction::new(at, TransactionType::Expense, expense, "Living"),
                ]
            })
            .collect()
    }

    fn snapshot(
        target: f64,
        date: Option<NaiveDate>,
        income: f64,
        expense: f64,
    ) -> FinancialSnapshot {
        FinancialSnapshot {
            target_amount: target,
            current_amount: 0.0,
            target_date: date,
            all_transactions: flat_history(income, expense),
            net_worth: 5_000_000.0,
            monthly_income: income,
            monthly_expense: expense,
        }
    }

    #[test]
    fn test_completed_short_circuits() {
        let advisor = GoalAdvisor::default();
        let mut snap = snapshot(1_000.0, None, 0.0, 0.0);
        snap.current_amount = 1_500.0;
        let decision = advisor.decide_at(&snap, Frequency::Weekly, now());
        assert_eq!(decision.status, GoalStatus::Completed);
        assert_eq!(decision.suggestion, 0.0);
        assert!(decision.analysis.is_none());
    }

    #[test]
    fn test_no_date() {
        let advisor = GoalAdvisor::default();
        let snap = snapshot(1_000_000.0, None, 3_000_000.0, 2_000_000.0);
        let decision = advisor.decide_at(&snap, Frequency::Weekly, now());
        assert_eq!(decision.status, GoalStatus::NoDate);
        assert_eq!(decision.suggestion, 0.0);
    }

    #[test]
    fn test_overdue_today_and_past() {
        let advisor = GoalAdvisor::default();
        for offset in [0, -1, -400] {
            let snap = snapshot(1_000_000.0, Some(days_from_now(offset)), 3e6, 2e6);
            let decision = advisor.decide_at(&snap, Frequency::Daily, now());
            assert_eq!(decision.status, GoalStatus::Overdue, "offset {}", offset);
        }
        let tomorrow = snapshot(1_000.0, Some(days_from_now(1)), 3e6, 2e6);
        assert_ne!(
            advisor.decide_at(&tomorrow, Frequency::Daily, now()).status,
            GoalStatus::Overdue
        );
    }

    #[test]
    fn test_realistic_weekly() {
        let advisor = GoalAdvisor::default();
        // 70 days = 10 weeks -> 100,000 per week; capacity 1,000,000 / 4.33
        let snap = snapshot(1_000_000.0, Some(days_from_now(70)), 3_000_000.0, 2_000_000.0);
        let decision = advisor.decide_at(&snap, Frequency::Weekly, now());
        assert_eq!(decision.status, GoalStatus::Realistic);
        assert_eq!(decision.suggestion, 100_000.0);
        let analysis = decision.analysis.unwrap();
        assert_eq!(analysis.required_savings, 100_000.0);
        assert!((analysis.avg_monthly_disposable_income - 1_000_000.0).abs() < 1e-6);
        assert!((analysis.disposable_income_for_period - 1_000_000.0 / 4.33).abs() < 1e-6);
        assert!(decision.capacity_ratio.unwrap() <= 1.0);
        assert!(!decision.below_usual_disposable);
        assert!(decision.revised_target_date.is_none());
    }

    #[test]
    fn test_thirty_day_weekly_rounds_past_capacity() {
        // 1,000,000 over 30/7 weeks = 233,333 -> rounded to 240,000,
        // which exceeds the weekly capacity of ~230,947
        let advisor = GoalAdvisor::default();
        let snap = snapshot(1_000_000.0, Some(days_from_now(30)), 3_000_000.0, 2_000_000.0);
        let decision = advisor.decide_at(&snap, Frequency::Weekly, now());
        assert_eq!(decision.analysis.as_ref().unwrap().required_savings, 240_000.0);
        assert_eq!(decision.status, GoalStatus::NeedsAdjustment);
        assert_eq!(decision.suggestion, 240_000.0);
    }

    #[test]
    fn test_needs_adjustment_near_zero_capacity() {
        let advisor = GoalAdvisor::default();
        let snap = snapshot(1_000_000.0, Some(days_from_now(30)), 3_000_000.0, 2_950_000.0);
        let decision = advisor.decide_at(&snap, Frequency::Weekly, now());
        assert_eq!(decision.status, GoalStatus::NeedsAdjustment);
        // 50,000 / 4.33 = 11,547 -> 15,000
        assert_eq!(decision.suggestion, 15_000.0);
        // ceil(1,000,000 / 50,000) = 20 months, plus 7 days
        assert_eq!(
            decision.revised_target_date,
            NaiveDate::from_ymd_opt(2028, 6, 26)
        );
        assert!(decision.capacity_ratio.unwrap() > 1.0);
    }

    /// 300,000 income inside the window averages to 50,000 a month
    fn month_end_snapshot(today: DateTime<Utc>) -> FinancialSnapshot {
        FinancialSnapshot {
            target_amount: 50_000.0,
            current_amount: 0.0,
            target_date: Some(today.date_naive() + Duration::days(10)),
            all_transactions: vec![Transaction::new(
                today - Duration::days(20),
                TransactionType::Income,
                300_000.0,
                "Salary",
            )],
            net_worth: 1_000_000.0,
            monthly_income: 0.0,
            monthly_expense: 0.0,
        }
    }

    #[test]
    fn test_revised_date_day_overflows_into_next_month() {
        let today = Utc.with_ymd_and_hms(2026, 1, 31, 10, 0, 0).unwrap();
        let decision =
            GoalAdvisor::default().decide_at(&month_end_snapshot(today), Frequency::Daily, today);
        assert_eq!(decision.status, GoalStatus::NeedsAdjustment);
        // 1 month after 31 January is 3 March, plus 7 days
        assert_eq!(
            decision.revised_target_date,
            NaiveDate::from_ymd_opt(2026, 3, 10)
        );
    }

    #[test]
    fn test_out_of_range_padding_drops_revised_date() {
        let today = Utc.with_ymd_and_hms(2026, 1, 31, 10, 0, 0).unwrap();
        let advisor = GoalAdvisor::new(AdvisorConfig {
            revised_date_padding_days: i64::MAX,
            ..AdvisorConfig::default()
        });
        let snap = month_end_snapshot(today);
        let decision = advisor.decide_at(&snap, Frequency::Daily, today);
        assert_eq!(decision.status, GoalStatus::NeedsAdjustment);
        assert!(decision.revised_target_date.is_none());

        let rec = advisor.evaluate_at(&snap, Frequency::Daily, today);
        assert_eq!(rec.status, GoalStatus::NeedsAdjustment);
        assert!(!rec.message.is_empty());
    }

    #[test]
    fn test_disproportionate_requires_both_conditions() {
        let advisor = GoalAdvisor::default();
        let mut snap = snapshot(50_000_000.0, Some(days_from_now(365)), 200_000.0, 100_000.0);
        snap.net_worth = 100_000.0;
        let decision = advisor.decide_at(&snap, Frequency::Monthly, now());
        assert_eq!(decision.status, GoalStatus::Disproportionate);
        assert_eq!(decision.suggestion, 0.0);
        assert!(decision.analysis.is_some());

        // Large net worth alone keeps it proportionate
        snap.net_worth = 20_000_000.0;
        let decision = advisor.decide_at(&snap, Frequency::Monthly, now());
        assert_ne!(decision.status, GoalStatus::Disproportionate);
    }

    #[test]
    fn test_negative_cashflow() {
        let advisor = GoalAdvisor::default();
        let snap = snapshot(100_000.0, Some(days_from_now(90)), 1_000_000.0, 1_200_000.0);
        let decision = advisor.decide_at(&snap, Frequency::Weekly, now());
        assert_eq!(decision.status, GoalStatus::NegativeCashflow);
        assert_eq!(decision.suggestion, 0.0);
        let analysis = decision.analysis.unwrap();
        assert_eq!(analysis.disposable_income_for_period, 0.0);
        assert!(analysis.avg_monthly_disposable_income < 0.0);
    }

    #[test]
    fn test_spending_warning_on_low_current_month() {
        let advisor = GoalAdvisor::default();
        let mut snap = snapshot(1_000_000.0, Some(days_from_now(70)), 3_000_000.0, 2_000_000.0);
        snap.monthly_expense = 2_500_000.0;
        let decision = advisor.decide_at(&snap, Frequency::Weekly, now());
        assert_eq!(decision.status, GoalStatus::Realistic);
        assert!(decision.below_usual_disposable);
    }

    #[test]
    fn test_transactions_outside_window_ignored() {
        let advisor = GoalAdvisor::default();
        let mut snap = snapshot(1_000_000.0, Some(days_from_now(70)), 3_000_000.0, 2_000_000.0);
        snap.all_transactions.push(Transaction::new(
            now() - Duration::days(400),
            TransactionType::Expense,
            1_000_000_000.0,
            "Old",
        ));
        let totals = advisor.window_totals(&snap, now());
        assert_eq!(totals.income, 18_000_000.0);
        assert_eq!(totals.expense, 12_000_000.0);
        assert_eq!(totals.months, 6.0);
    }

    #[test]
    fn test_fixed_divisor_understates_short_history() {
        let mut snap = snapshot(1_000_000.0, Some(days_from_now(70)), 0.0, 0.0);
        snap.all_transactions = vec![Transaction::new(
            now() - Duration::days(15),
            TransactionType::Income,
            600_000.0,
            "Salary",
        )];

        let fixed = GoalAdvisor::default().window_totals(&snap, now());
        assert_eq!(fixed.avg_monthly_disposable(), 100_000.0);

        let elapsed = GoalAdvisor::new(AdvisorConfig {
            averaging: AveragingPolicy::ElapsedMonths,
            ..AdvisorConfig::default()
        })
        .window_totals(&snap, now());
        assert_eq!(elapsed.months, 1.0);
        assert_eq!(elapsed.avg_monthly_disposable(), 600_000.0);
    }

    #[test]
    fn test_capacity_ratio_partitions_statuses() {
        let advisor = GoalAdvisor::default();
        for freq in Frequency::all() {
            for days in [7, 30, 90, 365] {
                for expense in [1_000_000.0, 2_500_000.0, 2_990_000.0] {
                    let snap = snapshot(2_000_000.0, Some(days_from_now(days)), 3e6, expense);
                    let d = advisor.decide_at(&snap, *freq, now());
                    match d.capacity_ratio {
                        Some(r) if r <= 1.0 => assert_eq!(d.status, GoalStatus::Realistic),
                        _ => assert_eq!(d.status, GoalStatus::NeedsAdjustment),
                    }
                }
            }
        }
    }

    #[test]
    fn test_deterministic_for_fixed_instant() {
        let advisor = GoalAdvisor::default();
        let snap = snapshot(1_000_000.0, Some(days_from_now(45)), 3e6, 2.2e6);
        let a = advisor.evaluate_at(&snap, Frequency::Daily, now());
        let b = advisor.evaluate_at(&snap, Frequency::Daily, now());
        assert_eq!(a, b);
    }

    #[test]
    fn test_months_covered() {
        let n = now();
        assert_eq!(months_covered(n - Duration::days(3), n), 1);
        assert_eq!(months_covered(n - Duration::days(45), n), 2);
        assert_eq!(months_covered(n.checked_sub_months(Months::new(3)).unwrap(), n), 3);
        assert_eq!(months_covered(n, n), 1);
    }
}
