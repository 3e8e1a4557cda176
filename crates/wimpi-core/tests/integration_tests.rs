//! Integration tests for wimpi-core
//!
//! These tests exercise the full import → fund → advise workflow and the
//! ledger → context → assistant path.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use wimpi_core::{
    advisor::MessageRenderer, budgets::process_budgets, config::DisplayConfig, ChatClient,
    ContextAssembler, FinancialAssistant, Frequency, GoalAdvisor, GoalStatus, Ledger, Locale,
    Markup, MockBackend, PromptLibrary, QuickAction, WimpiConfig,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

/// Six months of salary and rent, plus a few October expenses
fn history_csv() -> &'static str {
    "transaction_at,type,amount,category,notes
2026-05-01,Pemasukan,8000000,Salary,
2026-05-03,Pengeluaran,3000000,Rent,
2026-06-01,Pemasukan,8000000,Salary,
2026-06-03,Pengeluaran,3000000,Rent,
2026-07-01,Pemasukan,8000000,Salary,
2026-07-03,Pengeluaran,3000000,Rent,
2026-08-01,Pemasukan,8000000,Salary,
2026-08-03,Pengeluaran,3000000,Rent,
2026-09-01,Pemasukan,8000000,Salary,
2026-09-03,Pengeluaran,3000000,Rent,
2026-10-01,Pemasukan,8000000,Salary,October salary
2026-10-03,Pengeluaran,3000000,Rent,
"
}

fn imported_ledger() -> Ledger {
    let mut ledger = Ledger::new();
    let count = ledger.import_csv(history_csv().as_bytes()).unwrap();
    assert_eq!(count, 12);
    ledger
}

// =============================================================================
// Advisor Workflow
// =============================================================================

#[test]
fn test_import_fund_advise_workflow() {
    let mut ledger = imported_ledger();

    // 84 days = 12 weeks
    let goal_id = ledger
        .add_goal("Laptop", 12_000_000.0, NaiveDate::from_ymd_opt(2027, 1, 11))
        .unwrap();
    ledger.add_funds(goal_id, 1_200_000.0, now()).unwrap();

    let goal = ledger.goal(goal_id).unwrap().clone();
    assert_eq!(goal.current_amount, 1_200_000.0);

    let snapshot = ledger.snapshot_for(&goal, now());
    assert_eq!(snapshot.net_worth, 28_800_000.0);
    assert_eq!(snapshot.monthly_income, 8_000_000.0);
    assert_eq!(snapshot.monthly_expense, 4_200_000.0);

    let advisor = GoalAdvisor::new(WimpiConfig::default().advisor).with_display(DisplayConfig {
        locale: Locale::Id,
        markup: Markup::Plain,
    });

    // Window: 48,000,000 in, 19,200,000 out over 6 months = 4,800,000/month.
    // 10,800,000 needed over 12 weeks = 900,000/week against ~1,108,545 capacity.
    let rec = advisor.evaluate_at(&snapshot, Frequency::Weekly, now());
    assert_eq!(rec.status, GoalStatus::Realistic);
    assert_eq!(rec.suggestion, 900_000.0);
    assert!(rec
        .message
        .starts_with("By saving Rp 900.000 weekly, you will reach the target on schedule."));

    // October disposable 3,800,000 is below 80% of 4,800,000
    assert!(rec.message.contains("Note: Careful"));
}

#[test]
fn test_deleting_goal_restores_cash_flow() {
    let mut ledger = imported_ledger();
    let goal_id = ledger
        .add_goal("Phone", 4_000_000.0, NaiveDate::from_ymd_opt(2027, 1, 11))
        .unwrap();
    ledger.add_funds(goal_id, 500_000.0, now()).unwrap();
    assert_eq!(ledger.net_worth(), 29_500_000.0);

    ledger.delete_goal(goal_id).unwrap();
    assert_eq!(ledger.net_worth(), 30_000_000.0);
    assert_eq!(ledger.transactions.len(), 12);
}

#[test]
fn test_decision_and_rendering_are_separable() {
    let mut ledger = imported_ledger();
    let goal_id = ledger
        .add_goal("House", 900_000_000.0, NaiveDate::from_ymd_opt(2027, 10, 19))
        .unwrap();
    let goal = ledger.goal(goal_id).unwrap().clone();
    let snapshot = ledger.snapshot_for(&goal, now());

    let decision = GoalAdvisor::default().decide_at(&snapshot, Frequency::Monthly, now());
    assert_eq!(decision.status, GoalStatus::Disproportionate);
    assert!(decision.analysis.is_some());

    let html = MessageRenderer::new(Locale::Id, Markup::Html).message(&decision);
    assert!(html.contains("<strong>Rp 900.000.000</strong>"));
    let en = MessageRenderer::new(Locale::En, Markup::Markdown).message(&decision);
    assert!(en.contains("**Rp 900,000,000**"));
}

// =============================================================================
// Ledger Persistence
// =============================================================================

#[test]
fn test_ledger_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("wimpi.json");

    let mut ledger = imported_ledger();
    let goal_id = ledger.add_goal("Trip", 5_000_000.0, None).unwrap();
    ledger.add_funds(goal_id, 250_000.0, now()).unwrap();
    ledger.save(&path).unwrap();

    let reloaded = Ledger::load(&path).unwrap();
    assert_eq!(reloaded, ledger);

    // Saving again replaces the file in place
    ledger.save(&path).unwrap();
    assert_eq!(Ledger::load(&path).unwrap(), ledger);
}

#[test]
fn test_ledger_loads_bare_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");
    std::fs::write(&path, history_csv()).unwrap();

    let ledger = Ledger::load(&path).unwrap();
    assert_eq!(ledger.transactions.len(), 12);
    assert!(ledger.goals.is_empty());
    assert_eq!(ledger.net_worth(), 30_000_000.0);
}

// =============================================================================
// Budgets
// =============================================================================

#[test]
fn test_budgets_against_imported_spending() {
    let mut ledger = imported_ledger();
    wimpi_core::set_budget(&mut ledger.budgets, "Rent", 2_500_000.0, "2026-10").unwrap();

    let report = process_budgets(&ledger.budgets, &ledger.transactions, "2026-10").unwrap();
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].spent, 3_000_000.0);
    assert_eq!(report.items[0].remaining, -500_000.0);
    assert_eq!(report.items[0].percentage, 120.0);
}

// =============================================================================
// Assistant
// =============================================================================

#[tokio::test]
async fn test_assistant_sees_assembled_context() {
    let mut ledger = imported_ledger();
    ledger
        .add_goal("Laptop", 12_000_000.0, NaiveDate::from_ymd_opt(2027, 1, 11))
        .unwrap();

    let config = WimpiConfig::default();
    let context = ContextAssembler::new(&config.categories).build(&ledger, now());
    assert_eq!(context.transaction_count, 12);
    assert_eq!(context.month.income, 8_000_000.0);

    let backend = MockBackend::with_reply("Prioritaskan dana darurat.");
    let assistant =
        FinancialAssistant::new(ChatClient::Mock(backend.clone()), PromptLibrary::embedded_only());

    let reply = assistant
        .quick_action(QuickAction::Predict, &context)
        .await
        .unwrap();
    assert_eq!(reply, "Prioritaskan dana darurat.");

    let prompt = &backend.prompts()[0];
    assert!(prompt.contains("--- USER FINANCIAL DATA (Oktober 2026) ---"));
    assert!(prompt.contains("Laptop"));
    assert!(prompt.contains("Rp 8.000.000"));
    assert!(prompt.contains("roughly what will my balance be"));
}
