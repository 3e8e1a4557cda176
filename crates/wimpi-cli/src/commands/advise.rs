//! Goal advisor command

use std::fmt::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use wimpi_core::config::DisplayConfig;
use wimpi_core::{
    format_currency, Frequency, Goal, GoalAdvisor, Locale, Markup, Recommendation, Severity,
    WimpiConfig,
};

use super::core::open_ledger;

/// Evaluate one goal (by id or name) or every goal in the ledger
pub fn cmd_advise(
    data: &Path,
    config: &WimpiConfig,
    now: DateTime<Utc>,
    goal: Option<&str>,
    frequency: Option<&str>,
    markup: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let ledger = open_ledger(data)?;

    let frequency: Frequency = match frequency {
        Some(f) => f.parse().map_err(|e: String| anyhow!(e))?,
        None => config.advisor.default_frequency,
    };
    let markup = advice_markup(markup, config, json_output)?;
    let locale = config.display.locale;

    let goals: Vec<_> = match goal {
        Some(key) => match ledger.find_goal(key) {
            Some(g) => vec![g],
            None => bail!("Goal not found: {}", key),
        },
        None => ledger.goals.iter().collect(),
    };

    let advisor =
        GoalAdvisor::new(config.advisor.clone()).with_display(DisplayConfig { locale, markup });

    let results: Vec<_> = goals
        .iter()
        .map(|g| {
            let snapshot = ledger.snapshot_for(g, now);
            (*g, advisor.evaluate_at(&snapshot, frequency, now))
        })
        .collect();

    if json_output {
        let out: Vec<_> = results
            .iter()
            .map(|(g, rec)| {
                json!({
                    "goal_id": g.id,
                    "goal": g.name,
                    "frequency": frequency,
                    "recommendation": rec,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No goals yet. Create one with: wimpi goals add <name> --target <amount>");
        return Ok(());
    }

    print!("{}", format_advice(&results, frequency, locale));

    Ok(())
}

/// Markup for advice messages
///
/// An explicit `--markup` always wins. Otherwise JSON output keeps the
/// configured markup and terminal output is plain text.
pub fn advice_markup(
    requested: Option<&str>,
    config: &WimpiConfig,
    json_output: bool,
) -> Result<Markup> {
    match requested {
        Some(m) => m.parse().map_err(|e: String| anyhow!(e)),
        None if json_output => Ok(config.display.markup),
        None => Ok(Markup::Plain),
    }
}

/// Terminal report for evaluated goals
pub fn format_advice(
    results: &[(&Goal, Recommendation)],
    frequency: Frequency,
    locale: Locale,
) -> String {
    let mut out = String::new();
    for (g, rec) in results {
        let icon = match rec.status_info.severity {
            Severity::Realistic => "✅",
            Severity::Adjustment => "⚠️ ",
            Severity::Negative => "❌",
        };
        let _ = writeln!(out, "🎯 {} (#{})", g.name, g.id);
        let _ = writeln!(
            out,
            "   Target: {}  Collected: {} ({:.1}%)",
            format_currency(g.target_amount, locale),
            format_currency(g.current_amount, locale),
            g.progress_percent()
        );
        let _ = writeln!(
            out,
            "   {} {} [{}]",
            icon,
            rec.status_info.label,
            rec.status.as_str()
        );
        if rec.status.is_actionable() {
            let _ = writeln!(
                out,
                "   Save {} per {}",
                format_currency(rec.suggestion, locale),
                period_noun(frequency)
            );
        }
        out.push('\n');
        for line in rec.message.lines() {
            let _ = writeln!(out, "   {}", line);
        }
        out.push('\n');
    }
    out
}

fn period_noun(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Daily => "day",
        Frequency::Weekly => "week",
        Frequency::Monthly => "month",
    }
}
