//! Goal Advisor - savings recommendations for a goal
//!
//! Given a snapshot of one goal plus recent cash flow, the advisor decides
//! whether the goal is reachable on schedule and how much to put aside per
//! period. Deciding and rendering are separate steps so the decision can be
//! tested without matching on formatted currency.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wimpi_core::advisor::GoalAdvisor;
//! use wimpi_core::models::Frequency;
//!
//! let advisor = GoalAdvisor::new(config.advisor).with_display(config.display);
//! let recommendation = advisor.evaluate(&snapshot, Frequency::Weekly);
//! ```

pub mod engine;
pub mod render;
pub mod rounding;
pub mod types;

pub use engine::{evaluate_goal, GoalAdvisor, WindowTotals};
pub use render::{Markup, MessageRenderer};
pub use rounding::round_to_sensible_amount;
pub use types::{AnalysisFigures, Decision, GoalStatus, Recommendation, Severity, StatusInfo};
