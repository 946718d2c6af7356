//! Countdown budgets and the rule for resuming a persisted countdown.

use crate::model::{CandidateSession, Difficulty};

/// Budget used when the question source sends a label outside the known bands.
pub const FALLBACK_DURATION_SECS: u32 = 30;

/// Default countdown budget for a difficulty band.
#[must_use]
pub fn default_duration_secs(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 20,
        Difficulty::Medium => 60,
        Difficulty::Hard => 120,
    }
}

/// Countdown budget for a raw difficulty label.
#[must_use]
pub fn duration_for_label(label: &str) -> u32 {
    Difficulty::from_label(label).map_or(FALLBACK_DURATION_SECS, default_duration_secs)
}

/// How the countdown for the current question should be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPlan {
    /// No usable countdown is stored: initialize the session timer with the
    /// full budget and count it down.
    Fresh { duration_secs: u32 },
    /// A partially elapsed countdown for this question is stored: keep the
    /// session timer and continue from what is left.
    Continue { time_left_secs: u32 },
}

impl TimerPlan {
    /// Seconds the countdown controller should start with.
    #[must_use]
    pub fn budget_secs(self) -> u32 {
        match self {
            TimerPlan::Fresh { duration_secs } => duration_secs,
            TimerPlan::Continue { time_left_secs } => time_left_secs,
        }
    }
}

/// Decide whether the stored countdown belongs to the question being shown.
///
/// A stored duration different from `question_budget_secs`, or nothing left
/// on the clock, means the timer has to be initialized again.
#[must_use]
pub fn plan_timer(session: &CandidateSession, question_budget_secs: u32) -> TimerPlan {
    let duration = session.current_question_duration_secs();
    let left = session.time_left_secs();
    if duration != question_budget_secs || left == 0 {
        TimerPlan::Fresh {
            duration_secs: question_budget_secs,
        }
    } else {
        TimerPlan::Continue {
            time_left_secs: left,
        }
    }
}

/// Formats remaining seconds as `m:ss`.
#[must_use]
pub fn format_countdown(total_secs: u32) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// True when the countdown has entered its warning window
/// (the last 15% of the budget, but never less than five seconds).
#[must_use]
pub fn is_running_low(time_left_secs: u32, budget_secs: u32) -> bool {
    let window = (f64::from(budget_secs) * 0.15).round();
    let window = window.max(5.0);
    f64::from(time_left_secs) <= window
}
