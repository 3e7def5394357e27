//! Weekly per-goal progress.
//!
//! [`WeeklyProgress`] is a cache over sessions, tasks and goals. It is only
//! valid for the week it was computed for and is always rebuilt from scratch,
//! never patched.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::local_date;
use crate::models::{Goal, Session, Task};
use crate::rewards::goal_met;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GoalProgress {
    pub hours_completed: f64,
    pub tasks_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub goals: BTreeMap<String, GoalProgress>,
    pub total_hours: f64,
    pub total_tasks: u32,
}

impl WeeklyProgress {
    pub fn empty(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            week_end: week_start + Duration::days(6),
            goals: BTreeMap::new(),
            total_hours: 0.0,
            total_tasks: 0,
        }
    }

    /// Whether this snapshot may be served for the week starting `week_start`.
    pub fn is_current_for(&self, week_start: NaiveDate) -> bool {
        self.week_start == week_start
    }

    pub fn goal(&self, goal_id: &str) -> GoalProgress {
        self.goals.get(goal_id).copied().unwrap_or_default()
    }

    /// Goal ids whose figures differ from `previous`, including goals that
    /// appeared or disappeared.
    pub fn changed_goals(&self, previous: Option<&WeeklyProgress>) -> Vec<String> {
        let Some(previous) = previous.filter(|p| p.week_start == self.week_start) else {
            return self.goals.keys().cloned().collect();
        };
        let mut changed: Vec<String> = self
            .goals
            .iter()
            .filter(|(id, entry)| previous.goals.get(*id) != Some(*entry))
            .map(|(id, _)| id.clone())
            .collect();
        changed.extend(
            previous
                .goals
                .keys()
                .filter(|id| !self.goals.contains_key(*id))
                .cloned(),
        );
        changed
    }
}

/// Round half-up to two decimals.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Fold sessions and completed tasks falling within the inclusive week
/// starting at `week_start` into per-goal totals.
///
/// Every goal in `goals` gets an entry, archived or not; callers filter.
/// Sessions and tasks pointing at goals outside `goals` are skipped.
pub fn recompute_weekly_progress(
    sessions: &[Session],
    tasks: &[Task],
    goals: &[Goal],
    week_start: NaiveDate,
) -> WeeklyProgress {
    let mut progress = WeeklyProgress::empty(week_start);
    let in_week = |date: NaiveDate| date >= progress.week_start && date <= progress.week_end;

    let mut raw_hours: BTreeMap<&str, f64> = BTreeMap::new();
    let mut task_counts: BTreeMap<&str, u32> = BTreeMap::new();
    for goal in goals {
        raw_hours.insert(goal.id.as_str(), 0.0);
        task_counts.insert(goal.id.as_str(), 0);
    }

    let mut dangling = 0usize;
    let mut total_hours = 0.0;
    for session in sessions {
        if !in_week(local_date(session.start_time)) {
            continue;
        }
        match raw_hours.get_mut(session.goal_id.as_str()) {
            Some(hours) => {
                *hours += session.hours();
                total_hours += session.hours();
            }
            None => dangling += 1,
        }
    }

    let mut total_tasks = 0;
    for task in tasks.iter().filter(|t| t.completed) {
        let Some(done_at) = task.completed_at else {
            continue;
        };
        if !in_week(local_date(done_at)) {
            continue;
        }
        if let Some(count) = task_counts.get_mut(task.goal_id.as_str()) {
            *count += 1;
            total_tasks += 1;
        }
    }

    if dangling > 0 {
        tracing::warn!(
            dangling,
            week_start = %week_start,
            "skipped sessions referencing unknown goals"
        );
    }

    for (id, hours) in raw_hours {
        progress.goals.insert(
            id.to_string(),
            GoalProgress {
                hours_completed: round_hours(hours),
                tasks_completed: task_counts.get(id).copied().unwrap_or(0),
            },
        );
    }
    progress.total_hours = round_hours(total_hours);
    progress.total_tasks = total_tasks;

    tracing::debug!(
        week_start = %week_start,
        goals = progress.goals.len(),
        total_hours = progress.total_hours,
        total_tasks = progress.total_tasks,
        "weekly progress recomputed"
    );
    progress
}

/// Per-goal completion ratios for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalCompletion {
    /// 0..=100, `None` when the goal has no hour target.
    pub hours_pct: Option<f64>,
    /// 0..=100, `None` when the goal has no task target.
    pub tasks_pct: Option<f64>,
    pub met: bool,
}

pub fn goal_completion(goal: &Goal, progress: &WeeklyProgress) -> GoalCompletion {
    let entry = progress.goal(&goal.id);
    let pct = |done: f64, target: f64| (done / target * 100.0).min(100.0);
    GoalCompletion {
        hours_pct: goal.hour_target().map(|t| pct(entry.hours_completed, t)),
        tasks_pct: goal
            .task_target()
            .map(|t| pct(f64::from(entry.tasks_completed), f64::from(t))),
        met: goal_met(goal, entry.hours_completed, entry.tasks_completed),
    }
}
