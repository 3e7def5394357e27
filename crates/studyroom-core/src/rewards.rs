//! Point formulas.
//!
//! Everything here is a pure function of its inputs, so the UI can call
//! these speculatively to preview what a session would earn.

use serde::{Deserialize, Serialize};

use crate::models::{Difficulty, Goal};
use crate::progress::WeeklyProgress;

pub const POINTS_PER_HOUR: f64 = 5.0;
pub const TASK_COMPLETION_BONUS: i64 = 5;
pub const GOAL_MET_BONUS: i64 = 50;
pub const PERFECT_WEEK_BONUS: i64 = 100;
pub const DAILY_STREAK_BASE: i64 = 2;
pub const DAILY_STREAK_MAX_MULTIPLIER: u32 = 10;

/// `(streak days, bonus)`, ascending.
pub const STREAK_MILESTONES: [(u32, i64); 6] = [
    (7, 50),
    (14, 100),
    (30, 200),
    (60, 300),
    (90, 500),
    (365, 1000),
];

pub fn difficulty_bonus(difficulty: Difficulty) -> i64 {
    match difficulty {
        Difficulty::Easy => 5,
        Difficulty::Medium => 10,
        Difficulty::Hard => 15,
    }
}

fn time_points(duration_secs: u64) -> f64 {
    duration_secs as f64 / 3600.0 * POINTS_PER_HOUR
}

fn task_bonus(task_completed: bool, difficulty: Option<Difficulty>) -> i64 {
    if !task_completed {
        return 0;
    }
    TASK_COMPLETION_BONUS + difficulty.map(difficulty_bonus).unwrap_or(0)
}

/// Points for time studied plus the task-completion bonus, rounded half away
/// from zero.
pub fn session_points(
    duration_secs: u64,
    task_completed: bool,
    difficulty: Option<Difficulty>,
) -> i64 {
    let raw = time_points(duration_secs) + task_bonus(task_completed, difficulty) as f64;
    raw.round() as i64
}

/// Exact-match milestone bonus; zero for any day count that is not a milestone.
pub fn streak_milestone_bonus(streak_days: u32) -> i64 {
    STREAK_MILESTONES
        .iter()
        .find(|(days, _)| *days == streak_days)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

/// Base bonus scaled by one step per full week of streak, capped at 10x.
pub fn daily_streak_bonus(streak_days: u32) -> i64 {
    if streak_days == 0 {
        return 0;
    }
    let multiplier = (streak_days / 7 + 1).min(DAILY_STREAK_MAX_MULTIPLIER);
    DAILY_STREAK_BASE * i64::from(multiplier)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextMilestone {
    pub days: u32,
    pub bonus: i64,
    pub days_remaining: u32,
}

/// Smallest milestone strictly above `current_streak`.
pub fn next_streak_milestone(current_streak: u32) -> Option<NextMilestone> {
    STREAK_MILESTONES
        .iter()
        .find(|(days, _)| *days > current_streak)
        .map(|&(days, bonus)| NextMilestone {
            days,
            bonus,
            days_remaining: days - current_streak,
        })
}

/// Inputs to [`total_session_points`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionReward {
    pub duration_secs: u64,
    pub task_completed: bool,
    pub difficulty: Option<Difficulty>,
    pub streak_before_session: u32,
    pub first_session_today: bool,
}

/// Itemised points for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointBreakdown {
    pub time_points: i64,
    pub task_bonus: i64,
    pub daily_streak_bonus: i64,
    pub milestone_bonus: i64,
    pub total: i64,
}

/// Session points plus, for the day's first session, the streak bonuses
/// evaluated against the streak after today is credited.
pub fn total_session_points(input: SessionReward) -> PointBreakdown {
    let time_points = time_points(input.duration_secs).round() as i64;
    let task_bonus = task_bonus(input.task_completed, input.difficulty);

    let (daily, milestone) = if input.first_session_today {
        let streak_after = input.streak_before_session.saturating_add(1);
        (
            daily_streak_bonus(streak_after),
            streak_milestone_bonus(streak_after),
        )
    } else {
        (0, 0)
    };

    PointBreakdown {
        time_points,
        task_bonus,
        daily_streak_bonus: daily,
        milestone_bonus: milestone,
        total: time_points + task_bonus + daily + milestone,
    }
}

/// Weekly goal-completion payout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeeklyBonus {
    /// `(goal id, bonus)` for each goal that met its targets.
    pub goals_met: Vec<(String, i64)>,
    pub goals_evaluated: usize,
    pub perfect_week_bonus: i64,
    pub total: i64,
}

/// Whether `goal` met its weekly targets given its hours and task count.
pub fn goal_met(goal: &Goal, hours_completed: f64, tasks_completed: u32) -> bool {
    let hours_ok = goal.hour_target().map_or(true, |target| hours_completed >= target);
    let tasks_ok = goal.task_target().map_or(true, |target| tasks_completed >= target);
    hours_ok && tasks_ok
}

/// Per-goal bonus for every active goal that met its targets, plus the
/// perfect-week bonus when every evaluated goal did. Goals without a
/// progress entry are not evaluated.
pub fn weekly_bonus(progress: &WeeklyProgress, goals: &[Goal]) -> WeeklyBonus {
    let mut bonus = WeeklyBonus::default();

    for goal in goals.iter().filter(|g| !g.archived) {
        let Some(entry) = progress.goals.get(&goal.id) else {
            continue;
        };
        bonus.goals_evaluated += 1;
        if goal_met(goal, entry.hours_completed, entry.tasks_completed) {
            bonus.goals_met.push((goal.id.clone(), GOAL_MET_BONUS));
            bonus.total += GOAL_MET_BONUS;
        }
    }

    if bonus.goals_evaluated > 0 && bonus.goals_met.len() == bonus.goals_evaluated {
        bonus.perfect_week_bonus = PERFECT_WEEK_BONUS;
        bonus.total += PERFECT_WEEK_BONUS;
    }
    bonus
}
