use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SessionMode;
use crate::rewards::PointBreakdown;

/// Every state change in the core produces an Event.
/// Events are advisory: the UI and notifiers observe them, nothing in the
/// core reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        goal_id: String,
        task_id: Option<String>,
        mode: SessionMode,
        at: DateTime<Utc>,
    },
    SessionPaused {
        goal_id: String,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        goal_id: String,
        paused_secs: u64,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionStopped {
        session_id: String,
        goal_id: String,
        duration_secs: u64,
        points: PointBreakdown,
        at: DateTime<Utc>,
    },
    /// Active session discarded without recording.
    SessionCancelled {
        goal_id: String,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    StreakUpdated {
        previous: u32,
        current: u32,
        longest: u32,
        at: DateTime<Utc>,
    },
    GoalWeeklyProgressChanged {
        goal_id: String,
        week_start: NaiveDate,
        hours_completed: f64,
        tasks_completed: u32,
        at: DateTime<Utc>,
    },
    PointsAwarded {
        amount: i64,
        reason: String,
        total_points: i64,
        at: DateTime<Utc>,
    },
    PointsSpent {
        amount: i64,
        total_points: i64,
        at: DateTime<Utc>,
    },
    WeekSettled {
        week_start: NaiveDate,
        bonus: i64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "session_started",
            Event::SessionPaused { .. } => "session_paused",
            Event::SessionResumed { .. } => "session_resumed",
            Event::SessionStopped { .. } => "session_stopped",
            Event::SessionCancelled { .. } => "session_cancelled",
            Event::StreakUpdated { .. } => "streak_updated",
            Event::GoalWeeklyProgressChanged { .. } => "goal_weekly_progress_changed",
            Event::PointsAwarded { .. } => "points_awarded",
            Event::PointsSpent { .. } => "points_spent",
            Event::WeekSettled { .. } => "week_settled",
        }
    }
}
