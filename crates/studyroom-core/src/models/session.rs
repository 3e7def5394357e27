use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Free-running stopwatch.
    #[default]
    Timer,
    Pomodoro,
}

impl std::str::FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "timer" | "free" => Ok(SessionMode::Timer),
            "pomodoro" => Ok(SessionMode::Pomodoro),
            other => Err(format!("invalid session mode: {other}")),
        }
    }
}

/// A completed study session. Append-only once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub goal_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Active seconds, pauses excluded.
    pub duration: u64,
    #[serde(default)]
    pub mode: SessionMode,
    #[serde(default)]
    pub pomodoro_cycles: u32,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub task_completed: bool,
    /// Computed once at creation, never recomputed.
    pub points_earned: i64,
    #[serde(default)]
    pub paused_duration: u64,
    #[serde(default)]
    pub is_manual: bool,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn hours(&self) -> f64 {
        self.duration as f64 / 3600.0
    }
}
