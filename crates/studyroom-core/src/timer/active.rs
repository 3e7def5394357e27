//! The single in-progress session.
//!
//! Elapsed time is a function of stored timestamps only. Nothing here keeps
//! a running counter, so the record can be written out, the process killed,
//! and the record read back later without losing or inventing time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pomodoro::{PomodoroConfig, PomodoroPhase};
use crate::error::SessionError;
use crate::models::SessionMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub goal_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub start_time: DateTime<Utc>,
    /// `None` while running.
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    /// Seconds of completed pauses; excludes a pause still in progress.
    #[serde(default)]
    pub total_paused_duration: u64,
    #[serde(default)]
    pub mode: SessionMode,
    #[serde(default)]
    pub pomodoro: Option<PomodoroConfig>,
    #[serde(default)]
    pub pomodoros_completed: u32,
}

impl ActiveSession {
    pub fn new(
        goal_id: impl Into<String>,
        task_id: Option<String>,
        mode: SessionMode,
        pomodoro: Option<PomodoroConfig>,
        now: DateTime<Utc>,
    ) -> Self {
        let pomodoro = match mode {
            SessionMode::Pomodoro => Some(pomodoro.unwrap_or_default()),
            SessionMode::Timer => pomodoro,
        };
        Self {
            goal_id: goal_id.into(),
            task_id,
            start_time: now,
            paused_at: None,
            total_paused_duration: 0,
            mode,
            pomodoro,
            pomodoros_completed: 0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Active seconds as of `now`: wall time since start minus completed
    /// pauses, with `paused_at` standing in for `now` while paused.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        let boundary = self.paused_at.unwrap_or(now);
        let wall = whole_secs(boundary - self.start_time);
        wall.saturating_sub(self.total_paused_duration)
    }

    /// Completed pauses plus any pause in progress.
    pub fn paused_secs_at(&self, now: DateTime<Utc>) -> u64 {
        let current = self
            .paused_at
            .map(|since| whole_secs(now - since))
            .unwrap_or(0);
        self.total_paused_duration + current
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.is_paused() {
            return Err(SessionError::AlreadyPaused);
        }
        self.paused_at = Some(now);
        Ok(())
    }

    /// Fold the current pause into the total. Returns the pause length.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<u64, SessionError> {
        let since = self.paused_at.ok_or(SessionError::NotPaused)?;
        let paused = whole_secs(now - since);
        self.total_paused_duration += paused;
        self.paused_at = None;
        Ok(paused)
    }

    pub fn pomodoro_phase(&self, now: DateTime<Utc>) -> Option<PomodoroPhase> {
        self.pomodoro.map(|cfg| cfg.phase_at(self.elapsed_at(now)))
    }
}

fn whole_secs(delta: chrono::Duration) -> u64 {
    u64::try_from(delta.num_seconds()).unwrap_or(0)
}
