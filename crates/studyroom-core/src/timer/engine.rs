//! Session state machine.
//!
//! The engine owns the single active-session slot. It performs no I/O and
//! keeps no ticking state; callers load it from storage, apply a command,
//! and write it back.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> (stop) -> Idle
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::active::ActiveSession;
use super::pomodoro::PomodoroConfig;
use crate::error::SessionError;
use crate::events::Event;
use crate::models::SessionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// What a stop hands over for finalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedSession {
    pub active: ActiveSession,
    pub ended_at: DateTime<Utc>,
    pub duration: u64,
    pub paused_duration: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionEngine {
    active: Option<ActiveSession>,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_active(active: Option<ActiveSession>) -> Self {
        Self { active }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        match &self.active {
            None => TimerState::Idle,
            Some(s) if s.is_paused() => TimerState::Paused,
            Some(_) => TimerState::Running,
        }
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn into_active(self) -> Option<ActiveSession> {
        self.active
    }

    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Option<u64> {
        self.active.as_ref().map(|s| s.elapsed_at(now))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn begin(
        &mut self,
        goal_id: &str,
        task_id: Option<String>,
        mode: SessionMode,
        pomodoro: Option<PomodoroConfig>,
        now: DateTime<Utc>,
    ) -> Result<Event, SessionError> {
        if let Some(existing) = &self.active {
            return Err(SessionError::AlreadyActive {
                goal_id: existing.goal_id.clone(),
            });
        }
        let session = ActiveSession::new(goal_id, task_id, mode, pomodoro, now);
        let event = Event::SessionStarted {
            goal_id: session.goal_id.clone(),
            task_id: session.task_id.clone(),
            mode: session.mode,
            at: now,
        };
        self.active = Some(session);
        Ok(event)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Event, SessionError> {
        let session = self.active.as_mut().ok_or(SessionError::NoActiveSession)?;
        session.pause(now)?;
        Ok(Event::SessionPaused {
            goal_id: session.goal_id.clone(),
            elapsed_secs: session.elapsed_at(now),
            at: now,
        })
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<Event, SessionError> {
        let session = self.active.as_mut().ok_or(SessionError::NoActiveSession)?;
        let paused_secs = session.resume(now)?;
        Ok(Event::SessionResumed {
            goal_id: session.goal_id.clone(),
            paused_secs,
            elapsed_secs: session.elapsed_at(now),
            at: now,
        })
    }

    /// Count one finished pomodoro on the active session.
    pub fn record_pomodoro(&mut self) -> Result<u32, SessionError> {
        let session = self.active.as_mut().ok_or(SessionError::NoActiveSession)?;
        session.pomodoros_completed += 1;
        Ok(session.pomodoros_completed)
    }

    /// Freeze the active session at `now` without clearing the slot. The
    /// slot is cleared with [`SessionEngine::clear`] once the result has
    /// been persisted.
    pub fn finish(&self, now: DateTime<Utc>) -> Result<FinishedSession, SessionError> {
        let session = self.active.as_ref().ok_or(SessionError::NoActiveSession)?;
        Ok(FinishedSession {
            active: session.clone(),
            ended_at: now.max(session.start_time),
            duration: session.elapsed_at(now),
            paused_duration: session.paused_secs_at(now),
        })
    }

    pub fn clear(&mut self) -> Option<ActiveSession> {
        self.active.take()
    }
}
