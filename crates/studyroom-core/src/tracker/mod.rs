//! Orchestration over the storage slots.
//!
//! [`StudyTracker`] is the context object every operation goes through. It
//! owns a [`Repository`] and a [`Clock`] and nothing else: all state lives in
//! the store, so a tracker can be dropped and rebuilt at any time (which is
//! exactly what the CLI does on every invocation).
//!
//! Reads used only for display degrade to empty state when a slot can't be
//! read. Read-modify-write paths read strictly, so an unreadable slot is
//! reported instead of being overwritten with an empty collection.

mod catalog;
mod lifecycle;
mod weekly;

pub use lifecycle::{ActiveSessionView, ManualSession, Status, StopOptions, StopOutcome};
pub use weekly::{GoalSummary, SettleOutcome};

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;

use crate::calendar::{self, WeekStart};
use crate::clock::Clock;
use crate::error::{Result, StorageError};
use crate::models::{Gamification, Goal, Session, Task};
use crate::storage::{Config, Repository, Slot, Store};
use crate::timer::{ActiveSession, PomodoroConfig, SessionEngine};

pub struct StudyTracker<S: Store, C: Clock> {
    repo: Repository<S>,
    clock: C,
    week_start_day: WeekStart,
    pomodoro_defaults: PomodoroConfig,
}

impl<S: Store, C: Clock> StudyTracker<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            repo: Repository::new(store),
            clock,
            week_start_day: WeekStart::default(),
            pomodoro_defaults: PomodoroConfig::default(),
        }
    }

    /// Tracker with week start and pomodoro defaults taken from `config`.
    pub fn with_config(store: S, clock: C, config: &Config) -> Self {
        Self::new(store, clock)
            .with_week_start(config.week_start())
            .with_pomodoro_defaults(config.pomodoro())
    }

    pub fn with_week_start(mut self, day: WeekStart) -> Self {
        self.week_start_day = day;
        self
    }

    pub fn with_pomodoro_defaults(mut self, pomodoro: PomodoroConfig) -> Self {
        self.pomodoro_defaults = pomodoro;
        self
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn week_start_day(&self) -> WeekStart {
        self.week_start_day
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn today(&self) -> NaiveDate {
        calendar::local_date(self.now())
    }

    pub fn current_week_start(&self) -> NaiveDate {
        calendar::week_start(self.today(), self.week_start_day)
    }

    // ── Lenient reads ────────────────────────────────────────────────

    pub fn goals(&self) -> Vec<Goal> {
        self.repo.load_or_default(Slot::Goals)
    }

    /// Non-archived goals; the set aggregation and bonuses work over.
    pub fn active_goals(&self) -> Vec<Goal> {
        self.goals().into_iter().filter(|g| !g.archived).collect()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.repo.load_or_default(Slot::Tasks)
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.repo.load_or_default(Slot::Sessions)
    }

    pub fn gamification(&self) -> Gamification {
        self.repo.load_or_default(Slot::Gamification)
    }

    pub fn active_session(&self) -> Option<ActiveSession> {
        self.repo.load_or_default(Slot::ActiveSession)
    }

    // ── Strict reads for updates ─────────────────────────────────────

    pub(crate) fn load_for_update<T>(&self, slot: Slot) -> std::result::Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.repo.load_optional(slot)?.unwrap_or_default())
    }

    pub(crate) fn load_engine(&self) -> Result<SessionEngine> {
        let active: Option<ActiveSession> = self.load_for_update(Slot::ActiveSession)?;
        Ok(SessionEngine::from_active(active))
    }

    pub(crate) fn save_engine(&self, engine: &SessionEngine) -> Result<()> {
        match engine.active() {
            Some(active) => self.repo.save(Slot::ActiveSession, active)?,
            None => self.repo.clear(Slot::ActiveSession)?,
        }
        Ok(())
    }
}
