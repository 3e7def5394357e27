//! # Studyroom Core Library
//!
//! Core logic for the Studyroom study tracker: goals and tasks, a
//! suspend-safe session timer, points and streaks, and weekly per-goal
//! progress. The `studyroom-cli` binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session Engine**: a timestamp-based state machine. Elapsed time is
//!   derived from the stored record on every query, so the hosting process
//!   can stop and restart mid-session without losing time
//! - **Reward Engine / Streaks**: pure functions over session figures and the
//!   gamification totals
//! - **Weekly Progress**: a deterministic fold over sessions and tasks; the
//!   stored snapshot is only a cache for the current week
//! - **Storage**: named JSON slots in SQLite (or memory) and TOML configuration
//!
//! ## Key Components
//!
//! - [`StudyTracker`]: context object every operation goes through
//! - [`SessionEngine`]: active-session state machine
//! - [`Database`]: SQLite slot store
//! - [`Config`]: user settings

pub mod calendar;
pub mod clock;
pub mod error;
pub mod events;
pub mod models;
pub mod progress;
pub mod rewards;
pub mod storage;
pub mod streak;
pub mod timer;
pub mod tracker;

pub use calendar::{WeekRange, WeekStart};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, Result, SessionError, StorageError, ValidationError};
pub use events::Event;
pub use models::{
    Difficulty, Gamification, Goal, GoalCategory, GoalPatch, NewGoal, NewTask, Session,
    SessionMode, Task, TaskPatch,
};
pub use progress::{GoalCompletion, GoalProgress, WeeklyProgress};
pub use rewards::{NextMilestone, PointBreakdown, WeeklyBonus};
pub use storage::{Config, Database, MemoryStore, Repository, Slot, Store};
pub use streak::StreakUpdate;
pub use timer::{ActiveSession, PomodoroConfig, PomodoroPhase, SessionEngine, TimerState};
pub use tracker::{
    ActiveSessionView, GoalSummary, ManualSession, SettleOutcome, Status, StopOptions,
    StopOutcome, StudyTracker,
};
