//! Session lifecycle: begin, pause, resume, stop and after-the-fact entry.
//!
//! A stop writes its side effects in this order:
//!
//! ```text
//! task completion -> session record -> points + streak -> clear active -> weekly cache
//! ```
//!
//! Gamification and session history are read before anything is written, so
//! an unreadable slot fails the stop with nothing changed. A crash part-way
//! leaves the session record in place; at worst the active slot survives and
//! the user stops it again. A retried stop still credits a task that the
//! failed attempt completed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StudyTracker;
use crate::calendar::format_timer;
use crate::clock::Clock;
use crate::error::{Result, SessionError, ValidationError};
use crate::events::Event;
use crate::models::{Difficulty, Gamification, Session, SessionMode, Task};
use crate::rewards::{self, NextMilestone, PointBreakdown, SessionReward};
use crate::storage::{Slot, Store};
use crate::streak::{self, StreakUpdate};
use crate::timer::{PomodoroConfig, PomodoroPhase, TimerState};

/// Caller choices when stopping a live session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopOptions {
    #[serde(default)]
    pub notes: String,
    /// Complete the session's task as part of stopping.
    #[serde(default)]
    pub complete_task: bool,
}

/// A session entered after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualSession {
    pub goal_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub start: DateTime<Utc>,
    pub duration_secs: u64,
    #[serde(default)]
    pub task_completed: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopOutcome {
    pub session: Session,
    pub points: PointBreakdown,
    pub streak: StreakUpdate,
    pub events: Vec<Event>,
}

/// Render-ready view of the active session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveSessionView {
    pub goal_id: String,
    pub task_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub state: TimerState,
    pub paused: bool,
    pub elapsed_secs: u64,
    pub elapsed_display: String,
    pub mode: SessionMode,
    pub pomodoros_completed: u32,
    pub pomodoro_phase: Option<PomodoroPhase>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub active: Option<ActiveSessionView>,
    pub gamification: Gamification,
    /// Streak as of today; zero once a day has been missed.
    pub live_streak: u32,
    /// Daily bonus the next credited day earns: today if nothing has been
    /// recorded yet today, otherwise tomorrow.
    pub next_daily_bonus: i64,
    pub next_milestone: Option<NextMilestone>,
}

/// Slots a recorded session updates, read up front.
struct History {
    gamification: Gamification,
    sessions: Vec<Session>,
}

impl<S: Store, C: Clock> StudyTracker<S, C> {
    /// Start timing `goal_id`. Pomodoro mode without an explicit config
    /// uses the tracker's defaults.
    pub fn begin(
        &self,
        goal_id: &str,
        task_id: Option<&str>,
        mode: SessionMode,
        pomodoro: Option<PomodoroConfig>,
    ) -> Result<Event> {
        if self.find_goal(goal_id)?.is_none() {
            return Err(SessionError::UnknownGoal(goal_id.to_string()).into());
        }
        if let Some(task_id) = task_id {
            self.session_task(goal_id, task_id)?;
        }
        if let Some(cfg) = &pomodoro {
            cfg.validate()?;
        }
        let pomodoro = match mode {
            SessionMode::Pomodoro => Some(pomodoro.unwrap_or(self.pomodoro_defaults)),
            SessionMode::Timer => pomodoro,
        };

        let mut engine = self.load_engine()?;
        let event = engine.begin(goal_id, task_id.map(str::to_string), mode, pomodoro, self.now())?;
        self.save_engine(&engine)?;
        tracing::info!(goal_id, ?mode, "session started");
        Ok(event)
    }

    pub fn pause(&self) -> Result<Event> {
        let mut engine = self.load_engine()?;
        let event = engine.pause(self.now())?;
        self.save_engine(&engine)?;
        tracing::info!("session paused");
        Ok(event)
    }

    pub fn resume(&self) -> Result<Event> {
        let mut engine = self.load_engine()?;
        let event = engine.resume(self.now())?;
        self.save_engine(&engine)?;
        tracing::info!("session resumed");
        Ok(event)
    }

    /// Count one finished pomodoro on the active session.
    pub fn record_pomodoro(&self) -> Result<u32> {
        let mut engine = self.load_engine()?;
        let count = engine.record_pomodoro()?;
        self.save_engine(&engine)?;
        Ok(count)
    }

    /// Active seconds of the running session, if any. Pure function of the
    /// stored record and the clock.
    pub fn elapsed(&self) -> Option<u64> {
        self.active_session().map(|s| s.elapsed_at(self.now()))
    }

    /// Discard the active session without recording anything.
    pub fn cancel(&self) -> Result<Event> {
        let mut engine = self.load_engine()?;
        let now = self.now();
        let elapsed = engine.elapsed_at(now).ok_or(SessionError::NoActiveSession)?;
        let Some(active) = engine.clear() else {
            return Err(SessionError::NoActiveSession.into());
        };
        self.save_engine(&engine)?;
        tracing::info!(goal_id = %active.goal_id, elapsed, "session cancelled");
        Ok(Event::SessionCancelled {
            goal_id: active.goal_id,
            elapsed_secs: elapsed,
            at: now,
        })
    }

    /// Finish the active session into a persisted [`Session`].
    pub fn stop(&self, options: StopOptions) -> Result<StopOutcome> {
        let mut engine = self.load_engine()?;
        let now = self.now();
        let finished = engine.finish(now)?;
        let active = &finished.active;
        let history = self.load_history()?;

        let (task_completed, difficulty) = match (&active.task_id, options.complete_task) {
            (Some(task_id), true) => {
                self.complete_for_session(task_id, active.start_time, &history.sessions)
            }
            _ => (false, None),
        };

        let session = Session {
            id: Uuid::new_v4().to_string(),
            goal_id: active.goal_id.clone(),
            start_time: active.start_time,
            end_time: finished.ended_at,
            duration: finished.duration,
            mode: active.mode,
            pomodoro_cycles: active.pomodoros_completed,
            task_id: active.task_id.clone(),
            task_completed,
            points_earned: 0,
            paused_duration: finished.paused_duration,
            is_manual: false,
            notes: options.notes,
            created_at: now,
        };

        let outcome = self.record_session(session, difficulty, history, || {
            engine.clear();
            self.save_engine(&engine)
        })?;
        tracing::info!(
            session_id = %outcome.session.id,
            duration = outcome.session.duration,
            points = outcome.points.total,
            "session stopped"
        );
        Ok(outcome)
    }

    /// Record a session that was not timed live. Points, streak and weekly
    /// progress are updated exactly as for a stop.
    pub fn log_manual_session(&self, manual: ManualSession) -> Result<StopOutcome> {
        if self.find_goal(&manual.goal_id)?.is_none() {
            return Err(SessionError::UnknownGoal(manual.goal_id).into());
        }
        if manual.duration_secs == 0 {
            return Err(ValidationError::invalid("duration_secs", "must be positive").into());
        }
        let secs = i64::try_from(manual.duration_secs)
            .map_err(|_| ValidationError::invalid("duration_secs", "too large"))?;
        let end = manual.start + Duration::seconds(secs);

        let history = self.load_history()?;
        let mut difficulty = None;
        let mut task_completed = manual.task_completed;
        if let Some(task_id) = &manual.task_id {
            let task = self.session_task(&manual.goal_id, task_id)?;
            if manual.task_completed {
                let (credited, diff) =
                    self.complete_for_session(&task.id, manual.start, &history.sessions);
                task_completed = credited;
                difficulty = diff;
            }
        }

        let now = self.now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            goal_id: manual.goal_id,
            start_time: manual.start,
            end_time: end,
            duration: manual.duration_secs,
            mode: SessionMode::Timer,
            pomodoro_cycles: 0,
            task_id: manual.task_id,
            task_completed,
            points_earned: 0,
            paused_duration: 0,
            is_manual: true,
            notes: manual.notes,
            created_at: now,
        };

        let outcome = self.record_session(session, difficulty, history, || Ok(()))?;
        tracing::info!(
            session_id = %outcome.session.id,
            duration = outcome.session.duration,
            points = outcome.points.total,
            "manual session logged"
        );
        Ok(outcome)
    }

    pub fn status(&self) -> Status {
        let now = self.now();
        let today = self.today();
        let gamification = self.gamification();
        let live_streak = streak::live_streak(&gamification, today);
        let next_credited = if streak::is_first_session_of_day(&gamification, today) {
            streak::projected_streak(&gamification, today)
        } else {
            gamification.current_streak.saturating_add(1)
        };
        let active = self.active_session().map(|s| {
            let elapsed = s.elapsed_at(now);
            ActiveSessionView {
                goal_id: s.goal_id.clone(),
                task_id: s.task_id.clone(),
                started_at: s.start_time,
                state: if s.is_paused() {
                    TimerState::Paused
                } else {
                    TimerState::Running
                },
                paused: s.is_paused(),
                elapsed_secs: elapsed,
                elapsed_display: format_timer(elapsed),
                mode: s.mode,
                pomodoros_completed: s.pomodoros_completed,
                pomodoro_phase: s.pomodoro_phase(now),
            }
        });
        Status {
            active,
            next_milestone: rewards::next_streak_milestone(live_streak),
            next_daily_bonus: rewards::daily_streak_bonus(next_credited),
            live_streak,
            gamification,
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Look up a task that a session may reference: it must exist and
    /// belong to the session's goal.
    fn session_task(&self, goal_id: &str, task_id: &str) -> Result<Task> {
        let tasks: Vec<Task> = self.load_for_update(Slot::Tasks)?;
        tasks
            .into_iter()
            .find(|t| t.id == task_id && t.goal_id == goal_id)
            .ok_or_else(|| SessionError::UnknownTask(task_id.to_string()).into())
    }

    /// Strict reads of everything a recorded session writes back.
    fn load_history(&self) -> Result<History> {
        Ok(History {
            gamification: self.load_for_update(Slot::Gamification)?,
            sessions: self.load_for_update(Slot::Sessions)?,
        })
    }

    /// Complete a task on behalf of a session. The bonus goes to a task
    /// finished at or after `since` that no recorded session has claimed;
    /// a task done before the session, or one deleted since, earns nothing.
    fn complete_for_session(
        &self,
        task_id: &str,
        since: DateTime<Utc>,
        sessions: &[Session],
    ) -> (bool, Option<Difficulty>) {
        let claimed = sessions
            .iter()
            .any(|s| s.task_completed && s.task_id.as_deref() == Some(task_id));
        let (task, newly) = match self.mark_task_complete(task_id) {
            Ok(done) => done,
            Err(e) => {
                tracing::warn!(task_id, error = %e, "could not complete session task");
                return (false, None);
            }
        };
        let done_in_session = newly || task.completed_at.is_some_and(|at| at >= since);
        if claimed || !done_in_session {
            return (false, None);
        }
        (true, Some(task.difficulty))
    }

    /// Price, persist and credit a finished session. `clear_active` runs
    /// after the session and gamification writes and before the weekly
    /// cache refresh.
    fn record_session<F>(
        &self,
        mut session: Session,
        difficulty: Option<Difficulty>,
        history: History,
        clear_active: F,
    ) -> Result<StopOutcome>
    where
        F: FnOnce() -> Result<()>,
    {
        let now = self.now();
        let today = self.today();
        let History {
            mut gamification,
            mut sessions,
        } = history;

        let first_today = streak::is_first_session_of_day(&gamification, today);
        let points = rewards::total_session_points(SessionReward {
            duration_secs: session.duration,
            task_completed: session.task_completed,
            difficulty,
            streak_before_session: streak::projected_streak(&gamification, today)
                .saturating_sub(1),
            first_session_today: first_today,
        });
        session.points_earned = points.total;

        sessions.push(session.clone());
        self.repo.save(Slot::Sessions, &sessions)?;

        let mut events = vec![Event::SessionStopped {
            session_id: session.id.clone(),
            goal_id: session.goal_id.clone(),
            duration_secs: session.duration,
            points,
            at: now,
        }];

        if gamification.award(points.total) {
            events.push(Event::PointsAwarded {
                amount: points.total,
                reason: if session.is_manual {
                    "manual_session".into()
                } else {
                    "session".into()
                },
                total_points: gamification.total_points,
                at: now,
            });
        }
        let streak_update = streak::update_streak(&mut gamification, today);
        self.repo.save(Slot::Gamification, &gamification)?;
        if streak_update.changed {
            events.push(Event::StreakUpdated {
                previous: streak_update.previous,
                current: streak_update.current,
                longest: streak_update.longest,
                at: now,
            });
        }

        clear_active()?;

        match self.refresh_weekly_progress() {
            Ok((_, progress_events)) => events.extend(progress_events),
            Err(e) => tracing::warn!(error = %e, "weekly progress cache not refreshed"),
        }

        Ok(StopOutcome {
            session,
            points,
            streak: streak_update,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::CoreError;
    use crate::models::{NewGoal, NewTask};
    use crate::storage::MemoryStore;
    use chrono::{NaiveDate, TimeZone};

    fn hard_task_session(t: &StudyTracker<MemoryStore, ManualClock>) -> Task {
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        let task = t
            .create_task(NewTask::new(&goal.id, "ch1").with_difficulty(Difficulty::Hard))
            .unwrap();
        t.begin(&goal.id, Some(&task.id), SessionMode::Timer, None)
            .unwrap();
        task
    }

    fn stop_completing(t: &StudyTracker<MemoryStore, ManualClock>) -> Result<StopOutcome> {
        t.stop(StopOptions {
            notes: String::new(),
            complete_task: true,
        })
    }

    fn tracker() -> StudyTracker<MemoryStore, ManualClock> {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap());
        StudyTracker::new(MemoryStore::new(), clock)
    }

    #[test]
    fn begin_requires_known_goal_and_single_session() {
        let t = tracker();
        assert!(matches!(
            t.begin("ghost", None, SessionMode::Timer, None),
            Err(CoreError::Session(SessionError::UnknownGoal(_)))
        ));

        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        t.begin(&goal.id, None, SessionMode::Timer, None).unwrap();
        let err = t.begin(&goal.id, None, SessionMode::Timer, None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Session(SessionError::AlreadyActive { .. })
        ));
    }

    #[test]
    fn begin_rejects_task_of_other_goal() {
        let t = tracker();
        let a = t.create_goal(NewGoal::named("A")).unwrap();
        let b = t.create_goal(NewGoal::named("B")).unwrap();
        let task = t.create_task(NewTask::new(&b.id, "b-task")).unwrap();
        assert!(matches!(
            t.begin(&a.id, Some(&task.id), SessionMode::Timer, None),
            Err(CoreError::Session(SessionError::UnknownTask(_)))
        ));
        assert!(t.active_session().is_none());
    }

    #[test]
    fn stop_with_task_completion() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        let task = t
            .create_task(NewTask::new(&goal.id, "ch1").with_difficulty(Difficulty::Hard))
            .unwrap();
        t.begin(&goal.id, Some(&task.id), SessionMode::Timer, None)
            .unwrap();
        t.clock().advance_secs(7200);

        let outcome = t
            .stop(StopOptions {
                notes: "done".into(),
                complete_task: true,
            })
            .unwrap();
        // 10 time + 5 task + 15 hard, plus first-of-day streak 1 => 2
        assert_eq!(outcome.points.time_points, 10);
        assert_eq!(outcome.points.task_bonus, 20);
        assert_eq!(outcome.points.daily_streak_bonus, 2);
        assert_eq!(outcome.points.total, 32);
        assert!(outcome.session.task_completed);
        assert_eq!(outcome.session.points_earned, 32);
        assert_eq!(outcome.session.notes, "done");
        assert!(t.task(&task.id).unwrap().completed);
        assert!(t.active_session().is_none());

        let g = t.gamification();
        assert_eq!(g.total_points, 32);
        assert_eq!(g.current_streak, 1);

        let names: Vec<_> = outcome.events.iter().map(Event::name).collect();
        assert_eq!(
            names,
            vec![
                "session_stopped",
                "points_awarded",
                "streak_updated",
                "goal_weekly_progress_changed"
            ]
        );
    }

    #[test]
    fn second_session_same_day_gets_no_streak_bonus() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        t.begin(&goal.id, None, SessionMode::Timer, None).unwrap();
        t.clock().advance_secs(3600);
        let first = t.stop(StopOptions::default()).unwrap();
        assert_eq!(first.points.total, 5 + 2);

        t.begin(&goal.id, None, SessionMode::Timer, None).unwrap();
        t.clock().advance_secs(3600);
        let second = t.stop(StopOptions::default()).unwrap();
        assert_eq!(second.points.total, 5);
        assert!(!second.streak.changed);
        assert_eq!(t.gamification().total_points, 12);
    }

    #[test]
    fn stop_while_paused_excludes_pause() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        t.begin(&goal.id, None, SessionMode::Timer, None).unwrap();
        t.clock().advance_secs(1200);
        t.pause().unwrap();
        assert!(matches!(
            t.pause(),
            Err(CoreError::Session(SessionError::AlreadyPaused))
        ));
        t.clock().advance_secs(600);
        assert_eq!(t.elapsed(), Some(1200));

        let outcome = t.stop(StopOptions::default()).unwrap();
        assert_eq!(outcome.session.duration, 1200);
        assert_eq!(outcome.session.paused_duration, 600);
        assert_eq!(
            outcome.session.end_time - outcome.session.start_time,
            Duration::seconds(1800)
        );
    }

    #[test]
    fn cancel_records_nothing() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        t.begin(&goal.id, None, SessionMode::Timer, None).unwrap();
        t.clock().advance_secs(300);
        let event = t.cancel().unwrap();
        assert!(matches!(event, Event::SessionCancelled { elapsed_secs: 300, .. }));
        assert!(t.sessions().is_empty());
        assert_eq!(t.gamification(), Gamification::default());
        assert!(matches!(
            t.cancel(),
            Err(CoreError::Session(SessionError::NoActiveSession))
        ));
    }

    #[test]
    fn manual_session_validation() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        let start = t.now() - Duration::hours(3);
        let zero = ManualSession {
            goal_id: goal.id.clone(),
            task_id: None,
            start,
            duration_secs: 0,
            task_completed: false,
            notes: String::new(),
        };
        assert!(matches!(
            t.log_manual_session(zero.clone()),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            t.log_manual_session(ManualSession {
                goal_id: "ghost".into(),
                duration_secs: 60,
                ..zero.clone()
            }),
            Err(CoreError::Session(SessionError::UnknownGoal(_)))
        ));

        let outcome = t
            .log_manual_session(ManualSession {
                duration_secs: 5400,
                task_completed: true,
                ..zero
            })
            .unwrap();
        assert!(outcome.session.is_manual);
        assert_eq!(outcome.session.end_time - start, Duration::seconds(5400));
        // round(7.5) = 8, flat task bonus 5, streak day 1 => 2
        assert_eq!(outcome.points.total, 8 + 5 + 2);
    }

    #[test]
    fn pomodoro_mode_uses_defaults() {
        let t = tracker().with_pomodoro_defaults(PomodoroConfig {
            work_minutes: 50,
            short_break_minutes: 10,
            long_break_minutes: 30,
            cycles_before_long_break: 2,
        });
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        t.begin(&goal.id, None, SessionMode::Pomodoro, None).unwrap();
        assert_eq!(t.active_session().unwrap().pomodoro.unwrap().work_minutes, 50);
        assert_eq!(t.record_pomodoro().unwrap(), 1);

        t.clock().advance_secs(55 * 60);
        let status = t.status();
        let view = status.active.unwrap();
        assert_eq!(view.pomodoros_completed, 1);
        assert_eq!(view.elapsed_display, "55:00");
        assert!(view.pomodoro_phase.is_some());

        let outcome = t.stop(StopOptions::default()).unwrap();
        assert_eq!(outcome.session.pomodoro_cycles, 1);
        assert_eq!(outcome.session.mode, SessionMode::Pomodoro);
    }

    #[test]
    fn failed_session_write_keeps_active_slot() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        t.begin(&goal.id, None, SessionMode::Timer, None).unwrap();
        t.clock().advance_secs(600);

        t.repository().store().fail_writes(true);
        assert!(matches!(
            t.stop(StopOptions::default()),
            Err(CoreError::Storage(_))
        ));
        t.repository().store().fail_writes(false);

        assert!(t.active_session().is_some());
        assert!(t.sessions().is_empty());
        let outcome = t.stop(StopOptions::default()).unwrap();
        assert_eq!(outcome.session.duration, 600);
    }

    #[test]
    fn unreadable_gamification_fails_stop_before_task_is_touched() {
        let t = tracker();
        let task = hard_task_session(&t);
        t.clock().advance_secs(7200);

        let store = t.repository().store();
        store.set(Slot::Gamification, "{broken").unwrap();
        assert!(matches!(stop_completing(&t), Err(CoreError::Storage(_))));
        assert!(!t.task(&task.id).unwrap().completed);
        assert!(t.active_session().is_some());

        store.remove(Slot::Gamification).unwrap();
        let outcome = stop_completing(&t).unwrap();
        assert!(outcome.session.task_completed);
        assert_eq!(outcome.points.task_bonus, 20);
    }

    #[test]
    fn task_finished_during_session_is_credited_once() {
        let t = tracker();
        let task = hard_task_session(&t);
        t.clock().advance_secs(1800);
        t.complete_task(&task.id).unwrap();
        t.clock().advance_secs(1800);

        let first = stop_completing(&t).unwrap();
        assert!(first.session.task_completed);
        assert_eq!(first.points.task_bonus, 20);

        // Same task again: already claimed by the first session.
        t.begin(&task.goal_id, Some(&task.id), SessionMode::Timer, None)
            .unwrap();
        t.clock().advance_secs(600);
        let second = stop_completing(&t).unwrap();
        assert!(!second.session.task_completed);
        assert_eq!(second.points.task_bonus, 0);
    }

    #[test]
    fn task_finished_before_session_earns_nothing() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        let task = t.create_task(NewTask::new(&goal.id, "ch1")).unwrap();
        t.complete_task(&task.id).unwrap();
        t.clock().advance_secs(60);

        t.begin(&goal.id, Some(&task.id), SessionMode::Timer, None)
            .unwrap();
        t.clock().advance_secs(600);
        let outcome = stop_completing(&t).unwrap();
        assert!(!outcome.session.task_completed);
        assert_eq!(outcome.points.task_bonus, 0);
    }

    #[test]
    fn unreadable_goals_are_a_storage_error_not_an_unknown_goal() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        t.repository().store().fail_reads(true);

        assert!(matches!(
            t.begin(&goal.id, None, SessionMode::Timer, None),
            Err(CoreError::Storage(_))
        ));
        assert!(matches!(
            t.log_manual_session(ManualSession {
                goal_id: goal.id.clone(),
                task_id: None,
                start: t.now() - Duration::hours(1),
                duration_secs: 3600,
                task_completed: false,
                notes: String::new(),
            }),
            Err(CoreError::Storage(_))
        ));

        t.repository().store().fail_reads(false);
        assert!(t.active_session().is_none());
        assert!(t.sessions().is_empty());
    }

    #[test]
    fn next_daily_bonus_targets_next_credited_day() {
        let t = tracker();
        let today = t.today();
        assert_eq!(t.status().next_daily_bonus, 2);

        let save = |current_streak: u32, last: NaiveDate| {
            let g = Gamification {
                current_streak,
                longest_streak: current_streak,
                last_study_date: Some(last),
                ..Gamification::default()
            };
            t.repository().save(Slot::Gamification, &g).unwrap();
        };

        // Credited today at 6: tomorrow makes 7.
        save(6, today);
        assert_eq!(t.status().next_daily_bonus, 4);
        // Studied yesterday at 6: today makes 7.
        save(6, today - Duration::days(1));
        assert_eq!(t.status().next_daily_bonus, 4);
        // Gap: the next credited day restarts at 1.
        save(6, today - Duration::days(3));
        let status = t.status();
        assert_eq!(status.live_streak, 0);
        assert_eq!(status.next_daily_bonus, 2);
    }
}
