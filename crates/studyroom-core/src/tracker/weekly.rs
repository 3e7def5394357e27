//! Weekly progress cache, goal completion and points bookkeeping.

use chrono::NaiveDate;
use serde::Serialize;

use super::StudyTracker;
use crate::calendar::{self, WeekRange};
use crate::clock::Clock;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::models::{Gamification, Goal, Session, Task};
use crate::progress::{self, GoalCompletion, GoalProgress, WeeklyProgress};
use crate::rewards::{self, WeeklyBonus};
use crate::storage::{Slot, Store};

/// One active goal with its figures for the current week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalSummary {
    pub goal: Goal,
    pub progress: GoalProgress,
    pub completion: GoalCompletion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettleOutcome {
    pub week_start: NaiveDate,
    /// False when the week had already been settled.
    pub settled: bool,
    pub bonus: WeeklyBonus,
    pub gamification: Gamification,
    pub events: Vec<Event>,
}

impl<S: Store, C: Clock> StudyTracker<S, C> {
    /// Progress for the current week. Served from the cache when it belongs
    /// to this week; recomputed and re-cached otherwise. A snapshot built
    /// while history can't be read is returned but never cached.
    pub fn weekly_progress(&self) -> WeeklyProgress {
        let week_start = self.current_week_start();
        let cached: Option<WeeklyProgress> = self.repo.load_or_default(Slot::WeeklyProgress);
        if let Some(cached) = cached.filter(|p| p.is_current_for(week_start)) {
            return cached;
        }

        match self.compute_week_strict(week_start) {
            Ok(fresh) => {
                if let Err(e) = self.repo.save(Slot::WeeklyProgress, &fresh) {
                    tracing::warn!(error = %e, "weekly progress cache not written");
                }
                fresh
            }
            Err(e) => {
                tracing::warn!(error = %e, "history unreadable, weekly progress not cached");
                self.compute_week(week_start)
            }
        }
    }

    /// Recompute the current week unconditionally and store it. Emits a
    /// progress event for every goal whose figures moved.
    pub fn refresh_weekly_progress(&self) -> Result<(WeeklyProgress, Vec<Event>)> {
        let now = self.now();
        let week_start = self.current_week_start();
        let previous: Option<WeeklyProgress> = self.repo.load_or_default(Slot::WeeklyProgress);
        let fresh = self.compute_week_strict(week_start)?;
        self.repo.save(Slot::WeeklyProgress, &fresh)?;

        let events = fresh
            .changed_goals(previous.as_ref())
            .into_iter()
            .map(|goal_id| {
                let entry = fresh.goal(&goal_id);
                Event::GoalWeeklyProgressChanged {
                    goal_id,
                    week_start,
                    hours_completed: entry.hours_completed,
                    tasks_completed: entry.tasks_completed,
                    at: now,
                }
            })
            .collect();
        Ok((fresh, events))
    }

    /// Bring the cache in line after a catalog change. When the fresh figures
    /// can't be computed the stale snapshot is dropped instead, so the next
    /// read recomputes.
    pub(crate) fn sync_weekly_cache(&self) {
        let Err(e) = self.refresh_weekly_progress() else {
            return;
        };
        tracing::warn!(error = %e, "weekly progress not refreshed, dropping cache");
        if let Err(e) = self.repo.clear(Slot::WeeklyProgress) {
            tracing::warn!(error = %e, "stale weekly progress cache left in place");
        }
    }

    /// Progress for an arbitrary week over the active goals. Never cached.
    pub fn progress_for_week(&self, week_start: NaiveDate) -> WeeklyProgress {
        self.compute_week(week_start)
    }

    pub fn goal_summaries(&self) -> Vec<GoalSummary> {
        let progress = self.weekly_progress();
        self.active_goals()
            .into_iter()
            .map(|goal| GoalSummary {
                progress: progress.goal(&goal.id),
                completion: progress::goal_completion(&goal, &progress),
                goal,
            })
            .collect()
    }

    /// Pay out the weekly bonus for the week containing `week_start` and
    /// reset the weekly points.
    ///
    /// Weeks settle once and in order: a week on or before the last settled
    /// one pays nothing, and a week that hasn't ended yet is rejected. Only
    /// goals that existed by the end of the week are evaluated.
    pub fn settle_week(&self, week_start: NaiveDate) -> Result<SettleOutcome> {
        let now = self.now();
        let week = WeekRange::containing(week_start, self.week_start_day);
        let week_start = week.start;
        if week.end >= self.today() {
            return Err(ValidationError::invalid(
                "week_start",
                format!("week of {week_start} has not ended yet"),
            )
            .into());
        }

        let mut gamification: Gamification = self.load_for_update(Slot::Gamification)?;
        if let Some(last) = gamification.last_settled_week.filter(|last| week_start <= *last) {
            tracing::debug!(%week_start, last_settled = %last, "week already settled");
            return Ok(SettleOutcome {
                week_start,
                settled: false,
                bonus: WeeklyBonus::default(),
                gamification,
                events: Vec::new(),
            });
        }

        let goals: Vec<Goal> = self.load_for_update(Slot::Goals)?;
        let eligible: Vec<Goal> = goals
            .into_iter()
            .filter(|g| !g.archived && calendar::local_date(g.created_at) <= week.end)
            .collect();
        let sessions: Vec<Session> = self.load_for_update(Slot::Sessions)?;
        let tasks: Vec<Task> = self.load_for_update(Slot::Tasks)?;
        let progress =
            progress::recompute_weekly_progress(&sessions, &tasks, &eligible, week_start);
        let bonus = rewards::weekly_bonus(&progress, &eligible);

        let mut events = Vec::new();
        if gamification.award(bonus.total) {
            events.push(Event::PointsAwarded {
                amount: bonus.total,
                reason: "weekly_bonus".into(),
                total_points: gamification.total_points,
                at: now,
            });
        }
        gamification.reset_week();
        gamification.last_settled_week = Some(week_start);
        self.repo.save(Slot::Gamification, &gamification)?;

        events.push(Event::WeekSettled {
            week_start,
            bonus: bonus.total,
            at: now,
        });
        tracing::info!(
            %week_start,
            goals_met = bonus.goals_met.len(),
            bonus = bonus.total,
            "week settled"
        );
        Ok(SettleOutcome {
            week_start,
            settled: true,
            bonus,
            gamification,
            events,
        })
    }

    /// Weekly boundary reset of `points_this_week`. Idempotent.
    pub fn reset_week(&self) -> Result<Gamification> {
        let mut gamification: Gamification = self.load_for_update(Slot::Gamification)?;
        gamification.reset_week();
        self.repo.save(Slot::Gamification, &gamification)?;
        Ok(gamification)
    }

    /// Spend from the balance. Fails without changes when the balance is
    /// too small.
    pub fn spend_points(&self, points: i64) -> Result<Event> {
        let mut gamification: Gamification = self.load_for_update(Slot::Gamification)?;
        let total_points = gamification.spend(points)?;
        self.repo.save(Slot::Gamification, &gamification)?;
        tracing::info!(points, total_points, "points spent");
        Ok(Event::PointsSpent {
            amount: points,
            total_points,
            at: self.now(),
        })
    }

    fn compute_week(&self, week_start: NaiveDate) -> WeeklyProgress {
        progress::recompute_weekly_progress(
            &self.sessions(),
            &self.tasks(),
            &self.active_goals(),
            week_start,
        )
    }

    /// Like `compute_week`, but fails instead of folding over empty
    /// collections when a slot can't be read.
    fn compute_week_strict(&self, week_start: NaiveDate) -> Result<WeeklyProgress> {
        let sessions: Vec<Session> = self.load_for_update(Slot::Sessions)?;
        let tasks: Vec<Task> = self.load_for_update(Slot::Tasks)?;
        let goals: Vec<Goal> = self.load_for_update(Slot::Goals)?;
        let active: Vec<Goal> = goals.into_iter().filter(|g| !g.archived).collect();
        Ok(progress::recompute_weekly_progress(
            &sessions, &tasks, &active, week_start,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::CoreError;
    use crate::models::{NewGoal, NewTask};
    use crate::storage::MemoryStore;
    use crate::tracker::ManualSession;
    use chrono::{DateTime, Local, TimeZone, Utc};

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    // Wednesday 2024-06-12; the Monday week starts 2024-06-10.
    fn tracker() -> StudyTracker<MemoryStore, ManualClock> {
        StudyTracker::new(MemoryStore::new(), ManualClock::new(local(2024, 6, 12, 18)))
    }

    fn log(t: &StudyTracker<MemoryStore, ManualClock>, goal_id: &str, start: DateTime<Utc>, secs: u64) {
        t.log_manual_session(ManualSession {
            goal_id: goal_id.to_string(),
            task_id: None,
            start,
            duration_secs: secs,
            task_completed: false,
            notes: String::new(),
        })
        .unwrap();
    }

    #[test]
    fn cache_is_reused_within_week_and_dropped_after() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust").with_hours(10.0)).unwrap();
        log(&t, &goal.id, local(2024, 6, 11, 9), 7200);

        let progress = t.weekly_progress();
        assert_eq!(progress.week_start, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(progress.goal(&goal.id).hours_completed, 2.0);

        // Next Monday: the old snapshot must not be served.
        t.clock().set(local(2024, 6, 17, 9));
        let next = t.weekly_progress();
        assert_eq!(next.week_start, NaiveDate::from_ymd_opt(2024, 6, 17).unwrap());
        assert_eq!(next.goal(&goal.id).hours_completed, 0.0);
    }

    #[test]
    fn refresh_only_reports_moved_goals() {
        let t = tracker();
        let a = t.create_goal(NewGoal::named("A")).unwrap();
        let b = t.create_goal(NewGoal::named("B")).unwrap();
        t.refresh_weekly_progress().unwrap();

        log(&t, &a.id, local(2024, 6, 12, 8), 1800);
        let (_, events) = t.refresh_weekly_progress().unwrap();
        assert!(events.is_empty(), "logging already refreshed the cache");

        let (progress, _) = t.refresh_weekly_progress().unwrap();
        assert_eq!(progress.goal(&a.id).hours_completed, 0.5);
        assert_eq!(progress.goal(&b.id).hours_completed, 0.0);
    }

    #[test]
    fn settle_week_pays_once() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust").with_hours(10.0)).unwrap();
        log(&t, &goal.id, local(2024, 6, 10, 8), 36_000);
        let before = t.gamification().total_points;
        let week = t.current_week_start();

        t.clock().set(local(2024, 6, 17, 9));
        let outcome = t.settle_week(week).unwrap();
        assert!(outcome.settled);
        assert_eq!(outcome.bonus.total, 150);
        assert_eq!(outcome.gamification.total_points, before + 150);
        assert_eq!(outcome.gamification.points_this_week, 0);

        let again = t.settle_week(week).unwrap();
        assert!(!again.settled);
        assert_eq!(again.bonus.total, 0);
        assert_eq!(t.gamification().total_points, before + 150);
    }

    #[test]
    fn unfinished_week_cannot_be_settled() {
        let t = tracker();
        t.create_goal(NewGoal::named("Rust")).unwrap();
        let week = t.current_week_start();
        assert!(matches!(t.settle_week(week), Err(CoreError::Validation(_))));
        let next = week + chrono::Duration::days(7);
        assert!(matches!(t.settle_week(next), Err(CoreError::Validation(_))));
        assert_eq!(t.gamification().last_settled_week, None);
    }

    #[test]
    fn earlier_weeks_are_not_paid_after_a_later_one() {
        let t = tracker();
        // Created three weeks before the clock's week; no targets, so every
        // week since counts as met.
        t.clock().set(local(2024, 5, 20, 9));
        t.create_goal(NewGoal::named("Reading")).unwrap();
        t.clock().set(local(2024, 6, 12, 18));

        let last_week = t.current_week_start() - chrono::Duration::days(7);
        let paid = t.settle_week(last_week).unwrap();
        assert_eq!(paid.bonus.total, 150);
        let balance = t.gamification().total_points;

        let older = t.settle_week(last_week - chrono::Duration::days(7)).unwrap();
        assert!(!older.settled);
        // A mid-week date names the same, already settled week.
        let same = t.settle_week(last_week + chrono::Duration::days(3)).unwrap();
        assert!(!same.settled);
        assert_eq!(same.week_start, last_week);
        assert_eq!(t.gamification().total_points, balance);
        assert_eq!(t.gamification().last_settled_week, Some(last_week));
    }

    #[test]
    fn goals_created_after_the_week_are_not_evaluated() {
        let t = tracker();
        t.create_goal(NewGoal::named("Reading")).unwrap();
        let before_goal = t.current_week_start() - chrono::Duration::days(7);
        t.clock().set(local(2024, 6, 17, 9));

        let outcome = t.settle_week(before_goal).unwrap();
        assert!(outcome.settled);
        assert_eq!(outcome.bonus.goals_evaluated, 0);
        assert_eq!(outcome.bonus.total, 0);
    }

    #[test]
    fn task_changes_show_up_in_cached_progress() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust").with_tasks(1)).unwrap();
        let task = t.create_task(NewTask::new(&goal.id, "ch1")).unwrap();
        assert_eq!(t.weekly_progress().goal(&goal.id).tasks_completed, 0);

        t.complete_task(&task.id).unwrap();
        assert_eq!(t.weekly_progress().goal(&goal.id).tasks_completed, 1);
        assert!(t.goal_summaries()[0].completion.met);

        t.reopen_task(&task.id).unwrap();
        assert_eq!(t.weekly_progress().goal(&goal.id).tasks_completed, 0);

        t.complete_task(&task.id).unwrap();
        t.delete_task(&task.id).unwrap();
        assert_eq!(t.weekly_progress().total_tasks, 0);
    }

    #[test]
    fn goal_changes_show_up_in_cached_progress() {
        let t = tracker();
        let a = t.create_goal(NewGoal::named("A")).unwrap();
        let b = t.create_goal(NewGoal::named("B")).unwrap();
        log(&t, &a.id, local(2024, 6, 12, 8), 3600);
        log(&t, &b.id, local(2024, 6, 12, 10), 3600);
        assert_eq!(t.weekly_progress().total_hours, 2.0);

        t.archive_goal(&a.id).unwrap();
        assert_eq!(t.weekly_progress().total_hours, 1.0);
        t.unarchive_goal(&a.id).unwrap();
        assert_eq!(t.weekly_progress().total_hours, 2.0);
        t.delete_goal(&b.id).unwrap();
        let progress = t.weekly_progress();
        assert_eq!(progress.total_hours, 1.0);
        assert!(!progress.goals.contains_key(&b.id));
    }

    #[test]
    fn cache_is_dropped_when_it_cannot_be_refreshed() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        let task = t.create_task(NewTask::new(&goal.id, "ch1")).unwrap();
        t.weekly_progress();

        t.complete_task(&task.id).unwrap();
        t.repository().store().set(Slot::Sessions, "not json").unwrap();
        t.reopen_task(&task.id).unwrap();
        assert_eq!(t.repository().store().raw(Slot::WeeklyProgress), None);
    }

    #[test]
    fn goal_summaries_cover_active_goals() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust").with_hours(4.0)).unwrap();
        let archived = t.create_goal(NewGoal::named("Old")).unwrap();
        t.archive_goal(&archived.id).unwrap();
        log(&t, &goal.id, local(2024, 6, 12, 8), 3600);

        let summaries = t.goal_summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].completion.hours_pct, Some(25.0));
        assert!(!summaries[0].completion.met);
    }

    #[test]
    fn spending() {
        let t = tracker();
        assert!(matches!(t.spend_points(1), Err(CoreError::Validation(_))));
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        log(&t, &goal.id, local(2024, 6, 12, 8), 7200);
        let total = t.gamification().total_points;

        let event = t.spend_points(5).unwrap();
        assert!(matches!(event, Event::PointsSpent { amount: 5, .. }));
        assert_eq!(t.gamification().total_points, total - 5);
        assert_eq!(t.gamification().lifetime_points, total);

        assert!(t.spend_points(total).is_err());
        assert_eq!(t.gamification().total_points, total - 5);
    }

    #[test]
    fn reset_week_is_idempotent() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        log(&t, &goal.id, local(2024, 6, 12, 8), 3600);
        assert!(t.gamification().points_this_week > 0);
        assert_eq!(t.reset_week().unwrap().points_this_week, 0);
        assert_eq!(t.reset_week().unwrap().points_this_week, 0);
        assert!(t.gamification().total_points > 0);
    }
}
