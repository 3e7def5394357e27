//! Goal and task management.
//!
//! Mutations that move this week's figures (task completion state, task or
//! goal removal, archiving) bring the weekly progress cache up to date
//! before returning.

use super::StudyTracker;
use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::models::{Goal, GoalPatch, NewGoal, NewTask, Task, TaskPatch};
use crate::storage::{Slot, Store};

fn goal_not_found(id: &str) -> CoreError {
    CoreError::NotFound {
        entity: "goal",
        id: id.to_string(),
    }
}

fn task_not_found(id: &str) -> CoreError {
    CoreError::NotFound {
        entity: "task",
        id: id.to_string(),
    }
}

impl<S: Store, C: Clock> StudyTracker<S, C> {
    pub fn goal(&self, id: &str) -> Option<Goal> {
        self.goals().into_iter().find(|g| g.id == id)
    }

    /// Goal lookup that reports an unreadable goals slot instead of
    /// treating it as empty.
    pub(crate) fn find_goal(&self, id: &str) -> Result<Option<Goal>> {
        let goals: Vec<Goal> = self.load_for_update(Slot::Goals)?;
        Ok(goals.into_iter().find(|g| g.id == id))
    }

    pub fn create_goal(&self, new: NewGoal) -> Result<Goal> {
        let goal = new.into_goal(self.now())?;
        let mut goals: Vec<Goal> = self.load_for_update(Slot::Goals)?;
        goals.push(goal.clone());
        self.repo.save(Slot::Goals, &goals)?;
        tracing::info!(goal_id = %goal.id, name = %goal.name, "goal created");
        self.sync_weekly_cache();
        Ok(goal)
    }

    pub fn update_goal(&self, id: &str, patch: GoalPatch) -> Result<Goal> {
        self.modify_goal(id, |goal| Ok(goal.apply(patch)?))
    }

    pub fn archive_goal(&self, id: &str) -> Result<Goal> {
        let goal = self.modify_goal(id, |goal| {
            goal.archived = true;
            Ok(())
        })?;
        self.sync_weekly_cache();
        Ok(goal)
    }

    pub fn unarchive_goal(&self, id: &str) -> Result<Goal> {
        let goal = self.modify_goal(id, |goal| {
            goal.archived = false;
            Ok(())
        })?;
        self.sync_weekly_cache();
        Ok(goal)
    }

    /// Hard delete. The goal's tasks go with it; its sessions stay as
    /// history and are skipped by aggregation. Returns the number of tasks
    /// removed.
    pub fn delete_goal(&self, id: &str) -> Result<usize> {
        let mut goals: Vec<Goal> = self.load_for_update(Slot::Goals)?;
        let before = goals.len();
        goals.retain(|g| g.id != id);
        if goals.len() == before {
            return Err(goal_not_found(id));
        }

        let mut tasks: Vec<Task> = self.load_for_update(Slot::Tasks)?;
        let task_count = tasks.len();
        tasks.retain(|t| t.goal_id != id);
        let removed = task_count - tasks.len();

        self.repo.save(Slot::Goals, &goals)?;
        if removed > 0 {
            self.repo.save(Slot::Tasks, &tasks)?;
        }
        tracing::info!(goal_id = %id, tasks_removed = removed, "goal deleted");
        self.sync_weekly_cache();
        Ok(removed)
    }

    fn modify_goal<F>(&self, id: &str, f: F) -> Result<Goal>
    where
        F: FnOnce(&mut Goal) -> Result<()>,
    {
        let mut goals: Vec<Goal> = self.load_for_update(Slot::Goals)?;
        let goal = goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| goal_not_found(id))?;
        f(goal)?;
        let updated = goal.clone();
        self.repo.save(Slot::Goals, &goals)?;
        Ok(updated)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn task(&self, id: &str) -> Option<Task> {
        self.tasks().into_iter().find(|t| t.id == id)
    }

    pub fn tasks_for_goal(&self, goal_id: &str) -> Vec<Task> {
        self.tasks()
            .into_iter()
            .filter(|t| t.goal_id == goal_id)
            .collect()
    }

    pub fn create_task(&self, new: NewTask) -> Result<Task> {
        if self.find_goal(&new.goal_id)?.is_none() {
            return Err(goal_not_found(&new.goal_id));
        }
        let task = new.into_task(self.now())?;
        let mut tasks: Vec<Task> = self.load_for_update(Slot::Tasks)?;
        tasks.push(task.clone());
        self.repo.save(Slot::Tasks, &tasks)?;
        Ok(task)
    }

    pub fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        self.modify_task(id, |task| {
            task.apply(patch)?;
            Ok(true)
        })
        .map(|(task, _)| task)
    }

    /// Mark a task done. A task that is already done keeps its original
    /// completion time. The flag reports whether this call completed it.
    pub fn complete_task(&self, id: &str) -> Result<(Task, bool)> {
        let (task, changed) = self.mark_task_complete(id)?;
        if changed {
            self.sync_weekly_cache();
        }
        Ok((task, changed))
    }

    /// Completion without touching the weekly cache; a stop refreshes it
    /// once at the end.
    pub(super) fn mark_task_complete(&self, id: &str) -> Result<(Task, bool)> {
        let now = self.now();
        self.modify_task(id, |task| Ok(task.complete(now)))
    }

    pub fn reopen_task(&self, id: &str) -> Result<Task> {
        let (task, changed) = self.modify_task(id, |task| Ok(task.reopen()))?;
        if changed {
            self.sync_weekly_cache();
        }
        Ok(task)
    }

    pub fn delete_task(&self, id: &str) -> Result<()> {
        let mut tasks: Vec<Task> = self.load_for_update(Slot::Tasks)?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(task_not_found(id));
        }
        self.repo.save(Slot::Tasks, &tasks)?;
        self.sync_weekly_cache();
        Ok(())
    }

    /// Apply `f` to one task and save. Skips the write when `f` reports no
    /// change.
    fn modify_task<F>(&self, id: &str, f: F) -> Result<(Task, bool)>
    where
        F: FnOnce(&mut Task) -> Result<bool>,
    {
        let mut tasks: Vec<Task> = self.load_for_update(Slot::Tasks)?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| task_not_found(id))?;
        let changed = f(task)?;
        let updated = task.clone();
        if changed {
            self.repo.save(Slot::Tasks, &tasks)?;
        }
        Ok((updated, changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::Difficulty;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn tracker() -> StudyTracker<MemoryStore, ManualClock> {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap());
        StudyTracker::new(MemoryStore::new(), clock)
    }

    #[test]
    fn goal_crud() {
        let t = tracker();
        let goal = t
            .create_goal(NewGoal::named("Rust").with_hours(5.0))
            .unwrap();
        assert_eq!(t.goals().len(), 1);

        let updated = t
            .update_goal(
                &goal.id,
                GoalPatch {
                    name: Some("Rust book".into()),
                    ..GoalPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Rust book");
        assert_eq!(updated.weekly_hour_goal, Some(5.0));

        t.archive_goal(&goal.id).unwrap();
        assert!(t.active_goals().is_empty());
        assert_eq!(t.goals().len(), 1);
        t.unarchive_goal(&goal.id).unwrap();
        assert_eq!(t.active_goals().len(), 1);

        assert!(matches!(
            t.update_goal("nope", GoalPatch::default()),
            Err(CoreError::NotFound { entity: "goal", .. })
        ));
    }

    #[test]
    fn invalid_patch_leaves_goal_untouched() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        let err = t.update_goal(
            &goal.id,
            GoalPatch {
                name: Some("  ".into()),
                ..GoalPatch::default()
            },
        );
        assert!(matches!(err, Err(CoreError::Validation(_))));
        assert_eq!(t.goal(&goal.id).unwrap().name, "Rust");
    }

    #[test]
    fn delete_goal_cascades_to_tasks_only() {
        let t = tracker();
        let keep = t.create_goal(NewGoal::named("Keep")).unwrap();
        let gone = t.create_goal(NewGoal::named("Gone")).unwrap();
        t.create_task(NewTask::new(&keep.id, "a")).unwrap();
        t.create_task(NewTask::new(&gone.id, "b")).unwrap();
        t.create_task(NewTask::new(&gone.id, "c")).unwrap();

        assert_eq!(t.delete_goal(&gone.id).unwrap(), 2);
        assert_eq!(t.goals().len(), 1);
        assert_eq!(t.tasks().len(), 1);
        assert!(t.delete_goal(&gone.id).is_err());
    }

    #[test]
    fn task_lifecycle() {
        let t = tracker();
        let goal = t.create_goal(NewGoal::named("Rust")).unwrap();
        assert!(t.create_task(NewTask::new("missing", "x")).is_err());

        let task = t
            .create_task(NewTask::new(&goal.id, "ch1").with_difficulty(Difficulty::Hard))
            .unwrap();
        let (done, changed) = t.complete_task(&task.id).unwrap();
        assert!(changed);
        let first_done_at = done.completed_at;
        assert!(first_done_at.is_some());

        t.clock().advance_secs(60);
        let (again, changed) = t.complete_task(&task.id).unwrap();
        assert!(!changed);
        assert_eq!(again.completed_at, first_done_at);

        let reopened = t.reopen_task(&task.id).unwrap();
        assert!(!reopened.completed);
        assert!(reopened.completed_at.is_none());

        let renamed = t
            .update_task(
                &task.id,
                TaskPatch {
                    name: Some("chapter 1".into()),
                    difficulty: None,
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "chapter 1");
        assert_eq!(renamed.difficulty, Difficulty::Hard);

        t.delete_task(&task.id).unwrap();
        assert!(t.tasks_for_goal(&goal.id).is_empty());
        assert!(t.delete_task(&task.id).is_err());
    }

    #[test]
    fn unreadable_slot_is_not_overwritten() {
        let t = tracker();
        t.create_goal(NewGoal::named("Rust")).unwrap();
        t.repository().store().fail_reads(true);
        assert!(t.create_goal(NewGoal::named("Go")).is_err());
        assert!(t.goals().is_empty());
        t.repository().store().fail_reads(false);
        assert_eq!(t.goals().len(), 1);
    }
}
