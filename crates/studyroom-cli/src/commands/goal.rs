use clap::Subcommand;
use studyroom_core::{GoalCategory, GoalPatch, NewGoal};

use super::{open_tracker, print_json, CliResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a goal
    Add {
        /// Goal name
        name: String,
        /// class, coding, work, personal or other
        #[arg(long, default_value = "other")]
        category: GoalCategory,
        /// Weekly hour target
        #[arg(long)]
        hours: Option<f64>,
        /// Weekly task target
        #[arg(long)]
        tasks: Option<u32>,
        /// Label for tasks, e.g. "assignments"
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, default_value = "")]
        icon: String,
        #[arg(long, default_value = "")]
        color: String,
    },
    /// List goals with this week's progress
    List {
        /// Include archived goals (without progress)
        #[arg(long)]
        all: bool,
    },
    /// Update goal fields
    Update {
        /// Goal ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<GoalCategory>,
        #[arg(long)]
        hours: Option<f64>,
        /// Remove the weekly hour target
        #[arg(long, conflicts_with = "hours")]
        no_hours: bool,
        #[arg(long)]
        tasks: Option<u32>,
        /// Remove the weekly task target
        #[arg(long, conflicts_with = "tasks")]
        no_tasks: bool,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Hide a goal from aggregation
    Archive {
        /// Goal ID
        id: String,
    },
    /// Restore an archived goal
    Unarchive {
        /// Goal ID
        id: String,
    },
    /// Delete a goal and its tasks (sessions are kept)
    Delete {
        /// Goal ID
        id: String,
    },
}

pub fn run(action: GoalAction) -> CliResult {
    let (tracker, _) = open_tracker()?;

    match action {
        GoalAction::Add {
            name,
            category,
            hours,
            tasks,
            unit,
            icon,
            color,
        } => {
            let goal = tracker.create_goal(NewGoal {
                name,
                category,
                icon,
                color,
                weekly_hour_goal: hours,
                weekly_task_goal: tasks,
                task_unit: unit,
            })?;
            print_json(&goal)?;
        }
        GoalAction::List { all } => {
            if all {
                print_json(&tracker.goals())?;
            } else {
                print_json(&tracker.goal_summaries())?;
            }
        }
        GoalAction::Update {
            id,
            name,
            category,
            hours,
            no_hours,
            tasks,
            no_tasks,
            unit,
            icon,
            color,
        } => {
            let weekly_hour_goal = if no_hours { Some(None) } else { hours.map(Some) };
            let weekly_task_goal = if no_tasks { Some(None) } else { tasks.map(Some) };
            let patch = GoalPatch {
                name,
                category,
                icon,
                color,
                track_hours: weekly_hour_goal.map(|h| h.is_some()),
                weekly_hour_goal,
                track_tasks: weekly_task_goal.map(|t| t.is_some()),
                weekly_task_goal,
                task_unit: unit,
            };
            print_json(&tracker.update_goal(&id, patch)?)?;
        }
        GoalAction::Archive { id } => {
            print_json(&tracker.archive_goal(&id)?)?;
        }
        GoalAction::Unarchive { id } => {
            print_json(&tracker.unarchive_goal(&id)?)?;
        }
        GoalAction::Delete { id } => {
            let tasks_removed = tracker.delete_goal(&id)?;
            print_json(&serde_json::json!({
                "deleted": id,
                "tasks_removed": tasks_removed,
            }))?;
        }
    }
    Ok(())
}
