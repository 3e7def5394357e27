use clap::Subcommand;
use studyroom_core::{Difficulty, NewTask, TaskPatch};

use super::{open_tracker, print_json, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task under a goal
    Add {
        /// Goal ID
        goal_id: String,
        /// Task name
        name: String,
        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
    },
    /// List tasks
    List {
        /// Only tasks of this goal
        #[arg(long)]
        goal: Option<String>,
        /// Hide completed tasks
        #[arg(long)]
        open: bool,
    },
    /// Rename a task or change its difficulty
    Update {
        /// Task ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Mark a task as done
    Done {
        /// Task ID
        id: String,
    },
    /// Mark a done task as open again
    Reopen {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CliResult {
    let (tracker, _) = open_tracker()?;

    match action {
        TaskAction::Add {
            goal_id,
            name,
            difficulty,
        } => {
            let task = tracker
                .create_task(NewTask::new(goal_id, name).with_difficulty(difficulty))?;
            print_json(&task)?;
        }
        TaskAction::List { goal, open } => {
            let mut tasks = match goal {
                Some(goal_id) => tracker.tasks_for_goal(&goal_id),
                None => tracker.tasks(),
            };
            if open {
                tasks.retain(|t| !t.completed);
            }
            print_json(&tasks)?;
        }
        TaskAction::Update {
            id,
            name,
            difficulty,
        } => {
            print_json(&tracker.update_task(&id, TaskPatch { name, difficulty })?)?;
        }
        TaskAction::Done { id } => {
            let (task, _) = tracker.complete_task(&id)?;
            print_json(&task)?;
        }
        TaskAction::Reopen { id } => {
            print_json(&tracker.reopen_task(&id)?)?;
        }
        TaskAction::Delete { id } => {
            tracker.delete_task(&id)?;
            print_json(&serde_json::json!({ "deleted": id }))?;
        }
    }
    Ok(())
}
