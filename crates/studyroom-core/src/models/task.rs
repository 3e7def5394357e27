use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Task difficulty; feeds the completion bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("invalid difficulty: {other}")),
        }
    }
}

/// A unit of work under a goal.
///
/// `completed_at` is set if and only if `completed` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub goal_id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        goal_id: impl Into<String>,
        name: impl Into<String>,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::invalid("name", "must not be empty"));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            goal_id: goal_id.into(),
            name: name.trim().to_string(),
            completed: false,
            completed_at: None,
            difficulty,
            created_at: now,
        })
    }

    /// Mark completed. Returns false if it already was; the original
    /// completion time is kept.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(now);
        true
    }

    /// Undo completion. Returns false if the task was not completed.
    pub fn reopen(&mut self) -> bool {
        if !self.completed {
            return false;
        }
        self.completed = false;
        self.completed_at = None;
        true
    }

    pub fn apply(&mut self, patch: TaskPatch) -> Result<(), ValidationError> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(ValidationError::invalid("name", "must not be empty"));
            }
            self.name = name.trim().to_string();
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        Ok(())
    }
}

/// Input for creating a task under an existing goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub goal_id: String,
    pub name: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl NewTask {
    pub fn new(goal_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            goal_id: goal_id.into(),
            name: name.into(),
            difficulty: Difficulty::default(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn into_task(self, now: DateTime<Utc>) -> Result<Task, ValidationError> {
        Task::new(self.goal_id, self.name, self.difficulty, now)
    }
}

/// Updatable task fields. Completion goes through [`Task::complete`] /
/// [`Task::reopen`] so the timestamp invariant holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub difficulty: Option<Difficulty>,
}
