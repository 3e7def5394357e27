use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Class,
    Coding,
    Work,
    Personal,
    #[default]
    Other,
}

impl std::str::FromStr for GoalCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "class" => Ok(GoalCategory::Class),
            "coding" => Ok(GoalCategory::Coding),
            "work" => Ok(GoalCategory::Work),
            "personal" => Ok(GoalCategory::Personal),
            "other" => Ok(GoalCategory::Other),
            other => Err(format!("invalid goal category: {other}")),
        }
    }
}

/// A tracked objective with optional weekly hour and task targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: GoalCategory,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub track_hours: bool,
    #[serde(default)]
    pub weekly_hour_goal: Option<f64>,
    #[serde(default)]
    pub track_tasks: bool,
    #[serde(default)]
    pub weekly_task_goal: Option<u32>,
    #[serde(default = "default_task_unit")]
    pub task_unit: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
}

fn default_task_unit() -> String {
    "tasks".to_string()
}

impl Goal {
    /// Hour target, if hour tracking is on and a positive target is set.
    pub fn hour_target(&self) -> Option<f64> {
        if !self.track_hours {
            return None;
        }
        self.weekly_hour_goal.filter(|h| *h > 0.0)
    }

    /// Task target, if task tracking is on and a positive target is set.
    pub fn task_target(&self) -> Option<u32> {
        if !self.track_tasks {
            return None;
        }
        self.weekly_task_goal.filter(|t| *t > 0)
    }

    /// Apply a validated patch.
    pub fn apply(&mut self, patch: GoalPatch) -> Result<(), ValidationError> {
        patch.validate()?;
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(track_hours) = patch.track_hours {
            self.track_hours = track_hours;
        }
        if let Some(goal) = patch.weekly_hour_goal {
            self.weekly_hour_goal = goal;
        }
        if let Some(track_tasks) = patch.track_tasks {
            self.track_tasks = track_tasks;
        }
        if let Some(goal) = patch.weekly_task_goal {
            self.weekly_task_goal = goal;
        }
        if let Some(unit) = patch.task_unit {
            self.task_unit = unit;
        }
        Ok(())
    }
}

/// Input for creating a goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGoal {
    pub name: String,
    #[serde(default)]
    pub category: GoalCategory,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub weekly_hour_goal: Option<f64>,
    #[serde(default)]
    pub weekly_task_goal: Option<u32>,
    #[serde(default)]
    pub task_unit: Option<String>,
}

impl NewGoal {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.weekly_hour_goal = Some(hours);
        self
    }

    pub fn with_tasks(mut self, tasks: u32) -> Self {
        self.weekly_task_goal = Some(tasks);
        self
    }

    /// Build the goal. Tracking flags follow from which targets are present.
    pub fn into_goal(self, now: DateTime<Utc>) -> Result<Goal, ValidationError> {
        validate_name(&self.name)?;
        validate_hours(self.weekly_hour_goal)?;
        validate_tasks(self.weekly_task_goal)?;
        Ok(Goal {
            id: Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            category: self.category,
            icon: self.icon,
            color: self.color,
            track_hours: self.weekly_hour_goal.is_some(),
            weekly_hour_goal: self.weekly_hour_goal,
            track_tasks: self.weekly_task_goal.is_some(),
            weekly_task_goal: self.weekly_task_goal,
            task_unit: self.task_unit.unwrap_or_else(default_task_unit),
            created_at: now,
            archived: false,
        })
    }
}

/// Updatable goal fields. `None` leaves a field untouched; the doubly
/// optional targets use `Some(None)` to clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub category: Option<GoalCategory>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub track_hours: Option<bool>,
    pub weekly_hour_goal: Option<Option<f64>>,
    pub track_tasks: Option<bool>,
    pub weekly_task_goal: Option<Option<u32>>,
    pub task_unit: Option<String>,
}

impl GoalPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(hours) = self.weekly_hour_goal {
            validate_hours(hours)?;
        }
        if let Some(tasks) = self.weekly_task_goal {
            validate_tasks(tasks)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::invalid("name", "must not be empty"));
    }
    Ok(())
}

fn validate_hours(hours: Option<f64>) -> Result<(), ValidationError> {
    match hours {
        Some(h) if !h.is_finite() || h <= 0.0 => Err(ValidationError::invalid(
            "weekly_hour_goal",
            format!("must be a positive number, got {h}"),
        )),
        _ => Ok(()),
    }
}

fn validate_tasks(tasks: Option<u32>) -> Result<(), ValidationError> {
    match tasks {
        Some(0) => Err(ValidationError::invalid(
            "weekly_task_goal",
            "must be a positive integer",
        )),
        _ => Ok(()),
    }
}
