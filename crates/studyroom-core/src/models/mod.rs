//! Persistent entities: goals, tasks, completed sessions and the
//! gamification totals.

mod gamification;
mod goal;
mod session;
mod task;

pub use gamification::Gamification;
pub use goal::{Goal, GoalCategory, GoalPatch, NewGoal};
pub use session::{Session, SessionMode};
pub use task::{Difficulty, NewTask, Task, TaskPatch};
