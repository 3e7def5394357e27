use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use studyroom_core::{Clock, ManualSession, PomodoroConfig, SessionMode, StopOptions};

use super::{open_tracker, print_json, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start timing a goal
    Start {
        /// Goal ID
        goal_id: String,
        /// Task worked on during the session
        #[arg(long)]
        task: Option<String>,
        /// timer or pomodoro
        #[arg(long, default_value = "timer")]
        mode: SessionMode,
        /// Pomodoro work minutes (defaults from config)
        #[arg(long)]
        work: Option<u32>,
        /// Pomodoro short break minutes (defaults from config)
        #[arg(long)]
        short_break: Option<u32>,
    },
    /// Pause the running session
    Pause,
    /// Resume the paused session
    Resume,
    /// Stop and record the session
    Stop {
        #[arg(long, default_value = "")]
        notes: String,
        /// Mark the session's task as done
        #[arg(long)]
        complete_task: bool,
    },
    /// Discard the session without recording it
    Cancel,
    /// Print the active session, points and streak as JSON
    Status,
    /// Print elapsed time every tick
    Watch {
        /// Stop after this many ticks (default: until the session ends)
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Record a session after the fact
    Log {
        /// Goal ID
        goal_id: String,
        /// Length in minutes
        #[arg(long)]
        minutes: u64,
        /// RFC 3339 start time (default: `minutes` ago)
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        task: Option<String>,
        /// The task was finished in this session
        #[arg(long)]
        task_completed: bool,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Count one finished pomodoro
    Pomodoro,
}

pub fn run(action: SessionAction) -> CliResult {
    let (tracker, config) = open_tracker()?;

    match action {
        SessionAction::Start {
            goal_id,
            task,
            mode,
            work,
            short_break,
        } => {
            let pomodoro = if work.is_some() || short_break.is_some() {
                let defaults = config.pomodoro();
                Some(PomodoroConfig {
                    work_minutes: work.unwrap_or(defaults.work_minutes),
                    short_break_minutes: short_break.unwrap_or(defaults.short_break_minutes),
                    ..defaults
                })
            } else {
                None
            };
            let event = tracker.begin(&goal_id, task.as_deref(), mode, pomodoro)?;
            print_json(&event)?;
        }
        SessionAction::Pause => {
            print_json(&tracker.pause()?)?;
        }
        SessionAction::Resume => {
            print_json(&tracker.resume()?)?;
        }
        SessionAction::Stop {
            notes,
            complete_task,
        } => {
            let outcome = tracker.stop(StopOptions {
                notes,
                complete_task,
            })?;
            print_json(&outcome)?;
        }
        SessionAction::Cancel => {
            print_json(&tracker.cancel()?)?;
        }
        SessionAction::Status => {
            print_json(&tracker.status())?;
        }
        SessionAction::Watch { ticks } => {
            let interval = Duration::from_secs(config.timer.tick_secs.max(1));
            let mut tick = 0u64;
            loop {
                tick += 1;
                // Re-read on every tick; nothing is carried between ticks.
                let active = tracker.status().active;
                let line = serde_json::json!({
                    "tick": tick,
                    "active": active.is_some(),
                    "state": active.as_ref().map(|a| a.state),
                    "elapsed_secs": active.as_ref().map(|a| a.elapsed_secs),
                    "elapsed_display": active.as_ref().map(|a| a.elapsed_display.clone()),
                    "pomodoro_phase": active.as_ref().and_then(|a| a.pomodoro_phase),
                });
                println!("{line}");

                let done = match ticks {
                    Some(limit) => tick >= limit,
                    None => active.is_none(),
                };
                if done {
                    break;
                }
                std::thread::sleep(interval);
            }
        }
        SessionAction::Log {
            goal_id,
            minutes,
            start,
            task,
            task_completed,
            notes,
        } => {
            let duration_secs = minutes.saturating_mul(60);
            let start = match start {
                Some(start) => start,
                None => {
                    let minutes = i64::try_from(minutes)?;
                    tracker.clock().now() - chrono::Duration::minutes(minutes)
                }
            };
            let outcome = tracker.log_manual_session(ManualSession {
                goal_id,
                task_id: task,
                start,
                duration_secs,
                task_completed,
                notes,
            })?;
            print_json(&outcome)?;
        }
        SessionAction::Pomodoro => {
            let count = tracker.record_pomodoro()?;
            print_json(&serde_json::json!({ "pomodoros_completed": count }))?;
        }
    }
    Ok(())
}
