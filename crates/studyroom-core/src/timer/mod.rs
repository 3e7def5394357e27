mod active;
mod engine;
mod pomodoro;

pub use active::ActiveSession;
pub use engine::{FinishedSession, SessionEngine, TimerState};
pub use pomodoro::{PhaseKind, PomodoroConfig, PomodoroPhase};
