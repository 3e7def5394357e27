use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Work,
    ShortBreak,
    LongBreak,
}

/// Pomodoro cycle lengths, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    #[serde(default = "default_work")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    #[serde(default = "default_cycles")]
    pub cycles_before_long_break: u32,
}

fn default_work() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_cycles() -> u32 {
    4
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            cycles_before_long_break: default_cycles(),
        }
    }
}

/// Where in the cycle a given amount of elapsed time lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroPhase {
    pub kind: PhaseKind,
    /// 1-based pomodoro number this phase belongs to.
    pub cycle: u32,
    pub remaining_secs: u64,
    /// Work phases fully finished so far.
    pub work_cycles_done: u32,
}

impl PomodoroConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.work_minutes == 0 {
            return Err(ValidationError::invalid("work_minutes", "must be at least 1"));
        }
        if self.cycles_before_long_break == 0 {
            return Err(ValidationError::invalid(
                "cycles_before_long_break",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    fn work_secs(&self) -> u64 {
        u64::from(self.work_minutes.max(1)) * 60
    }

    fn break_secs(&self, kind: PhaseKind) -> u64 {
        match kind {
            PhaseKind::LongBreak => u64::from(self.long_break_minutes) * 60,
            _ => u64::from(self.short_break_minutes) * 60,
        }
    }

    fn cycles(&self) -> u32 {
        self.cycles_before_long_break.max(1)
    }

    /// Seconds in one full round ending with a long break.
    pub fn round_secs(&self) -> u64 {
        let n = u64::from(self.cycles());
        n * self.work_secs()
            + (n - 1) * self.break_secs(PhaseKind::ShortBreak)
            + self.break_secs(PhaseKind::LongBreak)
    }

    /// Phase at `elapsed_secs` into the session. Derived purely from elapsed
    /// time, so it survives restarts like the elapsed counter does.
    pub fn phase_at(&self, elapsed_secs: u64) -> PomodoroPhase {
        let n = self.cycles();
        let round = self.round_secs();
        let rounds_done = (elapsed_secs / round) as u32;
        let mut offset = elapsed_secs % round;

        for i in 0..n {
            let cycle = rounds_done * n + i + 1;
            let work = self.work_secs();
            if offset < work {
                return PomodoroPhase {
                    kind: PhaseKind::Work,
                    cycle,
                    remaining_secs: work - offset,
                    work_cycles_done: cycle - 1,
                };
            }
            offset -= work;

            let kind = if i + 1 == n {
                PhaseKind::LongBreak
            } else {
                PhaseKind::ShortBreak
            };
            let pause = self.break_secs(kind);
            if offset < pause {
                return PomodoroPhase {
                    kind,
                    cycle,
                    remaining_secs: pause - offset,
                    work_cycles_done: cycle,
                };
            }
            offset -= pause;
        }

        // offset < round guarantees a return above; land on the next work phase.
        let cycle = (rounds_done + 1) * n + 1;
        PomodoroPhase {
            kind: PhaseKind::Work,
            cycle,
            remaining_secs: self.work_secs(),
            work_cycles_done: cycle - 1,
        }
    }
}
