//! Persistence collaborator.
//!
//! The core only needs get/set/remove against a handful of named slots.
//! [`Database`] backs them with SQLite, [`MemoryStore`] keeps them in a map,
//! and [`Repository`] layers typed JSON access with safe-default reads on top.

mod config;
pub mod database;
mod memory;
mod repository;

pub use config::{Config, LoggingConfig, TimerConfig, TrackingConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use repository::Repository;

use std::fmt;
use std::path::PathBuf;

use crate::error::StorageError;

/// Named storage slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Goals,
    Tasks,
    Sessions,
    ActiveSession,
    Gamification,
    WeeklyProgress,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Goals,
        Slot::Tasks,
        Slot::Sessions,
        Slot::ActiveSession,
        Slot::Gamification,
        Slot::WeeklyProgress,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Slot::Goals => "goals",
            Slot::Tasks => "tasks",
            Slot::Sessions => "sessions",
            Slot::ActiveSession => "active_session",
            Slot::Gamification => "gamification",
            Slot::WeeklyProgress => "weekly_progress",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw key-value access. Values are opaque strings (JSON in practice).
pub trait Store {
    fn get(&self, slot: Slot) -> Result<Option<String>, StorageError>;
    fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError>;
    fn remove(&self, slot: Slot) -> Result<(), StorageError>;
}

impl<S: Store + ?Sized> Store for &S {
    fn get(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        (**self).get(slot)
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError> {
        (**self).set(slot, value)
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        (**self).remove(slot)
    }
}

/// Returns the data directory.
///
/// `STUDYROOM_DATA_DIR` wins if set; otherwise `~/.config/studyroom[-dev]/`,
/// with `STUDYROOM_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("STUDYROOM_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyroom-dev")
            } else {
                base_dir.join("studyroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
