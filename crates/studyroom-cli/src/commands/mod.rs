pub mod config;
pub mod goal;
pub mod points;
pub mod session;
pub mod stats;
pub mod task;

use serde::Serialize;
use studyroom_core::{Config, Database, StudyTracker, SystemClock};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type Tracker = StudyTracker<Database, SystemClock>;

/// Open the default database with settings from the config file.
pub fn open_tracker() -> Result<(Tracker, Config), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let tracker = StudyTracker::with_config(db, SystemClock, &config);
    Ok((tracker, config))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
