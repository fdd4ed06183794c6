pub mod config;
pub mod day;
pub mod reset;
pub mod stats;
pub mod watch;

use studyplan_core::{Config, EngineSettings, ResetEngine, SqliteStore};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open the persisted store and build an engine configured from disk.
pub fn open_engine() -> CliResult<ResetEngine<SqliteStore>> {
    let config = Config::load()?;
    let store = SqliteStore::open_default()?;
    Ok(ResetEngine::with_settings(
        store,
        studyplan_core::SystemClock,
        EngineSettings::from(&config),
    ))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
