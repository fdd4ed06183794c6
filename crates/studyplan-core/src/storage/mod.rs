mod config;
pub mod database;
mod memory;

pub use config::{Config, NotificationsConfig, ResetConfig};
pub use database::{Database, SqliteStore, RESET_STATE_KEY, SCHEDULE_KEY};
pub use memory::MemoryStore;

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::reset::ResetSystemState;
use crate::schedule::{merge_progress, DayPatch, DayRecord};

/// Returns the data directory.
///
/// `STUDYPLAN_DATA_DIR` wins when set. Otherwise `~/.config/studyplan[-dev]/`
/// based on `STUDYPLAN_ENV` (set it to `dev` for the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("STUDYPLAN_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyplan-dev")
            } else {
                base_dir.join("studyplan")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Calendar date -> day record mapping.
pub trait DayRecordStore {
    fn get(&self, date: NaiveDate) -> Option<&DayRecord>;

    /// All dates with a record, ascending.
    fn all_dates(&self) -> Vec<NaiveDate>;

    /// Insert or replace the record for `date`.
    fn put(&mut self, date: NaiveDate, record: DayRecord) -> Result<()>;

    /// Merge `patch` into the record for `date`, creating it if absent.
    fn merge_update(&mut self, date: NaiveDate, patch: &DayPatch) -> Result<()> {
        let merged = merge_progress(self.get(date), patch)?;
        self.put(date, merged)
    }
}

/// A day record store that also persists the reset engine's aggregate.
pub trait ResetStateStore: DayRecordStore {
    /// The aggregate as last persisted (default when never written).
    fn reset_state(&self) -> ResetSystemState;

    fn save_reset_state(&mut self, state: &ResetSystemState) -> Result<()>;

    /// Write a reset day record and the updated aggregate together. Either
    /// both land or neither does.
    fn commit_reset(
        &mut self,
        date: NaiveDate,
        record: DayRecord,
        state: &ResetSystemState,
    ) -> Result<()>;
}
