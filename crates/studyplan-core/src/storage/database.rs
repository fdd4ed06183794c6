//! SQLite-backed persistence.
//!
//! The planner state is two JSON blobs in a key-value table:
//! - `schedule`: map of date -> day record
//! - `resetSystemState`: the reset engine's aggregate
//!
//! Both are loaded once when the store opens and rewritten in full after
//! every mutation. A reset commit writes both blobs in one transaction.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

use super::{data_dir, DayRecordStore, ResetStateStore};
use crate::error::{CoreError, DatabaseError, Result};
use crate::reset::ResetSystemState;
use crate::schedule::{validate_record, DayRecord};

pub const SCHEDULE_KEY: &str = "schedule";
pub const RESET_STATE_KEY: &str = "resetSystemState";

/// SQLite database holding the planner's key-value blobs.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/studyplan.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("studyplan.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Set several values atomically.
    pub fn kv_set_all(&mut self, entries: &[(&str, &str)]) -> Result<(), rusqlite::Error> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()
    }

    fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.kv_get(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| {
                DatabaseError::Corrupt {
                    key: key.to_string(),
                    source,
                }
                .into()
            }),
            None => Ok(T::default()),
        }
    }
}

/// Day record store over [`Database`], with the whole state cached in memory.
pub struct SqliteStore {
    db: Database,
    schedule: BTreeMap<NaiveDate, DayRecord>,
    reset_state: ResetSystemState,
}

impl SqliteStore {
    /// Load both blobs from `db`.
    ///
    /// # Errors
    /// Returns an error if a stored blob cannot be read or decoded.
    pub fn open(db: Database) -> Result<Self> {
        let schedule = db.load_json(SCHEDULE_KEY)?;
        let reset_state = db.load_json(RESET_STATE_KEY)?;
        Ok(Self {
            db,
            schedule,
            reset_state,
        })
    }

    /// Open the default on-disk database.
    pub fn open_default() -> Result<Self> {
        Self::open(Database::open()?)
    }

    pub fn schedule(&self) -> &BTreeMap<NaiveDate, DayRecord> {
        &self.schedule
    }

    /// Insert many records with a single write. Existing dates are kept
    /// unless `overwrite` is set. Returns the number of records written.
    ///
    /// # Errors
    /// Every incoming record is validated first; one out-of-range record
    /// rejects the whole import and nothing is written.
    pub fn import(
        &mut self,
        records: BTreeMap<NaiveDate, DayRecord>,
        overwrite: bool,
    ) -> Result<usize> {
        for (date, record) in &records {
            validate_record(record).map_err(|e| CoreError::Custom(format!("{date}: {e}")))?;
        }

        let mut next = self.schedule.clone();
        let mut written = 0;
        for (date, record) in records {
            if overwrite || !next.contains_key(&date) {
                next.insert(date, record);
                written += 1;
            }
        }
        let raw = serde_json::to_string(&next)?;
        self.db.kv_set(SCHEDULE_KEY, &raw)?;
        self.schedule = next;
        Ok(written)
    }

    fn write_schedule(&self, schedule: &BTreeMap<NaiveDate, DayRecord>) -> Result<()> {
        let raw = serde_json::to_string(schedule)?;
        self.db.kv_set(SCHEDULE_KEY, &raw)?;
        Ok(())
    }
}

impl DayRecordStore for SqliteStore {
    fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.schedule.get(&date)
    }

    fn all_dates(&self) -> Vec<NaiveDate> {
        self.schedule.keys().copied().collect()
    }

    fn put(&mut self, date: NaiveDate, record: DayRecord) -> Result<()> {
        let previous = self.schedule.insert(date, record);
        if let Err(e) = self.write_schedule(&self.schedule) {
            match previous {
                Some(old) => self.schedule.insert(date, old),
                None => self.schedule.remove(&date),
            };
            return Err(e);
        }
        Ok(())
    }
}

impl ResetStateStore for SqliteStore {
    fn reset_state(&self) -> ResetSystemState {
        self.reset_state.clone()
    }

    fn save_reset_state(&mut self, state: &ResetSystemState) -> Result<()> {
        let raw = serde_json::to_string(state)?;
        self.db.kv_set(RESET_STATE_KEY, &raw)?;
        self.reset_state = state.clone();
        Ok(())
    }

    fn commit_reset(
        &mut self,
        date: NaiveDate,
        record: DayRecord,
        state: &ResetSystemState,
    ) -> Result<()> {
        let mut next = self.schedule.clone();
        next.insert(date, record);
        let schedule_raw = serde_json::to_string(&next)?;
        let state_raw = serde_json::to_string(state)?;
        self.db.kv_set_all(&[
            (SCHEDULE_KEY, schedule_raw.as_str()),
            (RESET_STATE_KEY, state_raw.as_str()),
        ])?;
        self.schedule = next;
        self.reset_state = state.clone();
        Ok(())
    }
}
