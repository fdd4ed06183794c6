//! # Studyplan Core Library
//!
//! Core logic for the Studyplan study planner: a calendar of daily study
//! assignments whose progress is rolled into history once per calendar day.
//! The `studyplan` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Schedule**: day records keyed by date, and typed partial updates
//!   that keep the completion percentage consistent
//! - **Reset Engine**: a clock-driven state machine that archives a day's
//!   progress and zeroes it, at most once per day
//! - **History**: bounded snapshot and audit logs
//! - **Stats**: streak, efficiency and summary metrics
//! - **Storage**: SQLite key-value persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`ResetEngine`]: reset state machine and error boundary
//! - [`SqliteStore`]: persisted schedule and reset aggregate
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod history;
pub mod notification;
pub mod reset;
pub mod schedule;
pub mod stats;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ResetError, ValidationError};
pub use history::{
    BoundedLog, ProgressSnapshot, ResetAuditRecord, ResetStatus, PROGRESS_HISTORY_CAP,
    RESET_HISTORY_CAP,
};
pub use notification::{Notification, NotificationEmitter, NotificationKind};
pub use reset::{
    CheckOutcome, EnginePhase, EngineSettings, ResetEngine, ResetOutcome, ResetSystemState,
};
pub use schedule::{DayPatch, DayRecord, Notes, Progress, ProgressPatch};
pub use stats::{compute_streak, efficiency, ProgressSummary, StreakPolicy};
pub use storage::{Config, Database, DayRecordStore, MemoryStore, ResetStateStore, SqliteStore};
