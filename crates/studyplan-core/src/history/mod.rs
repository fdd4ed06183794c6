//! History ledger: per-day progress snapshots and the global reset audit log.
//!
//! Both are bounded FIFO logs built on [`BoundedLog`].

mod bounded;

pub use bounded::BoundedLog;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ResetError;
use crate::schedule::DayRecord;

/// Snapshots kept per day record.
pub const PROGRESS_HISTORY_CAP: usize = 30;
/// Audit records kept in the global reset log.
pub const RESET_HISTORY_CAP: usize = 10;

pub type ProgressHistory = BoundedLog<ProgressSnapshot, PROGRESS_HISTORY_CAP>;
pub type ResetHistory = BoundedLog<ResetAuditRecord, RESET_HISTORY_CAP>;

/// Pre-reset state of a day, captured once per reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub date: NaiveDate,
    pub completion_percentage: u32,
    pub tasks_completed: u32,
    pub total_tasks: u32,
    pub actual_hours: f64,
    pub planned_hours: f64,
    pub subject: String,
    pub streak: u32,
    pub efficiency: u32,
    pub timestamp: DateTime<Utc>,
}

impl ProgressSnapshot {
    pub fn capture(
        date: NaiveDate,
        record: &DayRecord,
        streak: u32,
        efficiency: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            completion_percentage: record.progress.completion_percentage,
            tasks_completed: record.progress.tasks_completed,
            total_tasks: record.task_count(),
            actual_hours: record.progress.actual_hours,
            planned_hours: record.planned_hours,
            subject: record.subject.clone(),
            streak,
            efficiency,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetStatus {
    Success,
    Error,
}

/// One reset attempt, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetAuditRecord {
    pub date: NaiveDate,
    pub status: ResetStatus,
    pub previous_progress: Option<ProgressSnapshot>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ResetAuditRecord {
    pub fn success(snapshot: ProgressSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            date: snapshot.date,
            status: ResetStatus::Success,
            previous_progress: Some(snapshot),
            timestamp,
            error_message: None,
        }
    }

    pub fn failure(date: NaiveDate, error: &ResetError, timestamp: DateTime<Utc>) -> Self {
        Self {
            date,
            status: ResetStatus::Error,
            previous_progress: None,
            timestamp,
            error_message: Some(error.to_string()),
        }
    }
}
