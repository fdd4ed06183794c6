//! Day records: one study assignment and its progress per calendar date.
//!
//! The date is the key in the store, not a field of the record. Field names
//! serialize in camelCase so schedules produced by the external generator
//! can be imported as-is.

mod progress;

pub use progress::{
    completion_percentage, merge_progress, validate_record, DayPatch, ProgressPatch,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::ProgressHistory;

/// Free-form notes attached to a day. Opaque to the reset engine.
pub type Notes = serde_json::Map<String, serde_json::Value>;

/// Completion counters for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(default)]
    pub tasks_completed: u32,
    /// Task count captured at the last reset. Zero until the first reset.
    #[serde(default)]
    pub total_tasks: u32,
    #[serde(default)]
    pub actual_hours: f64,
    #[serde(default)]
    pub completion_percentage: u32,
}

impl Progress {
    /// Zeroed progress for a day with `total_tasks` tasks.
    pub fn cleared(total_tasks: u32) -> Self {
        Self {
            tasks_completed: 0,
            total_tasks,
            actual_hours: 0.0,
            completion_percentage: 0,
        }
    }
}

/// All state associated with one calendar date's study plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    #[serde(default)]
    pub week: u32,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub subject: String,
    /// Insertion order is display and completion order.
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub planned_hours: f64,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default)]
    pub notes: Notes,
    #[serde(default)]
    pub progress_history: ProgressHistory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reset_date: Option<DateTime<Utc>>,
}

impl DayRecord {
    pub fn new(subject: impl Into<String>, tasks: Vec<String>, planned_hours: f64) -> Self {
        Self {
            subject: subject.into(),
            tasks,
            planned_hours,
            ..Default::default()
        }
    }

    pub fn with_week(mut self, week: u32, month: impl Into<String>) -> Self {
        self.week = week;
        self.month = month.into();
        self
    }

    pub fn task_count(&self) -> u32 {
        u32::try_from(self.tasks.len()).unwrap_or(u32::MAX)
    }

    pub fn is_complete(&self) -> bool {
        self.progress.completion_percentage == 100
    }
}
