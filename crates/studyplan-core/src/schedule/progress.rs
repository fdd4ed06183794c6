//! Typed partial updates for day records.
//!
//! Top-level fields are replaced wholesale when present. The `progress`
//! sub-record merges field by field, and the completion percentage is
//! recomputed only when the merged `tasks_completed` differs from the prior
//! value. Reset bookkeeping (`progress_history`, `last_reset_date`) is never
//! touched here.

use serde::{Deserialize, Serialize};

use super::{DayRecord, Notes};
use crate::error::{Result, ValidationError};

/// Field-level update of a day's progress counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_completed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,
}

impl ProgressPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks_completed(mut self, count: u32) -> Self {
        self.tasks_completed = Some(count);
        self
    }

    pub fn actual_hours(mut self, hours: f64) -> Self {
        self.actual_hours = Some(hours);
        self
    }
}

/// Partial update of a whole day record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Notes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressPatch>,
}

impl DayPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(mut self, patch: ProgressPatch) -> Self {
        self.progress = Some(patch);
        self
    }

    pub fn notes(mut self, notes: Notes) -> Self {
        self.notes = Some(notes);
        self
    }

    pub fn tasks(mut self, tasks: Vec<String>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn planned_hours(mut self, hours: f64) -> Self {
        self.planned_hours = Some(hours);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `round(tasks_completed / max(total_tasks, 1) * 100)`.
pub fn completion_percentage(tasks_completed: u32, total_tasks: u32) -> u32 {
    let total = total_tasks.max(1) as f64;
    (tasks_completed as f64 / total * 100.0).round() as u32
}

fn non_negative(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("expected a non-negative number, got {value}"),
        }
        .into())
    }
}

/// Check the bounds a stored day record must satisfy: `tasks_completed`
/// within the task list, percentage at most 100, hours non-negative.
pub fn validate_record(record: &DayRecord) -> Result<()> {
    non_negative("plannedHours", record.planned_hours)?;
    non_negative("progress.actualHours", record.progress.actual_hours)?;

    let total = record.task_count();
    if record.progress.tasks_completed > total {
        return Err(ValidationError::OutOfBounds {
            field: "progress.tasksCompleted".to_string(),
            value: record.progress.tasks_completed as u64,
            max: total as u64,
        }
        .into());
    }
    if record.progress.completion_percentage > 100 {
        return Err(ValidationError::OutOfBounds {
            field: "progress.completionPercentage".to_string(),
            value: record.progress.completion_percentage as u64,
            max: 100,
        }
        .into());
    }
    Ok(())
}

/// Apply `patch` on top of `existing`, returning the merged record.
///
/// An absent record is treated as `DayRecord::default()`: the first write to
/// an unknown date creates it. The merged record is validated as a whole, so
/// a `tasks_completed` larger than the merged task list is rejected whether
/// the patch raised the count or shortened the list.
pub fn merge_progress(existing: Option<&DayRecord>, patch: &DayPatch) -> Result<DayRecord> {
    let mut record = existing.cloned().unwrap_or_default();
    let prior_completed = record.progress.tasks_completed;

    if let Some(week) = patch.week {
        record.week = week;
    }
    if let Some(month) = &patch.month {
        record.month = month.clone();
    }
    if let Some(subject) = &patch.subject {
        record.subject = subject.clone();
    }
    if let Some(tasks) = &patch.tasks {
        record.tasks = tasks.clone();
    }
    if let Some(hours) = patch.planned_hours {
        record.planned_hours = non_negative("plannedHours", hours)?;
    }
    if let Some(resources) = &patch.resources {
        record.resources = resources.clone();
    }
    if let Some(notes) = &patch.notes {
        record.notes = notes.clone();
    }

    if let Some(progress) = &patch.progress {
        if let Some(hours) = progress.actual_hours {
            record.progress.actual_hours = non_negative("progress.actualHours", hours)?;
        }
        if let Some(completed) = progress.tasks_completed {
            record.progress.tasks_completed = completed;
        }
    }

    if record.progress.tasks_completed != prior_completed {
        record.progress.completion_percentage =
            completion_percentage(record.progress.tasks_completed, record.task_count());
    }

    validate_record(&record)?;
    Ok(record)
}
