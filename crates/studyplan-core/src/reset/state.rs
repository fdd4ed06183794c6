use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ResetError;
use crate::history::{ProgressSnapshot, ResetHistory, ResetStatus};

/// Process-wide reset aggregate. Only the reset engine writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResetSystemState {
    #[serde(default)]
    pub last_reset_check: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub total_days_completed: u32,
    #[serde(default)]
    pub last_reset_status: Option<ResetStatus>,
    #[serde(default)]
    pub reset_history: ResetHistory,
}

/// Where the engine is in its check/reset cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    Idle,
    Checking,
    Resetting,
}

/// Result of a reset attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ResetOutcome {
    Success { snapshot: ProgressSnapshot },
    Failure { error: ResetError },
    /// Another check or reset was in flight; nothing was attempted.
    Busy,
}

impl ResetOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ResetOutcome::Success { .. })
    }

    pub fn snapshot(&self) -> Option<&ProgressSnapshot> {
        match self {
            ResetOutcome::Success { snapshot } => Some(snapshot),
            _ => None,
        }
    }
}

// `{success: true, snapshot}` or `{success: false, error, message}`.
impl Serialize for ResetOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResetOutcome::Success { snapshot } => {
                let mut s = serializer.serialize_struct("ResetOutcome", 2)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("snapshot", snapshot)?;
                s.end()
            }
            ResetOutcome::Failure { error } => {
                let mut s = serializer.serialize_struct("ResetOutcome", 3)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error.kind())?;
                s.serialize_field("message", &error.to_string())?;
                s.end()
            }
            ResetOutcome::Busy => {
                let mut s = serializer.serialize_struct("ResetOutcome", 3)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("error", "Busy")?;
                s.serialize_field("message", "a reset is already in progress")?;
                s.end()
            }
        }
    }
}

/// Result of a scheduled check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Today was already checked; nothing looked at.
    AlreadyChecked,
    /// No record for today, or today was already reset.
    NoActionNeeded,
    /// Today's record was due and a reset was attempted.
    Reset { outcome: ResetOutcome },
    Busy,
}
