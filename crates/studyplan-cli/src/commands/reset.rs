//! Daily progress reset commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::json;
use studyplan_core::ResetOutcome;

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum ResetAction {
    /// Run the scheduled check once (resets today if it is due)
    Check,
    /// Reset a day now, whether or not it was already reset
    Manual {
        /// Date to reset (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the reset aggregate
    Status,
    /// Show the reset audit log, oldest first
    History,
}

pub fn run(action: ResetAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        ResetAction::Check => {
            let outcome = engine.check_and_perform_auto_reset();
            print_json(&json!({
                "check": outcome,
                "notification": engine.current_notification(),
            }))?;
        }
        ResetAction::Manual { date } => {
            let outcome = engine.manual_reset(date);
            print_json(&outcome)?;
            match outcome {
                ResetOutcome::Success { .. } => {}
                ResetOutcome::Failure { error } => return Err(error.into()),
                ResetOutcome::Busy => return Err("a reset is already in progress".into()),
            }
        }
        ResetAction::Status => {
            let state = engine.state();
            print_json(&json!({
                "lastResetCheck": state.last_reset_check,
                "currentStreak": state.current_streak,
                "totalDaysCompleted": state.total_days_completed,
                "lastResetStatus": state.last_reset_status,
                "auditEntries": state.reset_history.len(),
            }))?;
        }
        ResetAction::History => {
            print_json(&engine.state().reset_history)?;
        }
    }
    Ok(())
}
