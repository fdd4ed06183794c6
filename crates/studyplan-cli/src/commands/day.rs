//! Day record commands for CLI.

use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use studyplan_core::{DayPatch, DayRecord, DayRecordStore, Notes, ProgressPatch, SqliteStore};

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum DayAction {
    /// List all scheduled days
    List,
    /// Show one day's record
    Show {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
    },
    /// Update a day's progress or notes
    Progress {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
        /// Number of tasks completed
        #[arg(long)]
        tasks_completed: Option<u32>,
        /// Hours actually studied
        #[arg(long)]
        actual_hours: Option<f64>,
        /// Replacement notes as a JSON object
        #[arg(long)]
        notes: Option<String>,
    },
    /// Import a schedule (JSON map of date -> day record)
    Import {
        /// Path to the schedule file
        file: PathBuf,
        /// Replace days that already exist
        #[arg(long)]
        overwrite: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayListEntry<'a> {
    date: NaiveDate,
    subject: &'a str,
    tasks: usize,
    completion_percentage: u32,
    last_reset_date: Option<DateTime<Utc>>,
}

pub fn run(action: DayAction) -> CliResult {
    match action {
        DayAction::List => {
            let store = SqliteStore::open_default()?;
            let entries: Vec<DayListEntry> = store
                .schedule()
                .iter()
                .map(|(date, record)| DayListEntry {
                    date: *date,
                    subject: &record.subject,
                    tasks: record.tasks.len(),
                    completion_percentage: record.progress.completion_percentage,
                    last_reset_date: record.last_reset_date,
                })
                .collect();
            print_json(&entries)?;
        }
        DayAction::Show { date } => {
            let store = SqliteStore::open_default()?;
            let record = store
                .get(date)
                .ok_or_else(|| format!("no schedule entry for {date}"))?;
            print_json(record)?;
        }
        DayAction::Progress {
            date,
            tasks_completed,
            actual_hours,
            notes,
        } => {
            let mut patch = DayPatch::new();
            if tasks_completed.is_some() || actual_hours.is_some() {
                patch = patch.progress(ProgressPatch {
                    tasks_completed,
                    actual_hours,
                });
            }
            if let Some(raw) = notes {
                let notes: Notes = serde_json::from_str(&raw)?;
                patch = patch.notes(notes);
            }
            if patch.is_empty() {
                return Err(
                    "nothing to update: pass --tasks-completed, --actual-hours or --notes".into(),
                );
            }

            let engine = open_engine()?;
            engine.merge_progress(date, &patch)?;
            if let Some(record) = engine.day(date) {
                print_json(&record)?;
            }
        }
        DayAction::Import { file, overwrite } => {
            let content = std::fs::read_to_string(&file)?;
            let schedule: BTreeMap<NaiveDate, DayRecord> = serde_json::from_str(&content)?;
            let total = schedule.len();
            let mut store = SqliteStore::open_default()?;
            let written = store.import(schedule, overwrite)?;
            tracing::info!(file = %file.display(), written, total, "schedule imported");
            println!("imported {written} of {total} days");
        }
    }
    Ok(())
}
