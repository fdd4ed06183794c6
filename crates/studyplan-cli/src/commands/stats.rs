use chrono::{Local, NaiveDate};
use clap::Subcommand;
use serde_json::json;
use studyplan_core::{efficiency, ProgressSummary};

use super::{open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Consecutive prior days at or above the streak threshold
    Streak {
        /// Reference date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Actual vs planned hours for a day
    Efficiency {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
    },
    /// Totals and trend across all archived snapshots
    Summary,
}

pub fn run(action: StatsAction) -> CliResult {
    let engine = open_engine()?;

    match action {
        StatsAction::Streak { date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            print_json(&json!({ "date": date, "streak": engine.streak_for(date) }))?;
        }
        StatsAction::Efficiency { date } => {
            let record = engine
                .day(date)
                .ok_or_else(|| format!("no schedule entry for {date}"))?;
            print_json(&json!({
                "date": date,
                "plannedHours": record.planned_hours,
                "actualHours": record.progress.actual_hours,
                "efficiency": efficiency(record.progress.actual_hours, record.planned_hours),
            }))?;
        }
        StatsAction::Summary => {
            let summary = engine.with_store(|store| ProgressSummary::from_store(store));
            print_json(&summary)?;
        }
    }
    Ok(())
}
