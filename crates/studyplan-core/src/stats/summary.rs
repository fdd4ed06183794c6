//! Aggregate view over archived progress snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::history::ProgressSnapshot;
use crate::storage::DayRecordStore;

/// One point of the completion/efficiency trend, per archived snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub completion_percentage: u32,
    pub efficiency: u32,
    pub actual_hours: f64,
}

/// Totals and averages across every snapshot in the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProgressSummary {
    pub snapshot_count: usize,
    /// Snapshots taken at 100% completion.
    pub completed_days: usize,
    pub average_completion: f64,
    pub average_efficiency: f64,
    pub best_streak: u32,
    pub total_actual_hours: f64,
    pub total_planned_hours: f64,
    /// Ordered by snapshot time.
    pub trend: Vec<TrendPoint>,
}

impl ProgressSummary {
    pub fn from_snapshots<'a, I>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = &'a ProgressSnapshot>,
    {
        let mut snapshots: Vec<&ProgressSnapshot> = snapshots.into_iter().collect();
        snapshots.sort_by_key(|s| s.timestamp);

        let mut summary = Self {
            snapshot_count: snapshots.len(),
            ..Default::default()
        };
        if snapshots.is_empty() {
            return summary;
        }

        let mut completion_sum = 0u64;
        let mut efficiency_sum = 0u64;
        for snap in &snapshots {
            completion_sum += snap.completion_percentage as u64;
            efficiency_sum += snap.efficiency as u64;
            if snap.completion_percentage == 100 {
                summary.completed_days += 1;
            }
            summary.best_streak = summary.best_streak.max(snap.streak);
            summary.total_actual_hours += snap.actual_hours;
            summary.total_planned_hours += snap.planned_hours;
            summary.trend.push(TrendPoint {
                date: snap.date,
                completion_percentage: snap.completion_percentage,
                efficiency: snap.efficiency,
                actual_hours: snap.actual_hours,
            });
        }

        let n = snapshots.len() as f64;
        summary.average_completion = completion_sum as f64 / n;
        summary.average_efficiency = efficiency_sum as f64 / n;
        summary
    }

    pub fn from_store<S: DayRecordStore + ?Sized>(store: &S) -> Self {
        let dates = store.all_dates();
        let snapshots = dates
            .iter()
            .filter_map(|date| store.get(*date))
            .flat_map(|record| record.progress_history.iter());
        Self::from_snapshots(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::DayRecord;
    use crate::storage::{DayRecordStore, MemoryStore};
    use chrono::{Duration, TimeZone, Utc};

    fn snapshot(day: u32, pct: u32, efficiency: u32, streak: u32) -> ProgressSnapshot {
        ProgressSnapshot {
            date: NaiveDate::from_ymd_opt(2025, 7, day).unwrap(),
            completion_percentage: pct,
            tasks_completed: 0,
            total_tasks: 4,
            actual_hours: 2.0,
            planned_hours: 2.5,
            subject: "Math".into(),
            streak,
            efficiency,
            timestamp: Utc.with_ymd_and_hms(2025, 7, day, 6, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_schedule_gives_empty_summary() {
        let summary = ProgressSummary::from_store(&MemoryStore::new());
        assert_eq!(summary, ProgressSummary::default());
    }

    #[test]
    fn averages_and_best_streak() {
        let snaps = [snapshot(3, 100, 120, 2), snapshot(1, 50, 80, 0), snapshot(2, 90, 100, 5)];
        let summary = ProgressSummary::from_snapshots(snaps.iter());
        assert_eq!(summary.snapshot_count, 3);
        assert_eq!(summary.completed_days, 1);
        assert_eq!(summary.best_streak, 5);
        assert!((summary.average_completion - 80.0).abs() < 1e-9);
        assert!((summary.average_efficiency - 100.0).abs() < 1e-9);
        assert!((summary.total_actual_hours - 6.0).abs() < 1e-9);
        let dates: Vec<u32> = summary
            .trend
            .iter()
            .map(|p| chrono::Datelike::day(&p.date))
            .collect();
        assert_eq!(dates, vec![1, 2, 3]);
    }

    #[test]
    fn collects_history_from_every_record() {
        let base = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let mut store = MemoryStore::new();
        for i in 0..3u32 {
            let mut record = DayRecord::new("Math", vec![], 2.5);
            record.progress_history.push(snapshot(i + 1, 100, 100, i));
            store.put(base + Duration::days(i as i64), record).unwrap();
        }
        let summary = ProgressSummary::from_store(&store);
        assert_eq!(summary.snapshot_count, 3);
        assert_eq!(summary.completed_days, 3);
        assert_eq!(summary.best_streak, 2);
    }
}
