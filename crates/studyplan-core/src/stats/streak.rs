//! Consecutive-day completion streaks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::DayRecordStore;

/// Rules for what counts toward a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakPolicy {
    /// Minimum completion percentage for a day to qualify.
    pub threshold_pct: u32,
    /// Maximum number of prior days inspected.
    pub lookback_days: u32,
}

impl Default for StreakPolicy {
    fn default() -> Self {
        Self {
            threshold_pct: 80,
            lookback_days: 30,
        }
    }
}

impl StreakPolicy {
    /// Count qualifying days walking backward from the day before
    /// `reference`. The first missing or sub-threshold day ends the walk;
    /// gaps are never skipped. `reference` itself never counts.
    pub fn compute<S: DayRecordStore + ?Sized>(&self, store: &S, reference: NaiveDate) -> u32 {
        let mut streak = 0;
        let mut day = reference;
        for _ in 0..self.lookback_days {
            let Some(prev) = day.pred_opt() else { break };
            day = prev;
            match store.get(day) {
                Some(record) if record.progress.completion_percentage >= self.threshold_pct => {
                    streak += 1;
                }
                _ => break,
            }
        }
        streak
    }
}

/// Streak under the default policy (80% threshold, 30-day lookback).
pub fn compute_streak<S: DayRecordStore + ?Sized>(store: &S, reference: NaiveDate) -> u32 {
    StreakPolicy::default().compute(store, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::DayRecord;
    use crate::storage::MemoryStore;
    use chrono::Duration;

    fn day_at(pct: u32) -> DayRecord {
        let mut record = DayRecord::new("History", vec!["t".into()], 1.0);
        record.progress.completion_percentage = pct;
        record
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()
    }

    fn store_with(percentages: &[u32]) -> MemoryStore {
        // percentages[0] is reference - 1, percentages[1] is reference - 2, ...
        percentages
            .iter()
            .enumerate()
            .fold(MemoryStore::new(), |store, (i, pct)| {
                store.with_day(reference() - Duration::days(i as i64 + 1), day_at(*pct))
            })
    }

    #[test]
    fn stops_at_first_sub_threshold_day() {
        let store = store_with(&[80, 90, 100, 85, 60]);
        assert_eq!(compute_streak(&store, reference()), 4);
    }

    #[test]
    fn zero_when_previous_day_missing() {
        let store = MemoryStore::new().with_day(reference() - Duration::days(2), day_at(100));
        assert_eq!(compute_streak(&store, reference()), 0);
    }

    #[test]
    fn zero_when_previous_day_below_threshold() {
        let store = store_with(&[79, 100, 100]);
        assert_eq!(compute_streak(&store, reference()), 0);
    }

    #[test]
    fn reference_day_itself_is_ignored() {
        let store = store_with(&[100]).with_day(reference(), day_at(0));
        assert_eq!(compute_streak(&store, reference()), 1);
    }

    #[test]
    fn missing_day_ends_streak_rather_than_being_skipped() {
        let store = MemoryStore::new()
            .with_day(reference() - Duration::days(1), day_at(100))
            .with_day(reference() - Duration::days(3), day_at(100));
        assert_eq!(compute_streak(&store, reference()), 1);
    }

    #[test]
    fn capped_at_lookback_window() {
        let store = store_with(&[100; 45]);
        assert_eq!(compute_streak(&store, reference()), 30);

        let short = StreakPolicy {
            threshold_pct: 80,
            lookback_days: 7,
        };
        assert_eq!(short.compute(&store, reference()), 7);
    }

    #[test]
    fn custom_threshold() {
        let store = store_with(&[70, 75, 60]);
        let lenient = StreakPolicy {
            threshold_pct: 70,
            lookback_days: 30,
        };
        assert_eq!(lenient.compute(&store, reference()), 2);
    }
}
