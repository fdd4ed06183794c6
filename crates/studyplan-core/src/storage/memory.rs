//! In-memory store, used by tests and by callers embedding the engine
//! over their own persistence.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::{DayRecordStore, ResetStateStore};
use crate::error::Result;
use crate::reset::ResetSystemState;
use crate::schedule::DayRecord;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    schedule: BTreeMap<NaiveDate, DayRecord>,
    reset_state: ResetSystemState,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, date: NaiveDate, record: DayRecord) -> Self {
        self.schedule.insert(date, record);
        self
    }
}

impl DayRecordStore for MemoryStore {
    fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.schedule.get(&date)
    }

    fn all_dates(&self) -> Vec<NaiveDate> {
        self.schedule.keys().copied().collect()
    }

    fn put(&mut self, date: NaiveDate, record: DayRecord) -> Result<()> {
        self.schedule.insert(date, record);
        Ok(())
    }
}

impl ResetStateStore for MemoryStore {
    fn reset_state(&self) -> ResetSystemState {
        self.reset_state.clone()
    }

    fn save_reset_state(&mut self, state: &ResetSystemState) -> Result<()> {
        self.reset_state = state.clone();
        Ok(())
    }

    fn commit_reset(
        &mut self,
        date: NaiveDate,
        record: DayRecord,
        state: &ResetSystemState,
    ) -> Result<()> {
        self.schedule.insert(date, record);
        self.reset_state = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{DayPatch, ProgressPatch};

    #[test]
    fn merge_update_creates_missing_day() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let mut store = MemoryStore::new();
        store
            .merge_update(
                date,
                &DayPatch::new().progress(ProgressPatch::new().actual_hours(1.0)),
            )
            .unwrap();
        assert_eq!(store.get(date).unwrap().progress.actual_hours, 1.0);
        assert_eq!(store.all_dates(), vec![date]);
    }

    #[test]
    fn rejected_merge_leaves_store_untouched() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let mut store = MemoryStore::new().with_day(date, DayRecord::new("Art", vec![], 1.0));
        let patch = DayPatch::new().progress(ProgressPatch::new().tasks_completed(2));
        assert!(store.merge_update(date, &patch).is_err());
        assert_eq!(store.get(date).unwrap().progress.tasks_completed, 0);
    }

    #[test]
    fn all_dates_are_sorted() {
        let d1 = NaiveDate::from_ymd_opt(2025, 7, 12).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let store = MemoryStore::new()
            .with_day(d1, DayRecord::default())
            .with_day(d2, DayRecord::default());
        assert_eq!(store.all_dates(), vec![d2, d1]);
    }
}
