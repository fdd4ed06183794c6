//! End-to-end reset scenarios against in-memory and instrumented stores.

use chrono::{Duration, NaiveDate};
use std::sync::mpsc;
use std::sync::Arc;

use studyplan_core::{
    compute_streak, CheckOutcome, CoreError, DayPatch, DayRecord, DayRecordStore, ManualClock,
    MemoryStore, Progress, ProgressPatch, ResetEngine, ResetOutcome, ResetStateStore,
    ResetStatus, ResetSystemState,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn study_day(done: u32, total: u32, planned: f64, actual: f64) -> DayRecord {
    let tasks = (0..total).map(|i| format!("task {i}")).collect();
    let mut record = DayRecord::new("Organic Chemistry", tasks, planned).with_week(28, "July");
    record.progress.tasks_completed = done;
    record.progress.completion_percentage =
        studyplan_core::schedule::completion_percentage(done, total);
    record.progress.actual_hours = actual;
    record
}

fn day_at_pct(pct: u32) -> DayRecord {
    let mut record = DayRecord::new("Review", vec!["t".into()], 1.0);
    record.progress.completion_percentage = pct;
    record
}

#[test]
fn scenario_a_full_day_manual_reset() {
    let day = date(2025, 7, 10);
    let store = MemoryStore::new().with_day(day, study_day(4, 4, 2.5, 3.0));
    let engine = ResetEngine::new(store, ManualClock::at(day, 21));

    let outcome = engine.manual_reset(Some(day));
    let snapshot = outcome.snapshot().expect("reset succeeds");
    assert_eq!(snapshot.completion_percentage, 100);
    assert_eq!(snapshot.efficiency, 120);
    assert_eq!(snapshot.tasks_completed, 4);
    assert_eq!(snapshot.planned_hours, 2.5);
    assert_eq!(snapshot.actual_hours, 3.0);

    let record = engine.day(day).unwrap();
    assert_eq!(
        record.progress,
        Progress {
            tasks_completed: 0,
            total_tasks: 4,
            actual_hours: 0.0,
            completion_percentage: 0,
        }
    );
    assert_eq!(record.progress_history.latest(), Some(snapshot));
    assert_eq!(engine.state().total_days_completed, 1);
}

#[test]
fn scenario_b_missing_date_is_an_audited_failure() {
    let present = date(2025, 7, 10);
    let absent = date(2025, 7, 11);
    let store = MemoryStore::new().with_day(present, study_day(1, 4, 1.0, 1.0));
    let engine = ResetEngine::new(store, ManualClock::at(present, 9));

    let outcome = engine.manual_reset(Some(absent));
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "MissingRecordError");

    let state = engine.state();
    assert_eq!(state.last_reset_status, Some(ResetStatus::Error));
    assert_eq!(state.reset_history.len(), 1);
    assert_eq!(state.reset_history.latest().unwrap().status, ResetStatus::Error);
    assert_eq!(state.total_days_completed, 0);

    let store = engine.into_store();
    assert!(store.get(absent).is_none());
    assert_eq!(store.all_dates(), vec![present]);
}

#[test]
fn scenario_c_streak_stops_at_first_weak_day() {
    let d = date(2025, 7, 20);
    let mut store = MemoryStore::new();
    for (offset, pct) in [80, 90, 100, 85, 60].into_iter().enumerate() {
        store
            .put(d - Duration::days(offset as i64 + 1), day_at_pct(pct))
            .unwrap();
    }
    assert_eq!(compute_streak(&store, d), 4);
}

/// Blocks inside `commit_reset` until released, so a test can observe the
/// engine while a reset is in flight.
struct GatedStore {
    inner: MemoryStore,
    entered: mpsc::Sender<()>,
    release: mpsc::Receiver<()>,
}

impl DayRecordStore for GatedStore {
    fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.inner.get(date)
    }

    fn all_dates(&self) -> Vec<NaiveDate> {
        self.inner.all_dates()
    }

    fn put(&mut self, date: NaiveDate, record: DayRecord) -> studyplan_core::error::Result<()> {
        self.inner.put(date, record)
    }
}

impl ResetStateStore for GatedStore {
    fn reset_state(&self) -> ResetSystemState {
        self.inner.reset_state()
    }

    fn save_reset_state(&mut self, state: &ResetSystemState) -> studyplan_core::error::Result<()> {
        self.inner.save_reset_state(state)
    }

    fn commit_reset(
        &mut self,
        date: NaiveDate,
        record: DayRecord,
        state: &ResetSystemState,
    ) -> studyplan_core::error::Result<()> {
        let _ = self.entered.send(());
        let _ = self.release.recv();
        self.inner.commit_reset(date, record, state)
    }
}

#[test]
fn scenario_d_overlapping_triggers_produce_one_snapshot() {
    let day = date(2025, 7, 10);
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let store = GatedStore {
        inner: MemoryStore::new().with_day(day, study_day(2, 4, 2.0, 1.0)),
        entered: entered_tx,
        release: release_rx,
    };
    let engine = ResetEngine::new(store, ManualClock::at(day, 9));

    std::thread::scope(|s| {
        let first = s.spawn(|| engine.manual_reset(Some(day)));

        entered_rx.recv().unwrap();
        assert!(engine.is_busy());
        assert_eq!(engine.manual_reset(Some(day)), ResetOutcome::Busy);
        assert_eq!(engine.check_and_perform_auto_reset(), CheckOutcome::Busy);

        release_tx.send(()).unwrap();
        assert!(first.join().unwrap().is_success());
    });

    assert!(!engine.is_busy());
    assert_eq!(engine.day(day).unwrap().progress_history.len(), 1);
    assert_eq!(engine.state().reset_history.len(), 1);
}

/// Fails every reset commit, as a full disk would.
struct FailingStore {
    inner: MemoryStore,
}

impl DayRecordStore for FailingStore {
    fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.inner.get(date)
    }

    fn all_dates(&self) -> Vec<NaiveDate> {
        self.inner.all_dates()
    }

    fn put(&mut self, date: NaiveDate, record: DayRecord) -> studyplan_core::error::Result<()> {
        self.inner.put(date, record)
    }
}

impl ResetStateStore for FailingStore {
    fn reset_state(&self) -> ResetSystemState {
        self.inner.reset_state()
    }

    fn save_reset_state(&mut self, state: &ResetSystemState) -> studyplan_core::error::Result<()> {
        self.inner.save_reset_state(state)
    }

    fn commit_reset(
        &mut self,
        _date: NaiveDate,
        _record: DayRecord,
        _state: &ResetSystemState,
    ) -> studyplan_core::error::Result<()> {
        Err(CoreError::Custom("disk full".into()))
    }
}

#[test]
fn failed_commit_leaves_day_untouched() {
    let day = date(2025, 7, 10);
    let before = study_day(4, 4, 2.0, 2.5);
    let store = FailingStore {
        inner: MemoryStore::new().with_day(day, before.clone()),
    };
    let engine = ResetEngine::new(store, ManualClock::at(day, 9));

    match engine.manual_reset(None) {
        ResetOutcome::Failure { error } => {
            assert_eq!(error.kind(), "UnexpectedError");
            assert_eq!(error.to_string(), "disk full");
        }
        other => panic!("expected failure, got {other:?}"),
    }

    assert_eq!(engine.day(day).unwrap(), before);
    let state = engine.state();
    assert_eq!(state.total_days_completed, 0);
    assert_eq!(state.current_streak, 0);
    assert!(state.last_reset_check.is_none());
    assert_eq!(state.last_reset_status, Some(ResetStatus::Error));
    let audit = state.reset_history.latest().unwrap();
    assert_eq!(audit.error_message.as_deref(), Some("disk full"));

    // The failed attempt did not stamp the check, so the next tick retries.
    assert!(matches!(
        engine.check_and_perform_auto_reset(),
        CheckOutcome::Reset { .. }
    ));
    assert_eq!(engine.state().reset_history.len(), 2);
}

#[test]
fn same_day_checks_reset_at_most_once_regardless_of_elapsed_time() {
    let day = date(2025, 7, 10);
    let store = MemoryStore::new().with_day(day, study_day(3, 4, 2.0, 1.0));
    let clock = Arc::new(ManualClock::at(day, 0));
    let engine = ResetEngine::new(store, clock.clone());

    let mut resets = 0;
    for _ in 0..24 {
        if let CheckOutcome::Reset { outcome } = engine.check_and_perform_auto_reset() {
            assert!(outcome.is_success());
            resets += 1;
        }
        clock.advance(Duration::minutes(59));
    }
    assert_eq!(resets, 1);
    assert_eq!(engine.day(day).unwrap().progress_history.len(), 1);
}

#[test]
fn week_of_study_builds_streak_and_completed_count() {
    let start = date(2025, 7, 1);
    let mut store = MemoryStore::new();
    for i in 0..7 {
        store
            .put(start + Duration::days(i), study_day(4, 4, 2.0, 2.0))
            .unwrap();
    }
    let clock = Arc::new(ManualClock::at(start, 6));
    let engine = ResetEngine::new(store, clock.clone());

    for i in 0..7u32 {
        // Day i's check archives whatever was logged since the last reset.
        let today = start + Duration::days(i as i64);
        engine.check_and_perform_auto_reset();
        let logged = ProgressPatch::new().tasks_completed(4).actual_hours(2.0);
        engine
            .merge_progress(today, &DayPatch::new().progress(logged))
            .unwrap();
        clock.advance(Duration::days(1));
    }

    let state = engine.state();
    // Every day started at 100% from the fixture.
    assert_eq!(state.total_days_completed, 7);
    assert_eq!(state.reset_history.len(), 7);
    assert_eq!(state.current_streak, 6);
}

#[test]
fn shrinking_task_list_cannot_strand_completed_count() {
    let day = date(2025, 7, 10);
    let store = MemoryStore::new().with_day(day, study_day(0, 4, 2.0, 0.0));
    let engine = ResetEngine::new(store, ManualClock::at(day, 9));

    engine
        .merge_progress(day, &DayPatch::new().progress(ProgressPatch::new().tasks_completed(4)))
        .unwrap();
    let err = engine
        .merge_progress(day, &DayPatch::new().tasks(vec!["only".into()]))
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let record = engine.day(day).unwrap();
    assert_eq!(record.tasks.len(), 4);
    let snapshot = engine.manual_reset(Some(day)).snapshot().cloned().unwrap();
    assert!(snapshot.tasks_completed <= snapshot.total_tasks);
}
