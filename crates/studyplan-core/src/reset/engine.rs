//! Reset engine implementation.
//!
//! The engine is the only writer of [`ResetSystemState`] and the error
//! boundary of the reset subsystem: triggers never return `Err`, they return
//! an outcome and leave an audit record behind.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Checking -> (NoActionNeeded | Resetting) -> Idle
//! Idle -> Resetting -> (Succeeded | Failed) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let engine = ResetEngine::new(store, SystemClock);
//! engine.check_and_perform_auto_reset(); // at startup and every hour
//! engine.manual_reset(None);             // user-triggered, today
//! ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

use super::state::{CheckOutcome, EnginePhase, ResetOutcome, ResetSystemState};
use crate::clock::{Clock, SystemClock};
use crate::error::{ResetError, Result};
use crate::history::{ProgressSnapshot, ResetAuditRecord, ResetStatus};
use crate::notification::{Notification, NotificationEmitter, NotificationKind};
use crate::schedule::{DayPatch, DayRecord, Progress};
use crate::stats::{efficiency, StreakPolicy};
use crate::storage::{Config, ResetStateStore};

/// Tunables for the engine, usually taken from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub streak: StreakPolicy,
    pub notification_ttl: Duration,
    pub notifications_enabled: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            streak: StreakPolicy::default(),
            notification_ttl: Duration::seconds(crate::notification::DEFAULT_NOTIFICATION_TTL_SECS),
            notifications_enabled: true,
        }
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        let ttl = config.notifications.ttl_secs.min(365 * 24 * 3600) as i64;
        Self {
            streak: config.reset.streak_policy(),
            notification_ttl: Duration::seconds(ttl),
            notifications_enabled: config.notifications.enabled,
        }
    }
}

struct EngineCore<S> {
    store: S,
    state: ResetSystemState,
    phase: EnginePhase,
}

/// A reset computed in memory but not yet written.
struct StagedReset {
    record: DayRecord,
    state: ResetSystemState,
    snapshot: ProgressSnapshot,
}

/// Clears the busy flag when the in-flight operation ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ResetEngine<S, C = SystemClock> {
    core: Mutex<EngineCore<S>>,
    busy: AtomicBool,
    clock: C,
    notifier: NotificationEmitter,
    settings: EngineSettings,
}

impl<S: ResetStateStore, C: Clock> ResetEngine<S, C> {
    /// Create an engine over `store`, loading the persisted aggregate.
    pub fn new(store: S, clock: C) -> Self {
        Self::with_settings(store, clock, EngineSettings::default())
    }

    pub fn with_settings(store: S, clock: C, settings: EngineSettings) -> Self {
        let state = store.reset_state();
        let notifier = if settings.notifications_enabled {
            NotificationEmitter::new(settings.notification_ttl)
        } else {
            NotificationEmitter::disabled()
        };
        Self {
            core: Mutex::new(EngineCore {
                store,
                state,
                phase: EnginePhase::Idle,
            }),
            busy: AtomicBool::new(false),
            clock,
            notifier,
            settings,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> ResetSystemState {
        self.lock_core().state.clone()
    }

    pub fn phase(&self) -> EnginePhase {
        self.lock_core().phase
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn day(&self, date: NaiveDate) -> Option<DayRecord> {
        self.lock_core().store.get(date).cloned()
    }

    /// Streak as it would be recorded by a reset of `date` right now.
    pub fn streak_for(&self, date: NaiveDate) -> u32 {
        self.settings.streak.compute(&self.lock_core().store, date)
    }

    /// Run `f` with read access to the underlying store.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock_core().store)
    }

    pub fn current_notification(&self) -> Option<Notification> {
        self.notifier.current(self.clock.now())
    }

    pub fn dismiss_notification(&self) {
        self.notifier.dismiss();
    }

    pub fn into_store(self) -> S {
        self.core
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .store
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Merge a partial update into a day's record. Serialized with resets
    /// so a progress write never interleaves with a rollover.
    pub fn merge_progress(&self, date: NaiveDate, patch: &DayPatch) -> Result<()> {
        self.lock_core().store.merge_update(date, patch)
    }

    /// Scheduled trigger: reset today's record if this is the first check
    /// of a new day and today has not been reset yet.
    pub fn check_and_perform_auto_reset(&self) -> CheckOutcome {
        let Some(_guard) = self.try_begin() else {
            debug!("reset check skipped: engine busy");
            return CheckOutcome::Busy;
        };
        let mut core = self.lock_core();
        core.phase = EnginePhase::Checking;

        let now = self.clock.now();
        let today = self.clock.date_of(now);
        let last_check_day = core.state.last_reset_check.map(|at| self.clock.date_of(at));

        let outcome = if last_check_day == Some(today) {
            debug!(%today, "already checked today");
            CheckOutcome::AlreadyChecked
        } else {
            let due = core.store.get(today).is_some_and(|record| {
                record.last_reset_date.map(|at| self.clock.date_of(at)) != Some(today)
            });
            if due {
                info!(%today, "new day detected, resetting progress");
                CheckOutcome::Reset {
                    outcome: self.run_reset(&mut core, today),
                }
            } else {
                debug!(%today, "no reset needed");
                let mut next = core.state.clone();
                next.last_reset_check = Some(now);
                self.persist_state(&mut core, next);
                CheckOutcome::NoActionNeeded
            }
        };

        core.phase = EnginePhase::Idle;
        outcome
    }

    /// User trigger: reset `date` (today when `None`) regardless of whether
    /// today was already checked. Rejected while another reset is running.
    pub fn manual_reset(&self, date: Option<NaiveDate>) -> ResetOutcome {
        let Some(_guard) = self.try_begin() else {
            warn!("manual reset rejected: another reset is in progress");
            return ResetOutcome::Busy;
        };
        let date = date.unwrap_or_else(|| self.clock.today());
        let mut core = self.lock_core();
        let outcome = self.run_reset(&mut core, date);
        core.phase = EnginePhase::Idle;
        outcome
    }

    // ── Internals ────────────────────────────────────────────────────

    fn try_begin(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    fn lock_core(&self) -> MutexGuard<'_, EngineCore<S>> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_reset(&self, core: &mut EngineCore<S>, date: NaiveDate) -> ResetOutcome {
        core.phase = EnginePhase::Resetting;
        let now = self.clock.now();

        let result = match core.store.get(date).cloned() {
            None => Err(ResetError::MissingRecord(date)),
            Some(record) => self
                .stage_reset(core, date, record, now)
                .and_then(|staged| self.commit(core, date, staged)),
        };

        match result {
            Ok(snapshot) => {
                info!(
                    %date,
                    completion = snapshot.completion_percentage,
                    streak = snapshot.streak,
                    efficiency = snapshot.efficiency,
                    "daily progress reset"
                );
                self.notifier.emit(
                    NotificationKind::Success,
                    format!(
                        "Progress for {date} archived at {}% and reset",
                        snapshot.completion_percentage
                    ),
                    now,
                );
                ResetOutcome::Success { snapshot }
            }
            Err(err) => {
                match &err {
                    ResetError::MissingRecord(_) => warn!(%date, "reset failed: {err}"),
                    ResetError::Unexpected(_) => error!(%date, "reset failed: {err}"),
                }
                self.record_failure(core, date, &err, now);
                self.notifier.emit(
                    NotificationKind::Error,
                    format!("Failed to reset progress for {date}: {err}"),
                    now,
                );
                ResetOutcome::Failure { error: err }
            }
        }
    }

    /// Build the reset record and the next aggregate without touching
    /// the store.
    fn stage_reset(
        &self,
        core: &EngineCore<S>,
        date: NaiveDate,
        mut record: DayRecord,
        now: DateTime<Utc>,
    ) -> Result<StagedReset, ResetError> {
        let streak = self.settings.streak.compute(&core.store, date);
        let efficiency = efficiency(record.progress.actual_hours, record.planned_hours);
        let snapshot = ProgressSnapshot::capture(date, &record, streak, efficiency, now);
        let was_complete = record.is_complete();

        let total_tasks = u32::try_from(record.tasks.len())
            .map_err(|_| ResetError::Unexpected(format!("too many tasks on {date}")))?;
        record.progress_history.push(snapshot.clone());
        record.progress = Progress::cleared(total_tasks);
        record.last_reset_date = Some(now);

        let mut state = core.state.clone();
        state
            .reset_history
            .push(ResetAuditRecord::success(snapshot.clone(), now));
        state.last_reset_check = Some(now);
        state.current_streak = streak;
        if was_complete {
            state.total_days_completed = state.total_days_completed.saturating_add(1);
        }
        state.last_reset_status = Some(ResetStatus::Success);

        Ok(StagedReset {
            record,
            state,
            snapshot,
        })
    }

    fn commit(
        &self,
        core: &mut EngineCore<S>,
        date: NaiveDate,
        staged: StagedReset,
    ) -> Result<ProgressSnapshot, ResetError> {
        core.store
            .commit_reset(date, staged.record, &staged.state)
            .map_err(|e| ResetError::Unexpected(e.to_string()))?;
        core.state = staged.state;
        Ok(staged.snapshot)
    }

    fn record_failure(
        &self,
        core: &mut EngineCore<S>,
        date: NaiveDate,
        err: &ResetError,
        now: DateTime<Utc>,
    ) {
        let mut next = core.state.clone();
        next.reset_history
            .push(ResetAuditRecord::failure(date, err, now));
        next.last_reset_status = Some(ResetStatus::Error);
        self.persist_state(core, next);
    }

    /// Adopt `next` as the aggregate and try to persist it. A failed write
    /// is logged; the in-memory aggregate stays authoritative for this
    /// process.
    fn persist_state(&self, core: &mut EngineCore<S>, next: ResetSystemState) {
        if let Err(e) = core.store.save_reset_state(&next) {
            error!("failed to persist reset state: {e}");
        }
        core.state = next;
    }
}
