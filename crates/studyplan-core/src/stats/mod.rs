//! Statistics derived from the schedule and its snapshot history.
//!
//! Streak and efficiency feed the reset engine; the summary is a read-only
//! view for progress charts.

mod efficiency;
mod streak;
mod summary;

pub use efficiency::efficiency;
pub use streak::{compute_streak, StreakPolicy};
pub use summary::{ProgressSummary, TrendPoint};
