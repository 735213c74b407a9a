#![forbid(unsafe_code)]
//! Derived metrics over task and time-entry snapshots.
//!
//! Every function here is pure: it reads borrowed slices and returns a new
//! value. Inputs are expected to have passed [`crate::store::Snapshot::validate`]
//! (finite, non-negative hours); "today" is always passed in by the caller.

pub mod rollup;
pub mod series;
pub mod status;
pub mod timeline;
pub mod variance;
pub mod workload;

pub use rollup::{Kpis, hours_by_user, kpis, total_hours_logged};
pub use series::{COMPLETED_SERIES_WINDOW, DateCount, completed_by_date};
pub use status::{
    BoardColumn, StatusShare, StatusTally, TaskSummary, board_columns, completion_rate,
    is_overdue, overdue_count, summarize,
};
pub use timeline::{
    DEFAULT_TIMELINE_DAYS, MAX_TIMELINE_DAYS, TimelineBar, TimelineWindow, timeline_bars,
};
pub use variance::{TaskVariance, actual_hours, task_variance, variance_report};
pub use workload::{
    LoadClass, TeamLoad, Workload, WorkloadOptions, team_load, team_workload, user_workload,
};

/// Rounded integer percentage of `part` over `whole`; 0 when `whole` is not positive.
#[must_use]
pub fn percent(part: f64, whole: f64) -> u32 {
    if !whole.is_finite() || whole <= 0.0 {
        return 0;
    }
    round_to_u32(100.0 * part / whole)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn round_to_u32(v: f64) -> u32 {
    if !v.is_finite() || v <= 0.0 {
        return 0;
    }
    if v >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    v.round() as u32
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn count_as_f64(n: usize) -> f64 {
    n as f64
}
