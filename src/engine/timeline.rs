#![forbid(unsafe_code)]

use serde::Serialize;
use time::{Date, Duration};

use crate::model::{Task, TaskStatus, dates};

pub const DEFAULT_TIMELINE_DAYS: u32 = 14;
/// Widest window rendered; one day per column.
pub const MAX_TIMELINE_DAYS: u32 = 366;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TimelineWindow {
    #[serde(serialize_with = "dates::date::serialize")]
    pub start: Date,
    pub days: u32,
}

impl TimelineWindow {
    #[must_use]
    pub fn new(start: Date, days: u32) -> Self {
        Self { start, days }
    }

    /// Window starting at the earliest task start date, if any task has one.
    #[must_use]
    pub fn fit(tasks: &[Task], days: u32) -> Option<Self> {
        tasks
            .iter()
            .filter_map(|t| t.start_date)
            .min()
            .map(|start| Self::new(start, days))
    }

    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        (0..self.days).filter_map(|i| self.start.checked_add(Duration::days(i64::from(i))))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBar {
    pub task_id: String,
    pub title: String,
    pub assignee_id: String,
    pub status: TaskStatus,
    #[serde(serialize_with = "dates::date::serialize")]
    pub start: Date,
    #[serde(serialize_with = "dates::date::serialize")]
    pub due: Date,
    /// Days from the window start to the task start; negative when it began earlier.
    pub offset_days: i64,
    /// Inclusive length in days.
    pub span_days: i64,
    pub dependencies: Vec<String>,
    pub visible: bool,
}

impl TimelineBar {
    /// Columns of the window covered by the bar, clipped to `0..days`.
    #[must_use]
    pub fn visible_range(&self, days: u32) -> Option<(usize, usize)> {
        let days = i64::from(days);
        let from = self.offset_days.max(0);
        let to = (self.offset_days + self.span_days).min(days);
        if from >= to {
            return None;
        }
        Some((
            usize::try_from(from).unwrap_or(0),
            usize::try_from(to).unwrap_or(0),
        ))
    }
}

/// Bars for every task with both a start and a due date, in snapshot order.
#[must_use]
pub fn timeline_bars(tasks: &[Task], window: &TimelineWindow) -> Vec<TimelineBar> {
    tasks
        .iter()
        .filter_map(|t| {
            let (start, due) = (t.start_date?, t.due_date?);
            let offset_days = (start - window.start).whole_days();
            let span_days = (due - start).whole_days() + 1;
            let mut bar = TimelineBar {
                task_id: t.id.clone(),
                title: t.title.clone(),
                assignee_id: t.assignee_id.clone(),
                status: t.status,
                start,
                due,
                offset_days,
                span_days,
                dependencies: t.dependencies.clone(),
                visible: false,
            };
            bar.visible = bar.visible_range(window.days).is_some();
            Some(bar)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use time::macros::date;

    fn task(id: &str, start: Option<Date>, due: Option<Date>) -> Task {
        Task::from_new(
            id.to_owned(),
            NewTask {
                title: id.to_owned(),
                assignee_id: "u1".to_owned(),
                start_date: start,
                due_date: due,
                ..NewTask::default()
            },
        )
    }

    #[test]
    fn bar_geometry_is_inclusive() {
        let window = TimelineWindow::new(date!(2023 - 11 - 15), 14);
        let tasks = vec![task(
            "t2",
            Some(date!(2023 - 11 - 21)),
            Some(date!(2023 - 11 - 24)),
        )];
        let bars = timeline_bars(&tasks, &window);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].offset_days, 6);
        assert_eq!(bars[0].span_days, 4);
        assert_eq!(bars[0].visible_range(14), Some((6, 10)));
    }

    #[test]
    fn undated_tasks_are_skipped() {
        let window = TimelineWindow::new(date!(2023 - 11 - 15), 14);
        let tasks = vec![
            task("a", None, Some(date!(2023 - 11 - 20))),
            task("b", Some(date!(2023 - 11 - 20)), None),
        ];
        assert!(timeline_bars(&tasks, &window).is_empty());
    }

    #[test]
    fn bars_outside_window_are_hidden() {
        let window = TimelineWindow::new(date!(2023 - 11 - 15), 7);
        let tasks = vec![
            task("early", Some(date!(2023 - 11 - 01)), Some(date!(2023 - 11 - 03))),
            task("straddle", Some(date!(2023 - 11 - 13)), Some(date!(2023 - 11 - 16))),
            task("late", Some(date!(2023 - 11 - 22)), Some(date!(2023 - 11 - 23))),
        ];
        let bars = timeline_bars(&tasks, &window);
        let visible: Vec<_> = bars.iter().map(|b| b.visible).collect();
        assert_eq!(visible, [false, true, false]);
        assert_eq!(bars[1].visible_range(7), Some((0, 2)));
    }

    #[test]
    fn window_fits_earliest_start() {
        let tasks = vec![
            task("a", Some(date!(2023 - 11 - 20)), None),
            task("b", Some(date!(2023 - 11 - 15)), None),
            task("c", None, None),
        ];
        let w = TimelineWindow::fit(&tasks, 14).unwrap();
        assert_eq!(w.start, date!(2023 - 11 - 15));
        assert_eq!(w.dates().count(), 14);
        assert_eq!(w.dates().last(), Some(date!(2023 - 11 - 28)));
        assert!(TimelineWindow::fit(&[], 14).is_none());
    }
}
