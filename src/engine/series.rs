#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::model::{Task, TaskStatus, dates};

/// Number of most recent completion dates kept in the series.
pub const COMPLETED_SERIES_WINDOW: usize = 14;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DateCount {
    #[serde(serialize_with = "dates::date::serialize")]
    pub date: Date,
    pub label: String,
    pub completed: usize,
}

/// Completions bucketed by calendar date, oldest first.
///
/// Only dates with at least one completion appear, and only the newest
/// `window` of them are kept. The date is taken in the timestamp's own offset.
#[must_use]
pub fn completed_by_date(tasks: &[Task], window: usize) -> Vec<DateCount> {
    let mut buckets: BTreeMap<Date, usize> = BTreeMap::new();
    for task in tasks {
        if task.status != TaskStatus::Done {
            continue;
        }
        let Some(completed_at) = task.completed_at else {
            continue;
        };
        *buckets.entry(completed_at.date()).or_default() += 1;
    }

    let skip = buckets.len().saturating_sub(window);
    buckets
        .into_iter()
        .skip(skip)
        .map(|(date, completed)| DateCount {
            date,
            label: dates::short_label(date),
            completed,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use time::Duration;
    use time::macros::{date, datetime};

    fn done_at(id: &str, ts: Option<time::OffsetDateTime>) -> Task {
        Task::from_new(
            id.to_owned(),
            NewTask {
                title: id.to_owned(),
                status: TaskStatus::Done,
                assignee_id: "u1".to_owned(),
                completed_at: ts,
                ..NewTask::default()
            },
        )
    }

    #[test]
    fn buckets_by_date_ignoring_time_of_day() {
        let tasks = vec![
            done_at("a", Some(datetime!(2023-11-20 09:00 UTC))),
            done_at("b", Some(datetime!(2023-11-18 23:59 UTC))),
            done_at("c", Some(datetime!(2023-11-20 17:30 UTC))),
            done_at("d", None),
        ];
        let series = completed_by_date(&tasks, COMPLETED_SERIES_WINDOW);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, date!(2023 - 11 - 18));
        assert_eq!(series[0].completed, 1);
        assert_eq!(series[1].date, date!(2023 - 11 - 20));
        assert_eq!(series[1].completed, 2);
        assert_eq!(series[1].label, "20/11");
    }

    #[test]
    fn open_tasks_with_timestamps_are_ignored() {
        let mut t = done_at("a", Some(datetime!(2023-11-20 09:00 UTC)));
        t.status = TaskStatus::Review;
        assert!(completed_by_date(&[t], COMPLETED_SERIES_WINDOW).is_empty());
    }

    #[test]
    fn keeps_newest_dates_with_data_not_calendar_days() {
        let start = datetime!(2023-01-01 12:00 UTC);
        // 20 completions, one every third day.
        let tasks: Vec<Task> = (0..20)
            .map(|i| done_at(&format!("t{i}"), Some(start + Duration::days(i * 3))))
            .collect();

        let series = completed_by_date(&tasks, COMPLETED_SERIES_WINDOW);
        assert_eq!(series.len(), 14);
        assert_eq!(series[0].date, (start + Duration::days(6 * 3)).date());
        assert_eq!(series[13].date, (start + Duration::days(19 * 3)).date());
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
    }
}
