#![forbid(unsafe_code)]

use serde::Serialize;

use crate::model::{Task, TimeEntry};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskVariance {
    pub task_id: String,
    pub title: String,
    pub estimated: f64,
    pub actual: f64,
    pub variance: f64,
    pub variance_pct: f64,
    pub entries: usize,
}

#[must_use]
pub fn actual_hours(task_id: &str, entries: &[TimeEntry]) -> f64 {
    entries
        .iter()
        .filter(|e| e.task_id == task_id)
        .map(|e| e.hours)
        .sum()
}

/// `100 * (actual - estimated) / estimated`, or 0 when nothing was estimated.
#[must_use]
pub fn variance_percent(estimated: f64, actual: f64) -> f64 {
    if estimated > 0.0 {
        100.0 * (actual - estimated) / estimated
    } else {
        0.0
    }
}

/// `None` when no hours were logged against the task.
#[must_use]
pub fn task_variance(task: &Task, entries: &[TimeEntry]) -> Option<TaskVariance> {
    let (count, actual) = entries
        .iter()
        .filter(|e| e.task_id == task.id)
        .fold((0usize, 0.0f64), |(n, h), e| (n + 1, h + e.hours));
    if actual <= 0.0 {
        return None;
    }
    Some(TaskVariance {
        task_id: task.id.clone(),
        title: task.title.clone(),
        estimated: task.estimated_time,
        actual,
        variance: actual - task.estimated_time,
        variance_pct: variance_percent(task.estimated_time, actual),
        entries: count,
    })
}

#[must_use]
pub fn variance_report(tasks: &[Task], entries: &[TimeEntry]) -> Vec<TaskVariance> {
    tasks
        .iter()
        .filter_map(|t| task_variance(t, entries))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTask, NewTimeEntry};
    use time::macros::date;

    fn task(id: &str, estimate: f64) -> Task {
        Task::from_new(
            id.to_owned(),
            NewTask {
                title: id.to_owned(),
                assignee_id: "u1".to_owned(),
                estimated_time: estimate,
                ..NewTask::default()
            },
        )
    }

    fn entry(id: &str, task_id: &str, hours: f64) -> TimeEntry {
        TimeEntry::from_new(
            id.to_owned(),
            NewTimeEntry {
                task_id: task_id.to_owned(),
                user_id: "u1".to_owned(),
                hours,
                date: date!(2023 - 11 - 21),
                description: None,
            },
        )
    }

    #[test]
    fn over_estimate_is_positive() {
        let v = task_variance(&task("t1", 6.0), &[entry("e1", "t1", 7.0)]).unwrap();
        assert!((v.variance - 1.0).abs() < 1e-9);
        assert!((v.variance_pct - 16.666_666).abs() < 1e-3);
        assert_eq!(v.entries, 1);
    }

    #[test]
    fn entries_are_summed_per_task() {
        let entries = vec![
            entry("e1", "t1", 2.0),
            entry("e2", "t2", 9.0),
            entry("e3", "t1", 1.5),
        ];
        assert!((actual_hours("t1", &entries) - 3.5).abs() < 1e-9);
        let v = task_variance(&task("t1", 5.0), &entries).unwrap();
        assert!((v.variance + 1.5).abs() < 1e-9);
        assert!((v.variance_pct + 30.0).abs() < 1e-9);
    }

    #[test]
    fn zero_estimate_has_zero_percent() {
        let v = task_variance(&task("t1", 0.0), &[entry("e1", "t1", 5.0)]).unwrap();
        assert!((v.variance - 5.0).abs() < 1e-9);
        assert!(v.variance_pct.abs() < f64::EPSILON);
    }

    #[test]
    fn unlogged_tasks_are_excluded() {
        let tasks = vec![task("t1", 4.0), task("t2", 4.0), task("t3", 4.0)];
        let entries = vec![entry("e1", "t2", 3.0), entry("e2", "t3", 0.0)];
        let report = variance_report(&tasks, &entries);
        let ids: Vec<_> = report.iter().map(|v| v.task_id.as_str()).collect();
        assert_eq!(ids, ["t2"]);
    }
}
