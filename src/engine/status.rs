#![forbid(unsafe_code)]

use serde::Serialize;
use time::Date;

use crate::engine::{count_as_f64, percent};
use crate::model::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusTally {
    pub todo: usize,
    pub in_progress: usize,
    pub review: usize,
    pub done: usize,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StatusShare {
    pub status: TaskStatus,
    pub count: usize,
    pub percent: u32,
}

impl StatusTally {
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut tally = Self::default();
        for t in tasks {
            *tally.slot(t.status) += 1;
        }
        tally
    }

    fn slot(&mut self, status: TaskStatus) -> &mut usize {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Review => &mut self.review,
            TaskStatus::Done => &mut self.done,
        }
    }

    #[must_use]
    pub fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Review => self.review,
            TaskStatus::Done => self.done,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.review + self.done
    }

    /// Share of each bucket, in canonical status order.
    #[must_use]
    pub fn shares(&self) -> Vec<StatusShare> {
        let total = count_as_f64(self.total());
        TaskStatus::ALL
            .iter()
            .map(|&status| {
                let count = self.count(status);
                StatusShare {
                    status,
                    count,
                    percent: percent(count_as_f64(count), total),
                }
            })
            .collect()
    }

    #[must_use]
    pub fn completion_rate(&self) -> u32 {
        percent(count_as_f64(self.done), count_as_f64(self.total()))
    }
}

#[must_use]
pub fn completion_rate(tasks: &[Task]) -> u32 {
    StatusTally::from_tasks(tasks).completion_rate()
}

/// Open tasks whose due date is strictly before `today`. Undated tasks never are.
#[must_use]
pub fn is_overdue(task: &Task, today: Date) -> bool {
    if task.status == TaskStatus::Done {
        return false;
    }
    task.due_date.is_some_and(|due| due < today)
}

#[must_use]
pub fn overdue_count(tasks: &[Task], today: Date) -> usize {
    tasks.iter().filter(|t| is_overdue(t, today)).count()
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub overdue: usize,
    pub completion_rate: u32,
}

#[must_use]
pub fn summarize(tasks: &[Task], today: Date) -> TaskSummary {
    let tally = StatusTally::from_tasks(tasks);
    TaskSummary {
        total: tally.total(),
        completed: tally.done,
        in_progress: tally.in_progress,
        overdue: overdue_count(tasks, today),
        completion_rate: tally.completion_rate(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BoardColumn<'a> {
    pub status: TaskStatus,
    pub title: &'static str,
    pub tasks: Vec<&'a Task>,
}

/// One column per status in board order; tasks keep their snapshot order.
#[must_use]
pub fn board_columns(tasks: &[Task]) -> Vec<BoardColumn<'_>> {
    TaskStatus::ALL
        .iter()
        .map(|&status| BoardColumn {
            status,
            title: status.column_title(),
            tasks: tasks.iter().filter(|t| t.status == status).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use time::macros::date;

    fn task(id: &str, status: TaskStatus, due: Option<Date>) -> Task {
        Task::from_new(
            id.to_owned(),
            NewTask {
                title: id.to_owned(),
                status,
                assignee_id: "u1".to_owned(),
                due_date: due,
                estimated_time: 1.0,
                ..NewTask::default()
            },
        )
    }

    #[test]
    fn tally_counts_each_bucket() {
        let tasks = vec![
            task("a", TaskStatus::Todo, None),
            task("b", TaskStatus::Todo, None),
            task("c", TaskStatus::InProgress, None),
            task("d", TaskStatus::Done, None),
        ];
        let t = StatusTally::from_tasks(&tasks);
        assert_eq!((t.todo, t.in_progress, t.review, t.done), (2, 1, 0, 1));
        assert_eq!(t.total(), 4);
        assert_eq!(t.completion_rate(), 25);

        let shares = t.shares();
        assert_eq!(shares.len(), 4);
        assert_eq!(shares[0].percent, 50);
        assert_eq!(shares[2].percent, 0);
    }

    #[test]
    fn empty_set_has_zero_rate() {
        assert_eq!(completion_rate(&[]), 0);
        let s = summarize(&[], date!(2023 - 11 - 24));
        assert_eq!(s, TaskSummary::default());
    }

    #[test]
    fn overdue_requires_open_task_and_past_due_date() {
        let today = date!(2023 - 11 - 24);
        assert!(is_overdue(&task("a", TaskStatus::Todo, Some(date!(2023 - 11 - 23))), today));
        assert!(!is_overdue(&task("b", TaskStatus::Todo, Some(today)), today));
        assert!(!is_overdue(&task("c", TaskStatus::Done, Some(date!(2023 - 11 - 01))), today));
        assert!(!is_overdue(&task("d", TaskStatus::Review, None), today));
    }

    #[test]
    fn board_keeps_column_order_and_task_order() {
        let tasks = vec![
            task("a", TaskStatus::Review, None),
            task("b", TaskStatus::Todo, None),
            task("c", TaskStatus::Review, None),
        ];
        let cols = board_columns(&tasks);
        let titles: Vec<_> = cols.iter().map(|c| c.title).collect();
        assert_eq!(titles, ["To Do", "In Progress", "In Review", "Done"]);
        let review: Vec<_> = cols[2].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(review, ["a", "c"]);
        assert!(cols[3].tasks.is_empty());
    }
}
