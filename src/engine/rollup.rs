#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::engine::status::{StatusTally, overdue_count};
use crate::engine::workload::{TeamLoad, WorkloadOptions, team_load, team_workload};
use crate::model::{Task, TimeEntry, User};

#[must_use]
pub fn total_hours_logged(entries: &[TimeEntry]) -> f64 {
    entries.iter().map(|e| e.hours).sum()
}

/// Logged hours per user id, ordered by id.
#[must_use]
pub fn hours_by_user(entries: &[TimeEntry]) -> Vec<(String, f64)> {
    let mut by_user: BTreeMap<&str, f64> = BTreeMap::new();
    for e in entries {
        *by_user.entry(e.user_id.as_str()).or_default() += e.hours;
    }
    by_user
        .into_iter()
        .map(|(id, hours)| (id.to_owned(), hours))
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub tally: StatusTally,
    pub completion_rate: u32,
    pub overdue: usize,
    pub total_hours_logged: f64,
    pub team: TeamLoad,
}

#[must_use]
pub fn kpis(
    tasks: &[Task],
    users: &[User],
    entries: &[TimeEntry],
    today: Date,
    opts: &WorkloadOptions,
) -> Kpis {
    let tally = StatusTally::from_tasks(tasks);
    Kpis {
        tally,
        completion_rate: tally.completion_rate(),
        overdue: overdue_count(tasks, today),
        total_hours_logged: total_hours_logged(entries),
        team: team_load(&team_workload(users, tasks, opts)),
    }
}
