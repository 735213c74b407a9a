#![forbid(unsafe_code)]

use std::fmt;

use serde::Serialize;

use crate::engine::{count_as_f64, percent, round_to_u32};
use crate::model::{Task, User};

pub const DEFAULT_SPRINT_DAYS: u32 = 5;
pub const DEFAULT_AT_CAPACITY_PERCENT: u32 = 80;
pub const FULL_CAPACITY_PERCENT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadOptions {
    pub sprint_days: u32,
    pub at_capacity_percent: u32,
}

impl Default for WorkloadOptions {
    fn default() -> Self {
        Self {
            sprint_days: DEFAULT_SPRINT_DAYS,
            at_capacity_percent: DEFAULT_AT_CAPACITY_PERCENT,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum LoadClass {
    Available,
    #[serde(rename = "At Capacity")]
    AtCapacity,
    Overallocated,
}

impl LoadClass {
    #[must_use]
    pub fn classify(percentage: u32, opts: &WorkloadOptions) -> Self {
        if percentage > FULL_CAPACITY_PERCENT {
            LoadClass::Overallocated
        } else if percentage >= opts.at_capacity_percent {
            LoadClass::AtCapacity
        } else {
            LoadClass::Available
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LoadClass::Available => "Available",
            LoadClass::AtCapacity => "At Capacity",
            LoadClass::Overallocated => "Overallocated",
        }
    }
}

impl fmt::Display for LoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub user_id: String,
    pub user_name: String,
    pub task_count: usize,
    pub total_hours: f64,
    pub sprint_capacity: f64,
    pub percentage: u32,
    pub class: LoadClass,
}

/// Tasks assigned to `user_id` that still count against capacity.
pub fn active_tasks_for<'a>(tasks: &'a [Task], user_id: &'a str) -> impl Iterator<Item = &'a Task> {
    tasks
        .iter()
        .filter(move |t| t.status.is_active() && t.assignee_id == user_id)
}

#[must_use]
pub fn user_workload(user: &User, tasks: &[Task], opts: &WorkloadOptions) -> Workload {
    let (task_count, total_hours) = active_tasks_for(tasks, &user.id)
        .fold((0usize, 0.0f64), |(n, h), t| (n + 1, h + t.estimated_time));
    let sprint_capacity = user.daily_capacity_hours * f64::from(opts.sprint_days);
    let percentage = percent(total_hours, sprint_capacity);

    Workload {
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        task_count,
        total_hours,
        sprint_capacity,
        percentage,
        class: LoadClass::classify(percentage, opts),
    }
}

#[must_use]
pub fn team_workload(users: &[User], tasks: &[Task], opts: &WorkloadOptions) -> Vec<Workload> {
    users
        .iter()
        .map(|u| user_workload(u, tasks, opts))
        .collect()
}

/// First `n` active tasks of a user, in snapshot order.
#[must_use]
pub fn top_active_tasks<'a>(tasks: &'a [Task], user_id: &'a str, n: usize) -> Vec<&'a Task> {
    active_tasks_for(tasks, user_id).take(n).collect()
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamLoad {
    pub team_size: usize,
    pub overallocated: usize,
    pub at_capacity: usize,
    pub average_utilization: u32,
}

#[must_use]
pub fn team_load(workloads: &[Workload]) -> TeamLoad {
    if workloads.is_empty() {
        return TeamLoad::default();
    }
    let sum: f64 = workloads.iter().map(|w| f64::from(w.percentage)).sum();
    TeamLoad {
        team_size: workloads.len(),
        overallocated: workloads
            .iter()
            .filter(|w| w.class == LoadClass::Overallocated)
            .count(),
        at_capacity: workloads
            .iter()
            .filter(|w| w.class == LoadClass::AtCapacity)
            .count(),
        average_utilization: round_to_u32(sum / count_as_f64(workloads.len())),
    }
}
