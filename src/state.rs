#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::PmError;
use crate::model::{self, NewTask, NewTimeEntry, Task, TaskStatus, TimeEntry};
use crate::store::Snapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Dashboard,
    Kanban,
    Gantt,
    Resources,
    Analytics,
    TimeLog,
    Settings,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Dashboard,
        View::Kanban,
        View::Gantt,
        View::Resources,
        View::Analytics,
        View::TimeLog,
        View::Settings,
    ];

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Kanban => "kanban",
            View::Gantt => "gantt",
            View::Resources => "resources",
            View::Analytics => "analytics",
            View::TimeLog => "time",
            View::Settings => "settings",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Kanban => "Kanban Board",
            View::Gantt => "Gantt Chart",
            View::Resources => "Resource Mgmt",
            View::Analytics => "Analytics",
            View::TimeLog => "Time Logging",
            View::Settings => "Settings",
        }
    }

    /// Unknown ids land on the settings placeholder.
    #[must_use]
    pub fn from_id_or_placeholder(id: &str) -> Self {
        id.parse().unwrap_or(View::Settings)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for View {
    type Err = PmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" => Ok(View::Dashboard),
            "kanban" | "board" => Ok(View::Kanban),
            "gantt" | "timeline" => Ok(View::Gantt),
            "resources" => Ok(View::Resources),
            "analytics" => Ok(View::Analytics),
            "time" | "timelog" => Ok(View::TimeLog),
            "settings" => Ok(View::Settings),
            other => Err(PmError::Other(format!("unknown view '{other}'"))),
        }
    }
}

/// Owned by the CLI controller; views only read it.
///
/// Fields are private: the snapshot changes only through [`AppState::create_task`]
/// and [`AppState::add_time_entry`], the view only through [`AppState::switch_view`].
#[derive(Debug, Clone)]
pub struct AppState {
    view: View,
    snapshot: Snapshot,
    dirty: bool,
}

impl AppState {
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            view: View::default(),
            snapshot,
            dirty: false,
        }
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.snapshot.tasks
    }

    #[must_use]
    pub fn time_entries(&self) -> &[TimeEntry] {
        &self.snapshot.time_entries
    }

    /// Whether an action changed the snapshot since it was loaded.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn switch_view(&mut self, view: View) {
        if self.view != view {
            debug!(from = %self.view, to = %view, "switch view");
        }
        self.view = view;
    }

    /// Assigns a fresh id, validates and appends the task.
    ///
    /// A task created as Done without a completion time is stamped with the
    /// current time. Unknown assignees and dependencies are accepted; lookups
    /// on them simply find nothing.
    pub fn create_task(&mut self, draft: NewTask) -> Result<&Task, PmError> {
        let mut task = Task::from_new(model::new_id(), draft);
        if task.status == TaskStatus::Done && task.completed_at.is_none() {
            task.completed_at = Some(OffsetDateTime::now_utc());
        }
        task.validate()?;
        info!(id = %task.id, title = %task.title, "task created");
        self.snapshot.tasks.push(task);
        self.dirty = true;
        self.snapshot
            .tasks
            .last()
            .ok_or_else(|| PmError::Other("task list empty after push".to_owned()))
    }

    pub fn add_time_entry(&mut self, draft: NewTimeEntry) -> Result<&TimeEntry, PmError> {
        let entry = TimeEntry::from_new(model::new_id(), draft);
        entry.validate()?;
        info!(id = %entry.id, task = %entry.task_id, hours = entry.hours, "time logged");
        self.snapshot.time_entries.push(entry);
        self.dirty = true;
        self.snapshot
            .time_entries
            .last()
            .ok_or_else(|| PmError::Other("time entry list empty after push".to_owned()))
    }
}
