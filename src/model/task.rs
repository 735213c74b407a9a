#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::error::PmError;
use crate::model::{dates, ensure_hours, ensure_not_blank, ensure_percent};

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum TaskStatus {
    #[default]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
        }
    }

    /// Title of the board column holding this status.
    #[must_use]
    pub fn column_title(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "In Review",
            TaskStatus::Done => "Done",
        }
    }

    /// Todo, In Progress and Review count against capacity; Done does not.
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = PmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match norm.as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "inprogress" | "doing" => Ok(TaskStatus::InProgress),
            "review" | "inreview" => Ok(TaskStatus::Review),
            "done" | "completed" => Ok(TaskStatus::Done),
            _ => Err(PmError::Other(format!(
                "unknown status '{s}' (expected todo, in-progress, review, done)"
            ))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = PmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" | "crit" => Ok(Priority::Critical),
            _ => Err(PmError::Other(format!(
                "unknown priority '{s}' (expected low, medium, high, critical)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assignee_id: String,
    #[serde(default, with = "dates::opt_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    #[serde(default, with = "dates::opt_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    pub estimated_time: f64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(
        default,
        alias = "completed_at",
        with = "dates::opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl Task {
    #[must_use]
    pub fn from_new(id: String, new: NewTask) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            assignee_id: new.assignee_id,
            start_date: new.start_date,
            due_date: new.due_date,
            estimated_time: new.estimated_time,
            tags: new.tags,
            dependencies: new.dependencies,
            completed_at: new.completed_at,
            progress: new.progress,
        }
    }

    pub fn validate(&self) -> Result<(), PmError> {
        const KIND: &str = "task";
        ensure_not_blank(KIND, &self.id, "id", &self.id)?;
        ensure_not_blank(KIND, &self.id, "title", &self.title)?;
        ensure_hours(KIND, &self.id, "estimatedTime", self.estimated_time)?;
        if let Some(p) = self.progress {
            ensure_percent(KIND, &self.id, "progress", p)?;
        }
        if let (Some(start), Some(due)) = (self.start_date, self.due_date)
            && due < start
        {
            return Err(PmError::invalid(
                KIND,
                &self.id,
                format!(
                    "due date {} precedes start date {}",
                    dates::format_date(due),
                    dates::format_date(start)
                ),
            ));
        }
        if self.dependencies.iter().any(|d| d == &self.id) {
            return Err(PmError::invalid(KIND, &self.id, "task depends on itself"));
        }
        Ok(())
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Caller-supplied fields of a task; the identifier is assigned on creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assignee_id: String,
    #[serde(with = "dates::opt_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    #[serde(with = "dates::opt_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    pub estimated_time: f64,
    pub tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(
        alias = "completed_at",
        with = "dates::opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn task() -> Task {
        Task::from_new(
            "t1".to_owned(),
            NewTask {
                title: "Write docs".to_owned(),
                assignee_id: "u1".to_owned(),
                start_date: Some(date!(2023 - 11 - 20)),
                due_date: Some(date!(2023 - 11 - 22)),
                estimated_time: 4.0,
                ..NewTask::default()
            },
        )
    }

    #[test]
    fn status_parses_loose_spellings() {
        assert_eq!("in progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("In-Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("DONE".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn status_serializes_with_display_names() {
        let s = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(s, "\"In Progress\"");
        let back: TaskStatus = serde_json::from_str("\"Review\"").unwrap();
        assert_eq!(back, TaskStatus::Review);
    }

    #[test]
    fn only_done_is_inactive() {
        let active: Vec<_> = TaskStatus::ALL.iter().filter(|s| s.is_active()).collect();
        assert_eq!(active.len(), 3);
        assert!(!TaskStatus::Done.is_active());
    }

    #[test]
    fn valid_task_passes() {
        task().validate().unwrap();
    }

    #[test]
    fn due_before_start_is_rejected() {
        let mut t = task();
        t.due_date = Some(date!(2023 - 11 - 19));
        let err = t.validate().unwrap_err();
        assert!(err.to_string().contains("precedes start date"));
    }

    #[test]
    fn negative_or_nan_estimate_is_rejected() {
        let mut t = task();
        t.estimated_time = -1.0;
        assert!(t.validate().is_err());
        t.estimated_time = f64::NAN;
        assert!(t.validate().is_err());
    }

    #[test]
    fn progress_over_100_is_rejected() {
        let mut t = task();
        t.progress = Some(101);
        assert!(t.validate().is_err());
    }

    #[test]
    fn deserializes_camel_case_with_optional_fields() {
        let raw = r#"{
            "id": "t9",
            "title": "Setup CI",
            "status": "Done",
            "priority": "Medium",
            "assigneeId": "u3",
            "startDate": "2023-11-15",
            "dueDate": "",
            "estimatedTime": 6,
            "tags": ["devops"],
            "completedAt": "2023-11-18T16:30:00Z"
        }"#;
        let t: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(t.due_date, None);
        assert_eq!(t.start_date, Some(date!(2023 - 11 - 15)));
        assert!(t.has_tag("DevOps"));
        assert_eq!(t.completed_at.map(|c| c.date()), Some(date!(2023 - 11 - 18)));
        assert!(t.dependencies.is_empty());
    }

    fn with_due(raw_due: &str) -> Task {
        let raw = format!(
            r#"{{"id":"t1","title":"Ship","status":"Todo","priority":"High","assigneeId":"u1","estimatedTime":2,"dueDate":"{raw_due}"}}"#
        );
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn timestamped_due_dates_load_as_calendar_days() {
        let early = with_due("2023-11-20T00:00:00Z");
        let late = with_due("2023-11-20T23:59:00Z");
        assert_eq!(early.due_date, Some(date!(2023 - 11 - 20)));
        assert_eq!(early.due_date, late.due_date);
        for today in [date!(2023 - 11 - 19), date!(2023 - 11 - 20), date!(2023 - 11 - 21)] {
            assert_eq!(
                crate::engine::is_overdue(&early, today),
                crate::engine::is_overdue(&late, today)
            );
        }
        assert!(crate::engine::is_overdue(&late, date!(2023 - 11 - 21)));
        assert!(!crate::engine::is_overdue(&late, date!(2023 - 11 - 20)));
    }

    #[test]
    fn snake_case_completion_key_is_read() {
        let raw = r#"{
            "id": "t4",
            "title": "Setup CI",
            "status": "Done",
            "priority": "Medium",
            "assigneeId": "u3",
            "estimatedTime": 6,
            "completed_at": "2023-11-18T16:30:00Z"
        }"#;
        let t: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(t.completed_at.map(|c| c.date()), Some(date!(2023 - 11 - 18)));

        let draft: NewTask =
            serde_json::from_str(r#"{"title":"Cut release","completed_at":"2023-11-23"}"#).unwrap();
        assert_eq!(draft.completed_at.map(|c| c.date()), Some(date!(2023 - 11 - 23)));
    }
}
