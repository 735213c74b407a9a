#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::PmError;
use crate::model::{dates, ensure_hours, ensure_not_blank};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub task_id: String,
    pub user_id: String,
    pub hours: f64,
    #[serde(with = "dates::date")]
    pub date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TimeEntry {
    #[must_use]
    pub fn from_new(id: String, new: NewTimeEntry) -> Self {
        Self {
            id,
            task_id: new.task_id,
            user_id: new.user_id,
            hours: new.hours,
            date: new.date,
            description: new.description,
        }
    }

    pub fn validate(&self) -> Result<(), PmError> {
        ensure_not_blank("time entry", &self.id, "id", &self.id)?;
        ensure_not_blank("time entry", &self.id, "taskId", &self.task_id)?;
        ensure_not_blank("time entry", &self.id, "userId", &self.user_id)?;
        ensure_hours("time entry", &self.id, "hours", self.hours)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeEntry {
    pub task_id: String,
    pub user_id: String,
    pub hours: f64,
    pub date: Date,
    pub description: Option<String>,
}
