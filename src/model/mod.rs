#![forbid(unsafe_code)]

pub mod dates;
pub mod project;
pub mod task;
pub mod time_entry;
pub mod user;

pub use project::{Project, ProjectStatus};
pub use task::{NewTask, Priority, Task, TaskStatus};
pub use time_entry::{NewTimeEntry, TimeEntry};
pub use user::User;

use uuid::Uuid;

use crate::error::PmError;

#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn ensure_not_blank(
    kind: &'static str,
    id: &str,
    field: &str,
    value: &str,
) -> Result<(), PmError> {
    if value.trim().is_empty() {
        return Err(PmError::invalid(kind, id, format!("{field} must not be empty")));
    }
    Ok(())
}

pub(crate) fn ensure_hours(
    kind: &'static str,
    id: &str,
    field: &str,
    value: f64,
) -> Result<(), PmError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PmError::invalid(
            kind,
            id,
            format!("{field} must be a non-negative number, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_percent(
    kind: &'static str,
    id: &str,
    field: &str,
    value: u8,
) -> Result<(), PmError> {
    if value > 100 {
        return Err(PmError::invalid(
            kind,
            id,
            format!("{field} must be within 0..=100, got {value}"),
        ));
    }
    Ok(())
}
