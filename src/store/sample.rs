#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use time::Date;
use time::macros::{date, datetime};

use crate::model::{Priority, Project, ProjectStatus, Task, TaskStatus, TimeEntry, User};
use crate::store::Snapshot;

/// The demo workspace shipped with the binary: one small team in Nov 2023.
#[must_use]
pub fn sample_snapshot() -> Snapshot {
    Snapshot {
        users: vec![
            user("u1", "Alex Chen", "Product Manager", 1005, 8.0),
            user("u2", "Sam Taylor", "Frontend Dev", 1012, 8.0),
            user("u3", "Morgan Kim", "Backend Dev", 1025, 8.0),
            user("u4", "Jordan Lee", "Designer", 1027, 6.0),
        ],
        tasks: vec![
            task(
                "t1",
                "Design System Architecture Review",
                TaskStatus::Todo,
                Priority::High,
                "u4",
                (date!(2023 - 11 - 20), date!(2023 - 11 - 22)),
                8.0,
                &["design", "architecture"],
            ),
            Task {
                dependencies: vec!["t1".to_owned()],
                ..task(
                    "t2",
                    "Implement User Auth Flow",
                    TaskStatus::InProgress,
                    Priority::High,
                    "u3",
                    (date!(2023 - 11 - 21), date!(2023 - 11 - 24)),
                    16.0,
                    &["backend", "security"],
                )
            },
            task(
                "t3",
                "Dashboard UI Components",
                TaskStatus::InProgress,
                Priority::Medium,
                "u2",
                (date!(2023 - 11 - 22), date!(2023 - 11 - 25)),
                12.0,
                &["frontend", "ui"],
            ),
            Task {
                completed_at: Some(datetime!(2023-11-18 16:30 UTC)),
                progress: Some(100),
                ..task(
                    "t4",
                    "Setup CI/CD Pipeline",
                    TaskStatus::Done,
                    Priority::Medium,
                    "u3",
                    (date!(2023 - 11 - 15), date!(2023 - 11 - 18)),
                    6.0,
                    &["devops"],
                )
            },
            task(
                "t5",
                "User Research Interviews",
                TaskStatus::Todo,
                Priority::Low,
                "u1",
                (date!(2023 - 11 - 25), date!(2023 - 11 - 28)),
                10.0,
                &["product"],
            ),
            task(
                "t6",
                "API Documentation",
                TaskStatus::Review,
                Priority::Medium,
                "u3",
                (date!(2023 - 11 - 23), date!(2023 - 11 - 24)),
                4.0,
                &["docs"],
            ),
        ],
        time_entries: vec![
            entry("te1", "t4", "u3", 7.0, date!(2023 - 11 - 16)),
            entry("te2", "t2", "u3", 5.0, date!(2023 - 11 - 21)),
            entry("te3", "t3", "u2", 4.0, date!(2023 - 11 - 22)),
        ],
        projects: vec![
            Project {
                id: "p1".to_owned(),
                name: "InsightPM Platform".to_owned(),
                description: "Core project management platform".to_owned(),
                status: ProjectStatus::Active,
                progress: 68,
            },
            Project {
                id: "p2".to_owned(),
                name: "Mobile App Dev".to_owned(),
                description: "iOS and Android native apps".to_owned(),
                status: ProjectStatus::Active,
                progress: 34,
            },
        ],
    }
}

fn user(id: &str, name: &str, role: &str, photo: u32, capacity: f64) -> User {
    User {
        id: id.to_owned(),
        name: name.to_owned(),
        role: role.to_owned(),
        avatar: format!("https://picsum.photos/id/{photo}/40/40"),
        daily_capacity_hours: capacity,
    }
}

#[allow(clippy::too_many_arguments)]
fn task(
    id: &str,
    title: &str,
    status: TaskStatus,
    priority: Priority,
    assignee: &str,
    (start, due): (Date, Date),
    estimate: f64,
    tags: &[&str],
) -> Task {
    Task {
        id: id.to_owned(),
        title: title.to_owned(),
        description: None,
        status,
        priority,
        assignee_id: assignee.to_owned(),
        start_date: Some(start),
        due_date: Some(due),
        estimated_time: estimate,
        tags: tags.iter().map(|t| (*t).to_owned()).collect::<BTreeSet<_>>(),
        dependencies: Vec::new(),
        completed_at: None,
        progress: None,
    }
}

fn entry(id: &str, task_id: &str, user_id: &str, hours: f64, date: Date) -> TimeEntry {
    TimeEntry {
        id: id.to_owned(),
        task_id: task_id.to_owned(),
        user_id: user_id.to_owned(),
        hours,
        date,
        description: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_valid() {
        let s = sample_snapshot();
        s.validate().unwrap();
        assert_eq!(s.users.len(), 4);
        assert_eq!(s.tasks.len(), 6);
        assert_eq!(s.time_entries.len(), 3);
        assert_eq!(s.projects.len(), 2);
    }
}
