#![forbid(unsafe_code)]

pub mod sample;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PmError;
use crate::model::{NewTask, Project, Task, TimeEntry, User};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub tasks: Vec<Task>,
    pub time_entries: Vec<TimeEntry>,
    pub projects: Vec<Project>,
}

impl Snapshot {
    /// Rejects records the engine cannot aggregate meaningfully.
    pub fn validate(&self) -> Result<(), PmError> {
        for u in &self.users {
            u.validate()?;
        }
        for t in &self.tasks {
            t.validate()?;
        }
        for e in &self.time_entries {
            e.validate()?;
        }
        for p in &self.projects {
            p.validate()?;
        }
        ensure_unique("user", self.users.iter().map(|u| u.id.as_str()))?;
        ensure_unique("task", self.tasks.iter().map(|t| t.id.as_str()))?;
        ensure_unique("time entry", self.time_entries.iter().map(|e| e.id.as_str()))?;
        ensure_unique("project", self.projects.iter().map(|p| p.id.as_str()))?;
        Ok(())
    }

    #[must_use]
    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn find_user(&self, id: &str) -> Option<&User> {
        crate::model::user::find_user(&self.users, id)
    }

    /// Name of the user, or the raw id when the reference dangles.
    #[must_use]
    pub fn user_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.find_user(id).map_or(id, |u| u.name.as_str())
    }
}

fn ensure_unique<'a>(kind: &'static str, ids: impl Iterator<Item = &'a str>) -> Result<(), PmError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(PmError::invalid(kind, id, "duplicate id"));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    File,
    Sample,
    Empty,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> anyhow::Result<Snapshot> {
        let data = std::fs::read(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let snapshot: Snapshot = serde_json::from_slice(&data)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        snapshot
            .validate()
            .with_context(|| format!("invalid workspace {}", self.path.display()))?;
        debug!(
            path = %self.path.display(),
            tasks = snapshot.tasks.len(),
            entries = snapshot.time_entries.len(),
            "loaded workspace"
        );
        Ok(snapshot)
    }

    /// Loads the workspace file, falling back to the sample or an empty workspace.
    pub fn load_or_fallback(&self, use_sample: bool) -> anyhow::Result<(Snapshot, SnapshotSource)> {
        if self.exists() {
            return Ok((self.load()?, SnapshotSource::File));
        }
        if use_sample {
            info!(path = %self.path.display(), "workspace not found, using sample data");
            return Ok((sample::sample_snapshot(), SnapshotSource::Sample));
        }
        info!(path = %self.path.display(), "workspace not found, starting empty");
        Ok((Snapshot::default(), SnapshotSource::Empty))
    }

    pub fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        snapshot.validate()?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let mut data = serde_json::to_vec_pretty(snapshot)?;
        data.push(b'\n');
        std::fs::write(&tmp, &data)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "failed to rename {} -> {}",
                tmp.display(),
                self.path.display()
            )
        })?;
        debug!(path = %self.path.display(), "saved workspace");
        Ok(())
    }
}

/// Reads a list of task drafts from YAML or JSON (JSON is valid YAML).
pub fn read_task_drafts(path: &Path) -> anyhow::Result<Vec<NewTask>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let drafts: Vec<NewTask> = if is_json {
        serde_json::from_str(&data).with_context(|| format!("failed to parse JSON: {}", path.display()))?
    } else {
        serde_yaml::from_str(&data).with_context(|| format!("failed to parse YAML: {}", path.display()))?
    };
    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut s = sample::sample_snapshot();
        let dup = s.tasks[0].clone();
        s.tasks.push(dup);
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate id"));
    }

    #[test]
    fn save_then_load_preserves_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("nested").join("workspace.json"));
        let snapshot = sample::sample_snapshot();

        store.save(&snapshot).unwrap();
        assert!(store.exists());
        assert!(!store.path().with_extension("json.tmp").exists());
        assert_eq!(store.load().unwrap(), snapshot);
    }

    #[test]
    fn missing_file_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("none.json"));

        let (s, src) = store.load_or_fallback(true).unwrap();
        assert_eq!(src, SnapshotSource::Sample);
        assert_eq!(s.tasks.len(), 6);

        let (s, src) = store.load_or_fallback(false).unwrap();
        assert_eq!(src, SnapshotSource::Empty);
        assert!(s.tasks.is_empty());
    }

    #[test]
    fn invalid_hours_in_file_fail_to_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("workspace.json");
        std::fs::write(
            &path,
            r#"{"timeEntries":[{"id":"e1","taskId":"t1","userId":"u1","hours":-3,"date":"2023-11-20"}]}"#,
        )
        .unwrap();
        let err = SnapshotStore::new(path).load().unwrap_err();
        assert!(format!("{err:#}").contains("non-negative"));
    }

    #[test]
    fn unparseable_dates_fail_to_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("workspace.json");
        std::fs::write(
            &path,
            r#"{"timeEntries":[{"id":"e1","taskId":"t1","userId":"u1","hours":3,"date":"yesterday"}]}"#,
        )
        .unwrap();
        assert!(SnapshotStore::new(path).load().is_err());
    }

    #[test]
    fn reads_yaml_drafts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tasks.yaml");
        std::fs::write(
            &path,
            "- title: Load testing\n  assigneeId: u3\n  status: In Progress\n  estimatedTime: 5\n  dueDate: 2023-12-01\n  tags: [perf]\n- title: Release notes\n  assigneeId: u1\n",
        )
        .unwrap();
        let drafts = read_task_drafts(&path).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].status, TaskStatus::InProgress);
        assert!(drafts[0].due_date.is_some());
        assert_eq!(drafts[1].status, TaskStatus::Todo);
    }
}
