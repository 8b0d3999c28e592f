// SPDX-License-Identifier: MIT OR Apache-2.0
//! An open show.
//!
//! The current project is an `Arc` snapshot behind a lock. Readers clone the
//! `Arc` and plan without holding the lock; writers replace the whole
//! snapshot, so a planning pass never sees an edit made after it started.

use crate::error::Result;
use crate::show_file;
use cueplan_timeline::{plan, FirstCuePolicy, Project, TimelinePlan, ValidationError};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A show file with its current snapshot
pub struct ShowSession {
    path: PathBuf,
    current: RwLock<Arc<Project>>,
}

impl ShowSession {
    /// Open a show file
    pub fn open(path: &Path, policy: FirstCuePolicy) -> Result<Self> {
        let project = show_file::load_show(path, policy)?;
        Ok(Self::with_project(path, project))
    }

    /// Start a session on a project that is not saved yet
    pub fn with_project(path: &Path, project: Project) -> Self {
        Self {
            path: path.to_path_buf(),
            current: RwLock::new(Arc::new(project)),
        }
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<Project> {
        self.current.read().clone()
    }

    /// Plan the current snapshot
    pub fn plan(&self) -> Result<TimelinePlan> {
        let snapshot = self.snapshot();
        Ok(plan(&snapshot)?)
    }

    /// Replace the snapshot with the result of `edit`.
    ///
    /// Writers are serialized; a failed edit leaves the session unchanged.
    pub fn apply(
        &self,
        description: &str,
        edit: impl FnOnce(&Project) -> std::result::Result<Project, ValidationError>,
    ) -> Result<Arc<Project>> {
        let mut current = self.current.write();
        let edited = Arc::new(edit(&current)?);
        *current = edited.clone();

        tracing::debug!(edit = description, cues = edited.cue_count(), "show edited");
        Ok(edited)
    }

    /// Write the current snapshot to the show file
    pub fn save(&self) -> Result<()> {
        let snapshot = self.snapshot();
        show_file::save_show(&self.path, &snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use cueplan_timeline::{Cue, CueId, Room, RoomId, Trigger};

    fn session(path: &Path) -> ShowSession {
        let project = Project::new(vec![
            Room::new("hall", "Hall").with_cue(Cue::new("a", "A", Trigger::AtTime(0.0), 10.0))
        ])
        .unwrap();
        ShowSession::with_project(path, project)
    }

    #[test]
    fn test_apply_replans() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir.path().join("show.json"));
        let hall = RoomId::new("hall");

        session
            .apply("add b", |p| p.with_cue_inserted(&hall, 1, Cue::new("b", "B", Trigger::AfterPrevious, 5.0)))
            .unwrap();
        assert_eq!(session.plan().unwrap().total_duration(), 15.0);
        assert_eq!(session.snapshot().cue_count(), 2);
    }

    #[test]
    fn test_failed_edit_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir.path().join("show.json"));
        let before = session.snapshot();

        let result = session.apply("remove ghost", |p| p.with_cue_removed(&RoomId::new("hall"), &CueId::new("ghost")));
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(Arc::ptr_eq(&before, &session.snapshot()));
    }

    #[test]
    fn test_snapshot_unaffected_by_later_edits() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir.path().join("show.json"));
        let held = session.snapshot();

        session
            .apply("remove a", |p| p.with_cue_removed(&RoomId::new("hall"), &CueId::new("a")))
            .unwrap();
        assert_eq!(held.cue_count(), 1);
        assert_eq!(session.snapshot().cue_count(), 0);
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("show.json");
        let session = session(&path);
        session.save().unwrap();

        let reopened = ShowSession::open(&path, FirstCuePolicy::Reject).unwrap();
        assert_eq!(reopened.snapshot(), session.snapshot());
    }
}
