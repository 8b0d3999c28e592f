// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reading and writing show files on disk.

use crate::error::{AppError, Result};
use cueplan_timeline::document::{from_json_str, to_json_string};
use cueplan_timeline::{FirstCuePolicy, Project};
use std::path::Path;

/// Show file extension
pub const SHOW_FILE_EXTENSION: &str = "json";

/// Reject paths without the show file extension
pub fn ensure_show_path(path: &Path) -> Result<()> {
    let is_show = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SHOW_FILE_EXTENSION));
    if is_show {
        Ok(())
    } else {
        Err(AppError::NotAShowFile(path.to_path_buf()))
    }
}

/// Load and validate a show file
pub fn load_show(path: &Path, policy: FirstCuePolicy) -> Result<Project> {
    ensure_show_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let project = from_json_str(&content, policy).map_err(|source| AppError::Document {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        "Opened show {:?}: {} room(s), {} cue(s)",
        path,
        project.rooms().len(),
        project.cue_count()
    );
    Ok(project)
}

/// Write a project to a show file
pub fn save_show(path: &Path, project: &Project) -> Result<()> {
    ensure_show_path(path)?;
    let content = to_json_string(project).map_err(|source| AppError::Document {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("Saved show {:?}", path);
    Ok(())
}

/// Create a new show file with empty rooms, refusing to overwrite
pub fn create_show<S: AsRef<str>>(path: &Path, rooms: &[S], policy: FirstCuePolicy) -> Result<Project> {
    ensure_show_path(path)?;
    if path.exists() {
        return Err(AppError::AlreadyExists(path.to_path_buf()));
    }

    let project = Project::with_room_names(rooms, policy)?;
    save_show(path, &project)?;
    tracing::info!("Created show {:?} with {} room(s)", path, project.rooms().len());
    Ok(project)
}
