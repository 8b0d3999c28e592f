// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show file format.
//!
//! Projects are saved as JSON: rooms in order, each with its cues in order.
//! Resolved times and lanes are never written; they are recomputed on load.
//! Older files without IDs or a version field still load.

use crate::cue::{Activation, Cue, CueId, CueType, PlayBehaviour, Trigger, TriggerKind};
use crate::project::Project;
use crate::room::{Room, RoomId};
use crate::validation::{FirstCuePolicy, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Current show file format version
pub const FORMAT_VERSION: u32 = 1;

/// Error reading or writing a show file
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Malformed JSON or wrong field types
    #[error("Invalid show file: {0}")]
    Json(#[from] serde_json::Error),

    /// File written by a newer version
    #[error("Show file version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// Contents fail model validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result alias for show file conversion
pub type Result<T> = std::result::Result<T, DocumentError>;

/// A saved show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowDocument {
    /// Format version; absent in the oldest files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Rooms in order
    #[serde(default)]
    pub rooms: Vec<RoomRecord>,
}

/// A saved room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Room ID; derived from the name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Cues in order
    #[serde(default)]
    pub cues: Vec<CueRecord>,
}

/// A saved cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueRecord {
    /// Cue ID; derived from the name when absent, unique within the room
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Cue type display name
    #[serde(default)]
    pub cue_type: Option<String>,
    /// Older name of `cue_type`, read when `cue_type` is absent or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// How operators fire the cue
    #[serde(default)]
    pub trigger_type: Activation,
    /// Playback behaviour
    #[serde(default)]
    pub play_type: PlayBehaviour,
    /// Start rule
    #[serde(default)]
    pub start_mode: TriggerKind,
    /// Start time for fixed-time cues
    #[serde(default)]
    pub start_time_s: f64,
    /// Duration in seconds
    #[serde(default)]
    pub duration_s: f64,
    /// Cue followed by "after cue" cues
    #[serde(default)]
    pub dependency_name: Option<String>,
    /// Operator notes
    #[serde(default)]
    pub notes: String,
}

impl CueRecord {
    fn from_cue(cue: &Cue) -> Self {
        let (start_time_s, dependency_name) = match &cue.trigger {
            Trigger::AtTime(time) => (*time, None),
            Trigger::AfterPrevious => (0.0, None),
            Trigger::AfterCue(target) => (0.0, Some(target.to_string())),
        };
        Self {
            id: Some(cue.id.to_string()),
            name: cue.name.clone(),
            cue_type: Some(cue.cue_type.name().to_string()),
            media_type: None,
            trigger_type: cue.activation,
            play_type: cue.play,
            start_mode: cue.trigger.kind(),
            start_time_s,
            duration_s: cue.duration,
            dependency_name,
            notes: cue.notes.clone(),
        }
    }

    fn into_cue(self, room: &RoomId, id: CueId, target: Option<CueId>) -> std::result::Result<Cue, ValidationError> {
        let type_name = [self.cue_type.as_deref(), self.media_type.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty());
        let cue_type = match type_name {
            None => CueType::default(),
            Some(value) => value.parse().map_err(|_| ValidationError::UnknownCueType {
                room: room.clone(),
                cue: id.clone(),
                value: value.to_string(),
            })?,
        };

        let trigger = match self.start_mode {
            TriggerKind::AtTime => Trigger::AtTime(self.start_time_s),
            TriggerKind::AfterPrevious => Trigger::AfterPrevious,
            TriggerKind::AfterCue => Trigger::AfterCue(target.unwrap_or_else(|| CueId::new(""))),
        };

        Ok(Cue {
            id,
            name: self.name,
            cue_type,
            activation: self.trigger_type,
            play: self.play_type,
            trigger,
            duration: self.duration_s,
            notes: self.notes,
        })
    }
}

/// Pick an unused ID for a cue saved without one: its name, then `name-2`, `name-3`, ...
fn unused_cue_id(name: &str, taken: &mut HashSet<String>) -> CueId {
    let base = if name.is_empty() { "cue" } else { name };
    let mut candidate = base.to_string();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    taken.insert(candidate.clone());
    CueId::new(candidate)
}

/// Convert one room's cue records.
///
/// Cues saved without an ID name their "after cue" target by display name;
/// the target is the nearest earlier cue with that name, falling back to the
/// name itself.
fn room_cues(room: &RoomId, records: Vec<CueRecord>) -> std::result::Result<Vec<Cue>, ValidationError> {
    let mut taken: HashSet<String> = records.iter().filter_map(|record| record.id.clone()).collect();
    let mut earlier: Vec<(String, CueId)> = Vec::with_capacity(records.len());
    let mut cues = Vec::with_capacity(records.len());

    for record in records {
        let by_name = record.id.is_none();
        let id = match &record.id {
            Some(id) => CueId::new(id.as_str()),
            None => {
                let id = unused_cue_id(&record.name, &mut taken);
                if id.as_str() != record.name {
                    tracing::warn!("cue {:?} in room {} has no ID, reading it as {}", record.name, room, id);
                }
                id
            }
        };

        let target = record
            .dependency_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| {
                let nearest = by_name
                    .then(|| earlier.iter().rev().find(|(earlier_name, _)| earlier_name == name))
                    .flatten();
                match nearest {
                    Some((_, earlier_id)) => earlier_id.clone(),
                    None => CueId::new(name),
                }
            });

        earlier.push((record.name.clone(), id.clone()));
        cues.push(record.into_cue(room, id, target)?);
    }

    Ok(cues)
}

impl ShowDocument {
    /// Capture a project
    pub fn from_project(project: &Project) -> Self {
        let rooms = project
            .rooms()
            .iter()
            .map(|room| RoomRecord {
                id: Some(room.id.to_string()),
                name: room.name.clone(),
                cues: room.cues.iter().map(CueRecord::from_cue).collect(),
            })
            .collect();

        Self {
            version: Some(FORMAT_VERSION),
            rooms,
        }
    }

    /// Validate into a project
    pub fn into_project(self, policy: FirstCuePolicy) -> Result<Project> {
        match self.version {
            Some(found) if found > FORMAT_VERSION => {
                return Err(DocumentError::UnsupportedVersion {
                    found,
                    supported: FORMAT_VERSION,
                });
            }
            Some(_) => {}
            None => tracing::warn!("show file has no version, reading as version {}", FORMAT_VERSION),
        }

        let mut rooms = Vec::with_capacity(self.rooms.len());
        for record in self.rooms {
            let id = match record.id {
                Some(id) => RoomId::new(id),
                None => RoomId::from_name(&record.name),
            };
            let cues = room_cues(&id, record.cues)?;
            rooms.push(Room {
                id,
                name: record.name,
                cues,
            });
        }

        Ok(Project::with_policy(rooms, policy)?)
    }
}

/// Serialize a project as pretty-printed JSON
pub fn to_json_string(project: &Project) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ShowDocument::from_project(project))?)
}

/// Parse and validate a project from JSON
pub fn from_json_str(json: &str, policy: FirstCuePolicy) -> Result<Project> {
    let document: ShowDocument = serde_json::from_str(json)?;
    document.into_project(policy)
}
