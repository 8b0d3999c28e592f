// SPDX-License-Identifier: MIT OR Apache-2.0
//! Room definitions for the timeline.

use crate::cue::{Cue, CueId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a room, unique within a project
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Create a room ID from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an ID from a display name ("Road to Yemen" -> "road-to-yemen")
    pub fn from_name(name: &str) -> Self {
        let slug = name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        Self(slug)
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A physical room with its cues in declared order.
///
/// The order of `cues` is what "previous" means for
/// [`Trigger::AfterPrevious`](crate::Trigger::AfterPrevious), independent of
/// when the cues end up starting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Room ID
    pub id: RoomId,
    /// Display name
    pub name: String,
    /// Cues in declared order
    pub cues: Vec<Cue>,
}

impl Room {
    /// Create an empty room
    pub fn new(id: impl Into<RoomId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cues: Vec::new(),
        }
    }

    /// Create an empty room whose ID is derived from its name
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: RoomId::from_name(&name),
            name,
            cues: Vec::new(),
        }
    }

    /// Append a cue
    pub fn with_cue(mut self, cue: Cue) -> Self {
        self.cues.push(cue);
        self
    }

    /// Get a cue by ID
    pub fn cue(&self, cue_id: &CueId) -> Option<&Cue> {
        self.cues.iter().find(|c| &c.id == cue_id)
    }

    /// Declared position of a cue
    pub fn position(&self, cue_id: &CueId) -> Option<usize> {
        self.cues.iter().position(|c| &c.id == cue_id)
    }

    /// The cue declared just before position `index`
    pub fn previous(&self, index: usize) -> Option<&Cue> {
        index.checked_sub(1).and_then(|i| self.cues.get(i))
    }

    /// Number of cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Whether the room has no cues
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}
