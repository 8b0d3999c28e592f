// SPDX-License-Identifier: MIT OR Apache-2.0
//! Validated project snapshots.
//!
//! A [`Project`] is only ever built through validation and never changes once
//! built. Edits produce a new project through the `with_*` methods, which
//! replace whole records and re-validate.

use crate::cue::{Cue, CueId};
use crate::room::{Room, RoomId};
use crate::validation::{validate_rooms, FirstCuePolicy, Result, ValidationError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project-wide address of a cue
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CueKey {
    /// Room holding the cue
    pub room: RoomId,
    /// Cue within the room
    pub cue: CueId,
}

impl CueKey {
    /// Create a key
    pub fn new(room: impl Into<RoomId>, cue: impl Into<CueId>) -> Self {
        Self {
            room: room.into(),
            cue: cue.into(),
        }
    }
}

impl fmt::Display for CueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.room, self.cue)
    }
}

/// Why an "after cue" reference could not be matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// No room holds the target
    Missing,
    /// Several other rooms hold the target
    Ambiguous(Vec<RoomId>),
}

/// Position of a cue in the project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Location {
    room: usize,
    cue: usize,
}

/// An ordered set of validated rooms
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    rooms: Vec<Room>,
    registry: IndexMap<CueKey, Location>,
    rooms_by_cue: IndexMap<CueId, Vec<usize>>,
    policy: FirstCuePolicy,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            rooms: Vec::new(),
            registry: IndexMap::new(),
            rooms_by_cue: IndexMap::new(),
            policy: FirstCuePolicy::default(),
        }
    }
}

impl Project {
    /// Validate rooms into a project, rejecting "after previous" on first cues
    pub fn new(rooms: Vec<Room>) -> Result<Self> {
        Self::with_policy(rooms, FirstCuePolicy::default())
    }

    /// Validate rooms into a project with an explicit first-cue policy
    pub fn with_policy(rooms: Vec<Room>, policy: FirstCuePolicy) -> Result<Self> {
        let rooms = validate_rooms(rooms, policy)?;

        let mut registry = IndexMap::new();
        let mut rooms_by_cue: IndexMap<CueId, Vec<usize>> = IndexMap::new();
        for (room_index, room) in rooms.iter().enumerate() {
            for (cue_index, cue) in room.cues.iter().enumerate() {
                registry.insert(
                    CueKey::new(room.id.clone(), cue.id.clone()),
                    Location {
                        room: room_index,
                        cue: cue_index,
                    },
                );
                rooms_by_cue.entry(cue.id.clone()).or_default().push(room_index);
            }
        }

        Ok(Self {
            rooms,
            registry,
            rooms_by_cue,
            policy,
        })
    }

    /// Empty rooms with the given display names, IDs derived from the names
    pub fn with_room_names<S: AsRef<str>>(names: &[S], policy: FirstCuePolicy) -> Result<Self> {
        let rooms = names.iter().map(|name| Room::named(name.as_ref())).collect();
        Self::with_policy(rooms, policy)
    }

    /// Rooms in stitching order
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Take the rooms out of the project
    pub fn into_rooms(self) -> Vec<Room> {
        self.rooms
    }

    /// Get a room by ID
    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| &room.id == room_id)
    }

    /// Position of a room in stitching order
    pub fn room_index(&self, room_id: &RoomId) -> Option<usize> {
        self.rooms.iter().position(|room| &room.id == room_id)
    }

    /// Get a cue by key
    pub fn cue(&self, key: &CueKey) -> Option<&Cue> {
        self.registry
            .get(key)
            .and_then(|loc| self.rooms.get(loc.room)?.cues.get(loc.cue))
    }

    /// Room and declaration index of a cue
    pub fn position(&self, key: &CueKey) -> Option<(usize, usize)> {
        self.registry.get(key).map(|loc| (loc.room, loc.cue))
    }

    /// Every cue key, in room order then declaration order
    pub fn cue_keys(&self) -> impl Iterator<Item = &CueKey> {
        self.registry.keys()
    }

    /// Total number of cues
    pub fn cue_count(&self) -> usize {
        self.registry.len()
    }

    /// First-cue policy the project was validated with
    pub fn policy(&self) -> FirstCuePolicy {
        self.policy
    }

    /// Find the cue an "after cue" trigger in `from_room` refers to.
    ///
    /// The referencing room wins; otherwise exactly one other room must hold
    /// the target.
    pub fn lookup(&self, from_room: &RoomId, target: &CueId) -> std::result::Result<CueKey, ReferenceError> {
        let own = CueKey::new(from_room.clone(), target.clone());
        if self.registry.contains_key(&own) {
            return Ok(own);
        }

        let holders: Vec<&Room> = self
            .rooms_by_cue
            .get(target)
            .map(|indices| indices.iter().filter_map(|&i| self.rooms.get(i)).collect())
            .unwrap_or_default();

        match holders.as_slice() {
            [] => Err(ReferenceError::Missing),
            [room] => Ok(CueKey::new(room.id.clone(), target.clone())),
            many => Err(ReferenceError::Ambiguous(
                many.iter().map(|room| room.id.clone()).collect(),
            )),
        }
    }

    /// Replace one cue with a new record
    pub fn with_cue_replaced(&self, room_id: &RoomId, cue_id: &CueId, cue: Cue) -> Result<Self> {
        self.edit_room(room_id, |room| {
            let index = room.position(cue_id).ok_or_else(|| ValidationError::UnknownCue {
                room: room_id.clone(),
                cue: cue_id.clone(),
            })?;
            room.cues[index] = cue;
            Ok(())
        })
    }

    /// Insert a cue at a declared position (`len` appends)
    pub fn with_cue_inserted(&self, room_id: &RoomId, index: usize, cue: Cue) -> Result<Self> {
        self.edit_room(room_id, |room| {
            if index > room.len() {
                return Err(ValidationError::CueIndexOutOfRange {
                    room: room_id.clone(),
                    index,
                    len: room.len(),
                });
            }
            room.cues.insert(index, cue);
            Ok(())
        })
    }

    /// Remove a cue
    pub fn with_cue_removed(&self, room_id: &RoomId, cue_id: &CueId) -> Result<Self> {
        self.edit_room(room_id, |room| {
            let index = room.position(cue_id).ok_or_else(|| ValidationError::UnknownCue {
                room: room_id.clone(),
                cue: cue_id.clone(),
            })?;
            room.cues.remove(index);
            Ok(())
        })
    }

    /// Append a room at the end of the stitching order
    pub fn with_room_added(&self, room: Room) -> Result<Self> {
        let mut rooms = self.rooms.clone();
        rooms.push(room);
        Self::with_policy(rooms, self.policy)
    }

    /// Replace a room with a new record, keeping its position
    pub fn with_room_replaced(&self, room_id: &RoomId, room: Room) -> Result<Self> {
        self.edit_room(room_id, |slot| {
            *slot = room;
            Ok(())
        })
    }

    /// Remove a room
    pub fn with_room_removed(&self, room_id: &RoomId) -> Result<Self> {
        let index = self
            .room_index(room_id)
            .ok_or_else(|| ValidationError::UnknownRoom(room_id.clone()))?;
        let mut rooms = self.rooms.clone();
        rooms.remove(index);
        Self::with_policy(rooms, self.policy)
    }

    fn edit_room(&self, room_id: &RoomId, edit: impl FnOnce(&mut Room) -> Result<()>) -> Result<Self> {
        let index = self
            .room_index(room_id)
            .ok_or_else(|| ValidationError::UnknownRoom(room_id.clone()))?;
        let mut rooms = self.rooms.clone();
        edit(&mut rooms[index])?;
        Self::with_policy(rooms, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::Trigger;

    fn sample() -> Project {
        Project::new(vec![
            Room::new("a", "A")
                .with_cue(Cue::new("intro", "Intro", Trigger::AtTime(0.0), 10.0))
                .with_cue(Cue::new("shared", "Shared", Trigger::AfterPrevious, 5.0)),
            Room::new("b", "B").with_cue(Cue::new("shared", "Shared", Trigger::AtTime(0.0), 5.0)),
            Room::new("c", "C").with_cue(Cue::new("door", "Door", Trigger::AtTime(0.0), 1.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_prefers_own_room() {
        let project = sample();
        assert_eq!(
            project.lookup(&RoomId::new("b"), &CueId::new("shared")),
            Ok(CueKey::new("b", "shared"))
        );
        assert_eq!(
            project.lookup(&RoomId::new("b"), &CueId::new("intro")),
            Ok(CueKey::new("a", "intro"))
        );
    }

    #[test]
    fn test_lookup_missing_and_ambiguous() {
        let project = sample();
        assert_eq!(
            project.lookup(&RoomId::new("a"), &CueId::new("nowhere")),
            Err(ReferenceError::Missing)
        );
        assert_eq!(
            project.lookup(&RoomId::new("c"), &CueId::new("shared")),
            Err(ReferenceError::Ambiguous(vec![RoomId::new("a"), RoomId::new("b")]))
        );
    }

    #[test]
    fn test_edits_return_new_snapshot() {
        let project = sample();
        let room = RoomId::new("c");

        let edited = project
            .with_cue_inserted(&room, 1, Cue::new("bell", "Bell", Trigger::AfterPrevious, 2.0))
            .unwrap();
        assert_eq!(project.cue_count(), 4);
        assert_eq!(edited.cue_count(), 5);
        assert_eq!(edited.position(&CueKey::new("c", "bell")), Some((2, 1)));

        let removed = edited.with_cue_removed(&room, &CueId::new("bell")).unwrap();
        assert_eq!(removed, project);
    }

    #[test]
    fn test_edits_are_validated() {
        let project = sample();
        let room = RoomId::new("c");

        // Removing the first cue would leave "after previous" at the top of room a
        assert!(matches!(
            project.with_cue_removed(&RoomId::new("a"), &CueId::new("intro")),
            Err(ValidationError::NoPreviousCue { .. })
        ));
        assert!(matches!(
            project.with_cue_inserted(&room, 9, Cue::new("x", "X", Trigger::AtTime(0.0), 1.0)),
            Err(ValidationError::CueIndexOutOfRange { index: 9, len: 1, .. })
        ));
        assert_eq!(
            project.with_room_removed(&RoomId::new("zz")),
            Err(ValidationError::UnknownRoom(RoomId::new("zz")))
        );
        assert!(matches!(
            project.with_room_added(Room::new("a", "Again")),
            Err(ValidationError::DuplicateRoomId(_))
        ));
    }

    #[test]
    fn test_replace_keeps_position() {
        let project = sample();
        let replaced = project
            .with_room_replaced(&RoomId::new("b"), Room::new("b2", "B2"))
            .unwrap();
        assert_eq!(replaced.room_index(&RoomId::new("b2")), Some(1));

        let retimed = project
            .with_cue_replaced(
                &RoomId::new("c"),
                &CueId::new("door"),
                Cue::new("door", "Door", Trigger::AtTime(30.0), 1.0),
            )
            .unwrap();
        assert_eq!(
            retimed.cue(&CueKey::new("c", "door")).map(|c| c.trigger.clone()),
            Some(Trigger::AtTime(30.0))
        );
    }
}
