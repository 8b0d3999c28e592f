// SPDX-License-Identifier: MIT OR Apache-2.0
//! Model validation.
//!
//! Rooms pass through here before they become part of a
//! [`Project`](crate::Project), so the resolver only ever sees well-formed
//! cues.

use crate::cue::{CueId, Trigger};
use crate::room::{Room, RoomId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What to do with an "after previous" trigger on the first cue of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum FirstCuePolicy {
    /// Fail with [`ValidationError::NoPreviousCue`]
    #[default]
    Reject,
    /// Treat the cue as starting at time zero
    AnchorAtZero,
}

/// A malformed room or cue
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Duration below zero
    #[error("Cue {room}/{cue} has a negative duration ({duration}s)")]
    NegativeDuration {
        /// Room holding the cue
        room: RoomId,
        /// Offending cue
        cue: CueId,
        /// Declared duration
        duration: f64,
    },

    /// Fixed start time below zero
    #[error("Cue {room}/{cue} starts at a negative time ({time}s)")]
    NegativeTimestamp {
        /// Room holding the cue
        room: RoomId,
        /// Offending cue
        cue: CueId,
        /// Declared start time
        time: f64,
    },

    /// NaN or infinite time value
    #[error("Cue {room}/{cue} has a non-finite {field}")]
    NonFiniteValue {
        /// Room holding the cue
        room: RoomId,
        /// Offending cue
        cue: CueId,
        /// Which value ("duration" or "start time")
        field: &'static str,
    },

    /// "After previous" on the first cue of a room
    #[error("Cue {room}/{cue} follows the previous cue but is first in its room")]
    NoPreviousCue {
        /// Room holding the cue
        room: RoomId,
        /// Offending cue
        cue: CueId,
    },

    /// Cue type string that names no known type
    #[error("Cue {room}/{cue} has unknown cue type {value:?}")]
    UnknownCueType {
        /// Room holding the cue
        room: RoomId,
        /// Offending cue
        cue: CueId,
        /// The type as written
        value: String,
    },

    /// "After cue" without a target
    #[error("Cue {room}/{cue} follows another cue but names none")]
    MissingDependency {
        /// Room holding the cue
        room: RoomId,
        /// Offending cue
        cue: CueId,
    },

    /// Empty cue identifier
    #[error("Room {room} has a cue with an empty identifier")]
    EmptyCueId {
        /// Room holding the cue
        room: RoomId,
    },

    /// Two cues of one room share an identifier
    #[error("Room {room} declares cue {cue} more than once")]
    DuplicateCueId {
        /// Room holding the cues
        room: RoomId,
        /// Repeated identifier
        cue: CueId,
    },

    /// Empty room identifier
    #[error("A room has an empty identifier")]
    EmptyRoomId,

    /// Two rooms share an identifier
    #[error("Room {0} is declared more than once")]
    DuplicateRoomId(RoomId),

    /// Edit targets a room that does not exist
    #[error("Unknown room {0}")]
    UnknownRoom(RoomId),

    /// Edit targets a cue that does not exist
    #[error("Unknown cue {room}/{cue}")]
    UnknownCue {
        /// Room searched
        room: RoomId,
        /// Missing cue
        cue: CueId,
    },

    /// Insert position past the end of a room
    #[error("Position {index} is out of range for room {room} ({len} cues)")]
    CueIndexOutOfRange {
        /// Room edited
        room: RoomId,
        /// Requested position
        index: usize,
        /// Number of cues in the room
        len: usize,
    },
}

/// Result alias for model validation
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validate a room and normalise its first cue according to `policy`
pub fn validate_room(mut room: Room, policy: FirstCuePolicy) -> Result<Room> {
    if room.id.as_str().is_empty() {
        return Err(ValidationError::EmptyRoomId);
    }

    let mut seen = HashSet::with_capacity(room.cues.len());
    for (index, cue) in room.cues.iter_mut().enumerate() {
        if cue.id.as_str().is_empty() {
            return Err(ValidationError::EmptyCueId { room: room.id.clone() });
        }
        if !seen.insert(cue.id.clone()) {
            return Err(ValidationError::DuplicateCueId {
                room: room.id.clone(),
                cue: cue.id.clone(),
            });
        }

        if !cue.duration.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                room: room.id.clone(),
                cue: cue.id.clone(),
                field: "duration",
            });
        }
        if cue.duration < 0.0 {
            return Err(ValidationError::NegativeDuration {
                room: room.id.clone(),
                cue: cue.id.clone(),
                duration: cue.duration,
            });
        }

        match &cue.trigger {
            Trigger::AtTime(time) if !time.is_finite() => {
                return Err(ValidationError::NonFiniteValue {
                    room: room.id.clone(),
                    cue: cue.id.clone(),
                    field: "start time",
                });
            }
            Trigger::AtTime(time) if *time < 0.0 => {
                return Err(ValidationError::NegativeTimestamp {
                    room: room.id.clone(),
                    cue: cue.id.clone(),
                    time: *time,
                });
            }
            Trigger::AfterCue(target) if target.as_str().is_empty() => {
                return Err(ValidationError::MissingDependency {
                    room: room.id.clone(),
                    cue: cue.id.clone(),
                });
            }
            Trigger::AfterPrevious if index == 0 => match policy {
                FirstCuePolicy::Reject => {
                    return Err(ValidationError::NoPreviousCue {
                        room: room.id.clone(),
                        cue: cue.id.clone(),
                    });
                }
                FirstCuePolicy::AnchorAtZero => {
                    tracing::debug!(room = %room.id, cue = %cue.id, "first cue anchored at zero");
                    cue.trigger = Trigger::AtTime(0.0);
                }
            },
            Trigger::AtTime(_) | Trigger::AfterPrevious | Trigger::AfterCue(_) => {}
        }
    }

    Ok(room)
}

/// Validate every room and check room identifiers are unique
pub fn validate_rooms(rooms: Vec<Room>, policy: FirstCuePolicy) -> Result<Vec<Room>> {
    let mut seen = HashSet::with_capacity(rooms.len());
    rooms
        .into_iter()
        .map(|room| {
            let room = validate_room(room, policy)?;
            if !seen.insert(room.id.clone()) {
                return Err(ValidationError::DuplicateRoomId(room.id));
            }
            Ok(room)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::Cue;

    fn room_with(cues: Vec<Cue>) -> Room {
        cues.into_iter()
            .fold(Room::new("hall", "Hall"), Room::with_cue)
    }

    #[test]
    fn test_negative_duration_rejected() {
        let room = room_with(vec![Cue::new("a", "A", Trigger::AtTime(0.0), -1.0)]);
        assert!(matches!(
            validate_room(room, FirstCuePolicy::Reject),
            Err(ValidationError::NegativeDuration { duration, .. }) if duration == -1.0
        ));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let room = room_with(vec![Cue::new("a", "A", Trigger::AtTime(f64::NAN), 1.0)]);
        assert!(matches!(
            validate_room(room, FirstCuePolicy::Reject),
            Err(ValidationError::NonFiniteValue { field: "start time", .. })
        ));

        let room = room_with(vec![Cue::new("a", "A", Trigger::AtTime(0.0), f64::INFINITY)]);
        assert!(matches!(
            validate_room(room, FirstCuePolicy::Reject),
            Err(ValidationError::NonFiniteValue { field: "duration", .. })
        ));
    }

    #[test]
    fn test_first_cue_policy() {
        let room = room_with(vec![Cue::new("a", "A", Trigger::AfterPrevious, 3.0)]);

        assert_eq!(
            validate_room(room.clone(), FirstCuePolicy::Reject),
            Err(ValidationError::NoPreviousCue {
                room: RoomId::new("hall"),
                cue: CueId::new("a"),
            })
        );

        let anchored = validate_room(room, FirstCuePolicy::AnchorAtZero).unwrap();
        assert_eq!(anchored.cues[0].trigger, Trigger::AtTime(0.0));
    }

    #[test]
    fn test_after_previous_allowed_after_first() {
        let room = room_with(vec![
            Cue::new("a", "A", Trigger::AtTime(0.0), 3.0),
            Cue::new("b", "B", Trigger::AfterPrevious, 3.0),
        ]);
        let room = validate_room(room, FirstCuePolicy::Reject).unwrap();
        assert_eq!(room.cues[1].trigger, Trigger::AfterPrevious);
    }

    #[test]
    fn test_duplicate_ids() {
        let room = room_with(vec![
            Cue::new("a", "A", Trigger::AtTime(0.0), 1.0),
            Cue::new("a", "Again", Trigger::AtTime(5.0), 1.0),
        ]);
        assert!(matches!(
            validate_room(room, FirstCuePolicy::Reject),
            Err(ValidationError::DuplicateCueId { .. })
        ));

        let rooms = vec![Room::new("x", "X"), Room::new("x", "Also X")];
        assert_eq!(
            validate_rooms(rooms, FirstCuePolicy::Reject),
            Err(ValidationError::DuplicateRoomId(RoomId::new("x")))
        );
    }

    #[test]
    fn test_after_cue_needs_target() {
        let room = room_with(vec![Cue::new("a", "A", Trigger::AfterCue(CueId::new("")), 1.0)]);
        assert!(matches!(
            validate_room(room, FirstCuePolicy::Reject),
            Err(ValidationError::MissingDependency { .. })
        ));
    }
}
