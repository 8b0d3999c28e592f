// SPDX-License-Identifier: MIT OR Apache-2.0
//! Global stitching.
//!
//! Rooms are laid end to end in project order: each room starts where the
//! previous one's span ends, giving the whole show one time axis.

use crate::lanes::{self, LaneAssignment};
use crate::project::Project;
use crate::resolver::{ResolvedCue, RoomSchedule};
use crate::room::RoomId;
use serde::{Deserialize, Serialize};

/// Time from the earliest start (never later than zero) to the latest end.
///
/// An empty room spans nothing.
pub fn room_span(cues: &[ResolvedCue]) -> f64 {
    if cues.is_empty() {
        return 0.0;
    }
    let earliest = cues.iter().map(|c| c.start).fold(0.0_f64, f64::min);
    let latest = cues.iter().map(|c| c.end).fold(f64::NEG_INFINITY, f64::max);
    (latest - earliest).max(0.0)
}

/// One room placed on the global axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchedRoom {
    /// Room ID
    pub room: RoomId,
    /// Room display name
    pub name: String,
    /// Global time at which the room starts
    pub offset: f64,
    /// Length of the room on the global axis
    pub span: f64,
    /// Lanes used by the room
    pub lane_count: usize,
    /// Cues in declared order, in global time
    pub cues: Vec<ResolvedCue>,
}

impl StitchedRoom {
    /// Global time at which the room ends
    pub fn end(&self) -> f64 {
        self.offset + self.span
    }
}

/// All rooms on one continuous time axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalTimeline {
    /// Rooms in project order
    pub rooms: Vec<StitchedRoom>,
}

impl GlobalTimeline {
    /// Length of the whole show
    pub fn total_duration(&self) -> f64 {
        self.rooms.iter().map(|room| room.span).sum()
    }

    /// Get a room by ID
    pub fn room(&self, room_id: &RoomId) -> Option<&StitchedRoom> {
        self.rooms.iter().find(|room| &room.room == room_id)
    }

    /// Every cue in global time, room by room
    pub fn flattened(&self) -> impl Iterator<Item = &ResolvedCue> {
        self.rooms.iter().flat_map(|room| room.cues.iter())
    }

    /// Number of cues on the timeline
    pub fn cue_count(&self) -> usize {
        self.rooms.iter().map(|room| room.cues.len()).sum()
    }

    /// Pack the flattened cues into lanes, ignoring room boundaries
    pub fn pack(&self) -> LaneAssignment {
        let cues: Vec<ResolvedCue> = self.flattened().cloned().collect();
        lanes::pack(&cues)
    }
}

/// Lay out resolved rooms end to end in project order.
///
/// A project room with no schedule is treated as empty.
pub fn stitch(project: &Project, per_room: &[RoomSchedule]) -> GlobalTimeline {
    let mut offset = 0.0;
    let mut rooms = Vec::with_capacity(project.rooms().len());

    for room in project.rooms() {
        let schedule = per_room.iter().find(|schedule| schedule.room == room.id);
        let (cues, lane_count) = match schedule {
            Some(schedule) => (schedule.cues.as_slice(), schedule.lane_count),
            None => {
                tracing::debug!(room = %room.id, "no schedule for room, stitching it empty");
                (&[][..], 0)
            }
        };

        let span = room_span(cues);
        rooms.push(StitchedRoom {
            room: room.id.clone(),
            name: room.name.clone(),
            offset,
            span,
            lane_count,
            cues: cues.iter().map(|cue| cue.offset(offset)).collect(),
        });
        offset += span;
    }

    tracing::debug!(rooms = rooms.len(), total = offset, "rooms stitched");
    GlobalTimeline { rooms }
}
