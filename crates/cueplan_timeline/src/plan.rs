// SPDX-License-Identifier: MIT OR Apache-2.0
//! Full planning pass: resolve, pack, stitch.

use crate::lanes::LaneAssignment;
use crate::project::Project;
use crate::resolver::{self, ResolveError, RoomSchedule};
use crate::room::RoomId;
use crate::stitch::{self, GlobalTimeline};
use serde::{Deserialize, Serialize};

/// Everything a renderer needs for one project snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelinePlan {
    /// Per-room schedules with lanes, in project order
    pub rooms: Vec<RoomSchedule>,
    /// All rooms on one axis
    pub global: GlobalTimeline,
}

impl TimelinePlan {
    /// Schedule of one room
    pub fn room(&self, room_id: &RoomId) -> Option<&RoomSchedule> {
        self.rooms.iter().find(|schedule| &schedule.room == room_id)
    }

    /// Length of the whole show
    pub fn total_duration(&self) -> f64 {
        self.global.total_duration()
    }

    /// Lanes for the flattened global timeline
    pub fn global_lanes(&self) -> LaneAssignment {
        self.global.pack()
    }
}

/// Resolve every room, pack its lanes and stitch the result.
///
/// Fails as a whole if any cue cannot be resolved.
pub fn plan(project: &Project) -> Result<TimelinePlan, ResolveError> {
    let mut rooms = resolver::resolve_project(project)?;
    for schedule in &mut rooms {
        schedule.pack_lanes();
    }
    let global = stitch::stitch(project, &rooms);

    tracing::debug!(
        rooms = rooms.len(),
        cues = project.cue_count(),
        total = global.total_duration(),
        "timeline planned"
    );
    Ok(TimelinePlan { rooms, global })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::{Cue, CueId, Trigger};
    use crate::room::Room;

    #[test]
    fn test_plan_packs_and_stitches() {
        let project = Project::new(vec![
            Room::new("one", "One")
                .with_cue(Cue::new("a", "A", Trigger::AtTime(0.0), 10.0))
                .with_cue(Cue::new("b", "B", Trigger::AtTime(5.0), 10.0)),
            Room::new("two", "Two").with_cue(Cue::new("c", "C", Trigger::AfterCue(CueId::new("a")), 2.0)),
        ])
        .unwrap();

        let plan = plan(&project).unwrap();
        let one = plan.room(&RoomId::new("one")).unwrap();
        assert_eq!(one.lane_count, 2);
        assert_eq!(one.cues.iter().map(|c| c.lane).collect::<Vec<_>>(), vec![Some(0), Some(1)]);

        // "c" starts when "a" ends locally, then moves by room one's span
        let two = &plan.global.rooms[1];
        assert_eq!(two.offset, 15.0);
        assert_eq!(two.cues[0].start, 25.0);
        assert_eq!(plan.total_duration(), 27.0);
        assert_eq!(plan.global_lanes().lane_count(), 2);
    }

    #[test]
    fn test_plan_fails_atomically() {
        let project = Project::new(vec![
            Room::new("one", "One").with_cue(Cue::new("a", "A", Trigger::AtTime(0.0), 10.0)),
            Room::new("two", "Two").with_cue(Cue::new("c", "C", Trigger::AfterCue(CueId::new("zzz")), 2.0)),
        ])
        .unwrap();

        assert!(matches!(plan(&project), Err(ResolveError::DanglingReference { .. })));
    }
}
