// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show statistics derived from a plan.

use crate::cue::{Activation, Cue, CueType, PlayBehaviour, TriggerKind};
use crate::plan::TimelinePlan;
use crate::resolver::{ResolvedCue, RoomSchedule};
use crate::room::RoomId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Count and time of a group of cues
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    /// Number of cues
    pub count: usize,
    /// Summed duration in seconds
    pub total_duration: f64,
}

impl Tally {
    /// Mean duration, zero for an empty group
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_duration / self.count as f64
        }
    }

    fn add(&mut self, duration: f64) {
        self.count += 1;
        self.total_duration += duration;
    }
}

/// Cues grouped by each categorical field, sorted by display name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// By cue type
    pub by_type: IndexMap<CueType, Tally>,
    /// By activation
    pub by_activation: IndexMap<Activation, Tally>,
    /// By playback behaviour
    pub by_play: IndexMap<PlayBehaviour, Tally>,
    /// By trigger kind
    pub by_trigger: IndexMap<TriggerKind, Tally>,
}

impl Breakdown {
    fn from_cues<'a>(cues: impl IntoIterator<Item = &'a Cue>) -> Self {
        let mut breakdown = Self::default();
        for cue in cues {
            breakdown.by_type.entry(cue.cue_type).or_default().add(cue.duration);
            breakdown.by_activation.entry(cue.activation).or_default().add(cue.duration);
            breakdown.by_play.entry(cue.play).or_default().add(cue.duration);
            breakdown.by_trigger.entry(cue.trigger.kind()).or_default().add(cue.duration);
        }
        sort_by_name(&mut breakdown.by_type, CueType::name);
        sort_by_name(&mut breakdown.by_activation, Activation::name);
        sort_by_name(&mut breakdown.by_play, PlayBehaviour::name);
        sort_by_name(&mut breakdown.by_trigger, TriggerKind::name);
        breakdown
    }
}

fn sort_by_name<K: Hash + Eq>(map: &mut IndexMap<K, Tally>, name: fn(&K) -> &'static str) {
    map.sort_by(|a, _, b, _| name(a).cmp(name(b)));
}

/// An operator note placed in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEntry {
    /// Local start of the cue
    pub start: f64,
    /// Cue display name
    pub cue_name: String,
    /// The note
    pub note: String,
}

/// Statistics of one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room ID
    pub room: RoomId,
    /// Room display name
    pub name: String,
    /// Number of cues
    pub cue_count: usize,
    /// Room span in seconds
    pub span: f64,
    /// Lanes used
    pub lane_count: usize,
    /// Grouped counts
    pub breakdown: Breakdown,
    /// Notes ordered by local start
    pub notes: Vec<NoteEntry>,
    /// Cues ordered by local start
    pub timeline: Vec<ResolvedCue>,
}

impl RoomSummary {
    fn from_schedule(schedule: &RoomSchedule) -> Self {
        let timeline: Vec<ResolvedCue> = schedule.by_start().into_iter().cloned().collect();
        let notes = timeline
            .iter()
            .filter(|resolved| !resolved.cue.notes.trim().is_empty())
            .map(|resolved| NoteEntry {
                start: resolved.start,
                cue_name: resolved.cue.name.clone(),
                note: resolved.cue.notes.clone(),
            })
            .collect();

        Self {
            room: schedule.room.clone(),
            name: schedule.name.clone(),
            cue_count: schedule.cues.len(),
            span: schedule.span(),
            lane_count: schedule.lane_count,
            breakdown: Breakdown::from_cues(schedule.cues.iter().map(|resolved| &resolved.cue)),
            notes,
            timeline,
        }
    }
}

/// Whole-show statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowSummary {
    /// Number of rooms
    pub room_count: usize,
    /// Number of cues
    pub cue_count: usize,
    /// Summed duration of every cue
    pub total_cue_time: f64,
    /// End of the last room on the global axis
    pub show_duration: f64,
    /// Grouped counts over the whole show
    pub breakdown: Breakdown,
    /// Per-room statistics in project order
    pub rooms: Vec<RoomSummary>,
}

impl ShowSummary {
    /// Compute statistics for a plan
    pub fn from_plan(plan: &TimelinePlan) -> Self {
        let cues: Vec<&Cue> = plan
            .rooms
            .iter()
            .flat_map(|schedule| schedule.cues.iter().map(|resolved| &resolved.cue))
            .collect();

        Self {
            room_count: plan.rooms.len(),
            cue_count: cues.len(),
            total_cue_time: cues.iter().map(|cue| cue.duration).sum(),
            show_duration: plan.total_duration(),
            breakdown: Breakdown::from_cues(cues.iter().copied()),
            rooms: plan.rooms.iter().map(RoomSummary::from_schedule).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::Trigger;
    use crate::plan::plan;
    use crate::project::Project;
    use crate::room::Room;

    fn summary() -> ShowSummary {
        let project = Project::new(vec![
            Room::new("one", "One")
                .with_cue(Cue::new("b", "Bells", Trigger::AtTime(30.0), 10.0).with_notes("cue the guide"))
                .with_cue(Cue::new("a", "Ambience", Trigger::AtTime(0.0), 60.0).with_type(CueType::Lighting))
                .with_cue(Cue::new("c", "Chime", Trigger::AfterPrevious, 2.0)),
            Room::new("two", "Two"),
        ])
        .unwrap();
        ShowSummary::from_plan(&plan(&project).unwrap())
    }

    #[test]
    fn test_totals() {
        let summary = summary();
        assert_eq!(summary.room_count, 2);
        assert_eq!(summary.cue_count, 3);
        assert_eq!(summary.total_cue_time, 72.0);
        assert_eq!(summary.show_duration, 62.0);
    }

    #[test]
    fn test_breakdown_sorted_by_name() {
        let summary = summary();
        let types: Vec<_> = summary.breakdown.by_type.iter().map(|(t, n)| (*t, n.count)).collect();
        assert_eq!(types, vec![(CueType::Audio, 2), (CueType::Lighting, 1)]);
        assert_eq!(summary.breakdown.by_type[&CueType::Audio].average(), 6.0);

        let triggers: Vec<_> = summary.breakdown.by_trigger.keys().copied().collect();
        assert_eq!(triggers, vec![TriggerKind::AfterPrevious, TriggerKind::AtTime]);
    }

    #[test]
    fn test_room_timeline_by_start() {
        let summary = summary();
        let room = &summary.rooms[0];
        let order: Vec<&str> = room.timeline.iter().map(|r| r.cue.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(room.notes.len(), 1);
        assert_eq!(room.notes[0].start, 30.0);
        assert_eq!(room.lane_count, 2);
        assert_eq!(summary.rooms[1].cue_count, 0);
        assert_eq!(Tally::default().average(), 0.0);
    }
}
