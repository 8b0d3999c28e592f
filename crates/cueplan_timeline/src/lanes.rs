// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lane packing.
//!
//! Cues are drawn as bars; cues that are active at the same time need
//! separate rows. Packing is greedy first-fit over cues sorted by start, which
//! opens exactly as many lanes as there are cues active at the busiest
//! instant.
//!
//! Intervals are half-open, `[start, end)`, so a cue may start in the lane of
//! one that ends at that moment. A zero-length cue still occupies its instant:
//! it behaves as `[t, t + ε)`.

use crate::project::CueKey;
use crate::resolver::ResolvedCue;
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Lane index per cue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneAssignment {
    lanes: IndexMap<CueKey, usize>,
    lane_count: usize,
}

impl LaneAssignment {
    /// Lane of a cue
    pub fn lane_of(&self, key: &CueKey) -> Option<usize> {
        self.lanes.get(key).copied()
    }

    /// Number of lanes used
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Assignments in placement order
    pub fn iter(&self) -> impl Iterator<Item = (&CueKey, usize)> {
        self.lanes.iter().map(|(key, lane)| (key, *lane))
    }

    /// Number of placed cues
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Whether nothing was placed
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Write lane indices into resolved cues
    pub fn apply(&self, cues: &mut [ResolvedCue]) {
        for resolved in cues {
            resolved.lane = self.lane_of(&resolved.key());
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Lane {
    end: f64,
    instant: bool,
}

impl Lane {
    fn is_free_at(&self, start: f64) -> bool {
        self.end < start || (self.end == start && !self.instant)
    }
}

/// Placement order: start, then shorter first, then declaration order
fn placement_order(a: &ResolvedCue, b: &ResolvedCue) -> Ordering {
    a.start
        .total_cmp(&b.start)
        .then(a.duration().total_cmp(&b.duration()))
        .then(a.room_index.cmp(&b.room_index))
        .then(a.index.cmp(&b.index))
}

/// Assign every cue the lowest lane free at its start
pub fn pack(cues: &[ResolvedCue]) -> LaneAssignment {
    let mut order: Vec<&ResolvedCue> = cues.iter().collect();
    order.sort_by(|a, b| placement_order(a, b));

    let mut open: Vec<Lane> = Vec::new();
    let mut lanes = IndexMap::with_capacity(cues.len());

    for resolved in order {
        let placed = Lane {
            end: resolved.end,
            instant: resolved.is_instant(),
        };
        let lane = match open.iter().position(|lane| lane.is_free_at(resolved.start)) {
            Some(lane) => {
                open[lane] = placed;
                lane
            }
            None => {
                open.push(placed);
                open.len() - 1
            }
        };
        lanes.insert(resolved.key(), lane);
    }

    tracing::trace!(cues = lanes.len(), lanes = open.len(), "lanes packed");
    LaneAssignment {
        lanes,
        lane_count: open.len(),
    }
}

/// Largest number of cues active at one instant
pub fn max_concurrency(cues: &[ResolvedCue]) -> usize {
    // (time, rank): ends before starts at the same time, instants end last
    let mut events: Vec<(f64, u8, isize)> = Vec::with_capacity(cues.len() * 2);
    for resolved in cues {
        events.push((resolved.start, 1, 1));
        if resolved.is_instant() {
            events.push((resolved.start, 2, -1));
        } else {
            events.push((resolved.end, 0, -1));
        }
    }
    events.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut active: isize = 0;
    let mut peak: isize = 0;
    for (_, _, delta) in events {
        active += delta;
        peak = peak.max(active);
    }
    usize::try_from(peak).unwrap_or(0)
}

/// Whether two cues would overlap in one lane
pub fn conflicts(a: &ResolvedCue, b: &ResolvedCue) -> bool {
    let covers = |outer: &ResolvedCue, t: f64| outer.start <= t && t < outer.end;
    match (a.is_instant(), b.is_instant()) {
        (true, true) => a.start == b.start,
        (true, false) => covers(b, a.start),
        (false, true) => covers(a, b.start),
        (false, false) => a.start < b.end && b.start < a.end,
    }
}
