// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dependency resolution.
//!
//! Every cue of the project becomes one node of a single [`Graph`], keyed by
//! [`CueKey`] and inserted in room order then declaration order. "After
//! previous" becomes an explicit edge to the cue declared just before; "after
//! cue" becomes an edge to the named cue, in whichever room it lives. The
//! graph is then evaluated in topological order, so every start time is
//! computed from an end time that is already known.

use crate::cue::{Cue, CueId, Trigger};
use crate::lanes;
use crate::project::{CueKey, Project, ReferenceError};
use crate::room::RoomId;
use crate::stitch;
use cueplan_graph::{EvaluationContext, EvaluationError, Graph, NodeEvaluator, NodeId};
use serde::{Deserialize, Serialize};

/// A cue with its room-local start and end times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCue {
    /// Room holding the cue
    pub room: RoomId,
    /// Position of the room in the project
    pub room_index: usize,
    /// Declared position of the cue in its room
    pub index: usize,
    /// The cue itself
    pub cue: Cue,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Lane, once packed
    pub lane: Option<usize>,
}

impl ResolvedCue {
    /// Project-wide key of the cue
    pub fn key(&self) -> CueKey {
        CueKey::new(self.room.clone(), self.cue.id.clone())
    }

    /// Resolved duration
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the cue occupies a single instant
    pub fn is_instant(&self) -> bool {
        self.end <= self.start
    }

    /// The same cue moved by `offset` seconds
    pub fn offset(&self, offset: f64) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            ..self.clone()
        }
    }
}

/// Resolved cues of one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSchedule {
    /// Room ID
    pub room: RoomId,
    /// Room display name
    pub name: String,
    /// Resolved cues in declared order
    pub cues: Vec<ResolvedCue>,
    /// Number of lanes after packing (zero until packed)
    pub lane_count: usize,
}

impl RoomSchedule {
    /// Earliest start (never after zero) to latest end
    pub fn span(&self) -> f64 {
        stitch::room_span(&self.cues)
    }

    /// Assign lanes to every cue
    pub fn pack_lanes(&mut self) {
        let assignment = lanes::pack(&self.cues);
        assignment.apply(&mut self.cues);
        self.lane_count = assignment.lane_count();
    }

    /// Get a resolved cue by ID
    pub fn cue(&self, cue_id: &CueId) -> Option<&ResolvedCue> {
        self.cues.iter().find(|resolved| &resolved.cue.id == cue_id)
    }

    /// Cues ordered by start time, then declared order
    pub fn by_start(&self) -> Vec<&ResolvedCue> {
        let mut cues: Vec<&ResolvedCue> = self.cues.iter().collect();
        cues.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.index.cmp(&b.index)));
        cues
    }
}

/// Why a resolution pass failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// An "after cue" trigger names a cue that does not exist
    #[error("Cue {room}/{cue} follows unknown cue {target:?}")]
    DanglingReference {
        /// Room of the referencing cue
        room: RoomId,
        /// Referencing cue
        cue: CueId,
        /// Missing target
        target: CueId,
    },

    /// An "after cue" target exists in several other rooms
    #[error("Cue {room}/{cue} follows {target:?}, which exists in rooms {}", join_rooms(.rooms))]
    AmbiguousReference {
        /// Room of the referencing cue
        room: RoomId,
        /// Referencing cue
        cue: CueId,
        /// Ambiguous target
        target: CueId,
        /// Rooms that hold a cue with that ID
        rooms: Vec<RoomId>,
    },

    /// Cues wait on each other in a loop
    #[error("Cue dependency cycle: {}", format_cycle(.path))]
    Cycle {
        /// The cycle, each cue waiting on the next, the last waiting on the first
        path: Vec<CueKey>,
    },

    /// Room not in the project
    #[error("Unknown room {0}")]
    UnknownRoom(RoomId),

    /// Evaluation failed
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

fn join_rooms(rooms: &[RoomId]) -> String {
    rooms.iter().map(RoomId::as_str).collect::<Vec<_>>().join(", ")
}

fn format_cycle(path: &[CueKey]) -> String {
    let mut parts: Vec<String> = path.iter().map(ToString::to_string).collect();
    if let Some(first) = parts.first().cloned() {
        parts.push(first);
    }
    parts.join(" -> ")
}

/// Result alias for resolution
pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Clone, Copy)]
struct Timing {
    start: f64,
    end: f64,
}

struct TimingEvaluator<'a> {
    project: &'a Project,
}

impl NodeEvaluator<CueKey> for TimingEvaluator<'_> {
    type Output = Timing;

    fn evaluate(&self, key: &CueKey, inputs: &[&Timing]) -> std::result::Result<Timing, EvaluationError> {
        let cue = self
            .project
            .cue(key)
            .ok_or_else(|| EvaluationError::Custom(format!("cue {key} is not in the project")))?;

        let start = match &cue.trigger {
            Trigger::AtTime(time) => *time,
            Trigger::AfterPrevious | Trigger::AfterCue(_) => inputs
                .first()
                .map(|anchor| anchor.end)
                .ok_or_else(|| EvaluationError::Custom(format!("cue {key} has nothing to follow")))?,
        };

        Ok(Timing {
            start,
            end: start + cue.duration,
        })
    }
}

/// Dependency graph of a project snapshot
pub struct Resolver<'a> {
    project: &'a Project,
    graph: Graph<CueKey>,
    broken: Vec<(NodeId, ResolveError)>,
}

impl<'a> Resolver<'a> {
    /// Build the dependency graph for a project
    pub fn new(project: &'a Project) -> Self {
        let mut graph = Graph::with_capacity(project.cue_count());
        for key in project.cue_keys() {
            graph.add_node(key.clone());
        }

        let mut broken = Vec::new();
        for room in project.rooms() {
            for (index, cue) in room.cues.iter().enumerate() {
                let Some(dependent) = graph.node_id(&CueKey::new(room.id.clone(), cue.id.clone()))
                else {
                    continue;
                };

                let prerequisite = match &cue.trigger {
                    Trigger::AtTime(_) => None,
                    Trigger::AfterPrevious => room
                        .previous(index)
                        .map(|previous| CueKey::new(room.id.clone(), previous.id.clone())),
                    Trigger::AfterCue(target) => match project.lookup(&room.id, target) {
                        Ok(key) => Some(key),
                        Err(ReferenceError::Missing) => {
                            broken.push((
                                dependent,
                                ResolveError::DanglingReference {
                                    room: room.id.clone(),
                                    cue: cue.id.clone(),
                                    target: target.clone(),
                                },
                            ));
                            None
                        }
                        Err(ReferenceError::Ambiguous(rooms)) => {
                            broken.push((
                                dependent,
                                ResolveError::AmbiguousReference {
                                    room: room.id.clone(),
                                    cue: cue.id.clone(),
                                    target: target.clone(),
                                    rooms,
                                },
                            ));
                            None
                        }
                    },
                };

                if let Some(prerequisite) = prerequisite.and_then(|key| graph.node_id(&key)) {
                    // Both IDs come from this graph
                    if let Err(err) = graph.add_dependency(dependent, prerequisite) {
                        tracing::warn!(%err, "dependency skipped");
                    }
                }
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            dependencies = graph.dependency_count(),
            broken = broken.len(),
            "dependency graph built"
        );

        Self {
            project,
            graph,
            broken,
        }
    }

    /// The underlying graph
    pub fn graph(&self) -> &Graph<CueKey> {
        &self.graph
    }

    /// Resolve the cues of one room, and only what they depend on
    pub fn resolve_room(&self, room_id: &RoomId) -> Result<RoomSchedule> {
        let room = self
            .project
            .room(room_id)
            .ok_or_else(|| ResolveError::UnknownRoom(room_id.clone()))?;
        let roots = self.room_nodes(room_id);

        let timings = self.evaluate(&roots)?;
        self.schedule(room_id, &room.name, &roots, &timings)
    }

    /// Resolve every room, failing on the first error in project order
    pub fn resolve_project(&self) -> Result<Vec<RoomSchedule>> {
        let roots: Vec<NodeId> = self.graph.node_ids().collect();
        let timings = self.evaluate(&roots)?;

        self.project
            .rooms()
            .iter()
            .map(|room| self.schedule(&room.id, &room.name, &self.room_nodes(&room.id), &timings))
            .collect()
    }

    fn room_nodes(&self, room_id: &RoomId) -> Vec<NodeId> {
        self.graph
            .nodes()
            .filter(|node| &node.key.room == room_id)
            .map(|node| node.id)
            .collect()
    }

    /// Timings of `roots` and everything they depend on, indexed by node
    fn evaluate(&self, roots: &[NodeId]) -> Result<Vec<Option<Timing>>> {
        let closure = self.graph.dependency_closure(roots);
        if let Some((_, err)) = self
            .broken
            .iter()
            .find(|(node_id, _)| closure.binary_search(node_id).is_ok())
        {
            tracing::debug!(%err, "resolution failed");
            return Err(err.clone());
        }

        let context = EvaluationContext::for_roots(&self.graph, roots).map_err(|err| self.map_error(err))?;
        let evaluation = context
            .run(&TimingEvaluator {
                project: self.project,
            })
            .map_err(|err| self.map_error(err))?;

        let mut timings = vec![None; self.graph.node_count()];
        for (node_id, timing) in evaluation.iter() {
            if let Some(slot) = timings.get_mut(node_id.index()) {
                *slot = Some(*timing);
            }
        }
        Ok(timings)
    }

    fn map_error(&self, err: EvaluationError) -> ResolveError {
        match err {
            EvaluationError::CycleDetected(cycle) => {
                let path: Vec<CueKey> = cycle
                    .path
                    .iter()
                    .filter_map(|&node_id| self.graph.key(node_id).cloned())
                    .collect();
                tracing::debug!(length = path.len(), "dependency cycle found");
                ResolveError::Cycle { path }
            }
            other => ResolveError::Evaluation(other),
        }
    }

    fn schedule(
        &self,
        room_id: &RoomId,
        name: &str,
        nodes: &[NodeId],
        timings: &[Option<Timing>],
    ) -> Result<RoomSchedule> {
        let room_index = self
            .project
            .room_index(room_id)
            .ok_or_else(|| ResolveError::UnknownRoom(room_id.clone()))?;

        let mut cues = Vec::with_capacity(nodes.len());
        for (index, &node_id) in nodes.iter().enumerate() {
            let key = self
                .graph
                .key(node_id)
                .ok_or(EvaluationError::NodeNotFound(node_id))?;
            let cue = self
                .project
                .cue(key)
                .ok_or(EvaluationError::NodeNotFound(node_id))?;
            let timing = timings
                .get(node_id.index())
                .copied()
                .flatten()
                .ok_or(EvaluationError::NodeNotFound(node_id))?;

            cues.push(ResolvedCue {
                room: room_id.clone(),
                room_index,
                index,
                cue: cue.clone(),
                start: timing.start,
                end: timing.end,
                lane: None,
            });
        }

        Ok(RoomSchedule {
            room: room_id.clone(),
            name: name.to_string(),
            cues,
            lane_count: 0,
        })
    }
}

/// Resolve the cues of one room.
///
/// Only the room's cues and the cues they depend on are evaluated, so a broken
/// reference elsewhere in the project does not affect the result.
pub fn resolve_room(project: &Project, room_id: &RoomId) -> Result<RoomSchedule> {
    Resolver::new(project).resolve_room(room_id)
}

/// Resolve every room of a project
pub fn resolve_project(project: &Project) -> Result<Vec<RoomSchedule>> {
    Resolver::new(project).resolve_project()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::Room;

    fn starts(schedule: &RoomSchedule) -> Vec<(&str, f64, f64)> {
        schedule
            .cues
            .iter()
            .map(|r| (r.cue.id.as_str(), r.start, r.end))
            .collect()
    }

    #[test]
    fn test_fixed_times_are_exact() {
        let project = Project::new(vec![Room::new("hall", "Hall")
            .with_cue(Cue::new("a", "A", Trigger::AtTime(12.5), 3.0))
            .with_cue(Cue::new("b", "B", Trigger::AtTime(0.0), 0.0))
            .with_cue(Cue::new("c", "C", Trigger::AtTime(7.25), 1.0))])
        .unwrap();

        let schedule = resolve_room(&project, &RoomId::new("hall")).unwrap();
        assert_eq!(
            starts(&schedule),
            vec![("a", 12.5, 15.5), ("b", 0.0, 0.0), ("c", 7.25, 8.25)]
        );
    }

    #[test]
    fn test_after_previous_chain() {
        let durations = [4.0, 2.5, 10.0, 1.0];
        let mut room = Room::new("hall", "Hall").with_cue(Cue::new("c0", "C0", Trigger::AtTime(5.0), durations[0]));
        for (i, &d) in durations.iter().enumerate().skip(1) {
            room = room.with_cue(Cue::new(format!("c{i}").as_str(), "C", Trigger::AfterPrevious, d));
        }
        let project = Project::new(vec![room]).unwrap();

        let schedule = resolve_room(&project, &RoomId::new("hall")).unwrap();
        let mut expected = 5.0;
        for (resolved, d) in schedule.cues.iter().zip(durations) {
            assert_eq!(resolved.start, expected);
            expected += d;
        }
    }

    #[test]
    fn test_after_previous_uses_declared_order() {
        // "b" follows "late", which is declared before it but starts later
        let project = Project::new(vec![Room::new("hall", "Hall")
            .with_cue(Cue::new("late", "Late", Trigger::AtTime(100.0), 5.0))
            .with_cue(Cue::new("b", "B", Trigger::AfterPrevious, 1.0))
            .with_cue(Cue::new("early", "Early", Trigger::AtTime(0.0), 5.0))])
        .unwrap();

        let schedule = resolve_room(&project, &RoomId::new("hall")).unwrap();
        assert_eq!(schedule.cue(&CueId::new("b")).map(|r| r.start), Some(105.0));
    }

    #[test]
    fn test_forward_and_cross_room_references() {
        let project = Project::new(vec![
            Room::new("a", "A")
                .with_cue(Cue::new("wait", "Wait", Trigger::AfterCue(CueId::new("later")), 2.0))
                .with_cue(Cue::new("later", "Later", Trigger::AtTime(3.0), 4.0)),
            Room::new("b", "B").with_cue(Cue::new("echo", "Echo", Trigger::AfterCue(CueId::new("wait")), 1.0)),
        ])
        .unwrap();

        let schedules = resolve_project(&project).unwrap();
        assert_eq!(starts(&schedules[0]), vec![("wait", 7.0, 9.0), ("later", 3.0, 7.0)]);
        assert_eq!(starts(&schedules[1]), vec![("echo", 9.0, 10.0)]);
    }

    #[test]
    fn test_cycle_names_both_cues() {
        let project = Project::new(vec![Room::new("hall", "Hall")
            .with_cue(Cue::new("a", "A", Trigger::AfterCue(CueId::new("b")), 1.0))
            .with_cue(Cue::new("b", "B", Trigger::AfterCue(CueId::new("a")), 1.0))])
        .unwrap();

        let err = resolve_project(&project).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Cycle {
                path: vec![CueKey::new("hall", "a"), CueKey::new("hall", "b")],
            }
        );
        assert_eq!(err.to_string(), "Cue dependency cycle: hall/a -> hall/b -> hall/a");
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let project = Project::new(vec![
            Room::new("hall", "Hall").with_cue(Cue::new("a", "A", Trigger::AfterCue(CueId::new("a")), 1.0))
        ])
        .unwrap();

        assert_eq!(
            resolve_room(&project, &RoomId::new("hall")),
            Err(ResolveError::Cycle {
                path: vec![CueKey::new("hall", "a")],
            })
        );
    }

    #[test]
    fn test_dangling_reference() {
        let project = Project::new(vec![Room::new("hall", "Hall")
            .with_cue(Cue::new("a", "A", Trigger::AtTime(0.0), 1.0))
            .with_cue(Cue::new("b", "B", Trigger::AfterCue(CueId::new("ghost")), 1.0))])
        .unwrap();

        assert_eq!(
            resolve_project(&project),
            Err(ResolveError::DanglingReference {
                room: RoomId::new("hall"),
                cue: CueId::new("b"),
                target: CueId::new("ghost"),
            })
        );
    }

    #[test]
    fn test_ambiguous_reference() {
        let project = Project::new(vec![
            Room::new("a", "A").with_cue(Cue::new("bell", "Bell", Trigger::AtTime(0.0), 1.0)),
            Room::new("b", "B").with_cue(Cue::new("bell", "Bell", Trigger::AtTime(0.0), 1.0)),
            Room::new("c", "C").with_cue(Cue::new("x", "X", Trigger::AfterCue(CueId::new("bell")), 1.0)),
        ])
        .unwrap();

        assert!(matches!(
            resolve_room(&project, &RoomId::new("c")),
            Err(ResolveError::AmbiguousReference { rooms, .. }) if rooms.len() == 2
        ));
    }

    #[test]
    fn test_room_isolated_from_unrelated_failures() {
        let project = Project::new(vec![
            Room::new("ok", "Ok").with_cue(Cue::new("a", "A", Trigger::AtTime(1.0), 1.0)),
            Room::new("bad", "Bad")
                .with_cue(Cue::new("x", "X", Trigger::AfterCue(CueId::new("y")), 1.0))
                .with_cue(Cue::new("y", "Y", Trigger::AfterCue(CueId::new("x")), 1.0)),
        ])
        .unwrap();

        assert!(resolve_room(&project, &RoomId::new("ok")).is_ok());
        assert!(matches!(resolve_room(&project, &RoomId::new("bad")), Err(ResolveError::Cycle { .. })));
        assert!(resolve_project(&project).is_err());
        assert_eq!(
            resolve_room(&project, &RoomId::new("nope")),
            Err(ResolveError::UnknownRoom(RoomId::new("nope")))
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let project = Project::new(vec![
            Room::new("a", "A")
                .with_cue(Cue::new("one", "One", Trigger::AtTime(0.0), 2.0))
                .with_cue(Cue::new("two", "Two", Trigger::AfterPrevious, 3.0)),
            Room::new("b", "B").with_cue(Cue::new("three", "Three", Trigger::AfterCue(CueId::new("two")), 1.0)),
        ])
        .unwrap();

        let first = resolve_project(&project).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve_project(&project).unwrap(), first);
        }
    }
}
