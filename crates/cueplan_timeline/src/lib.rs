// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cue scheduling and timeline layout.
//!
//! This crate turns a show's rooms and cues into timelines:
//! - Cue and room model with validation
//! - Dependency resolution of start times across rooms
//! - Lane packing for non-overlapping bars
//! - Stitching of rooms into one global timeline
//! - Show statistics and the JSON show file format
//!
//! ## Architecture
//!
//! Data flows one way: a validated [`Project`] snapshot goes through the
//! [`resolver`], then [`lanes`], then [`stitch`]. Every pass starts from the
//! snapshot; nothing is cached between edits.

pub mod cue;
pub mod room;
pub mod validation;
pub mod project;
pub mod resolver;
pub mod lanes;
pub mod stitch;
pub mod plan;
pub mod summary;
pub mod document;

pub use cue::{Activation, Cue, CueId, CueType, PlayBehaviour, Trigger, TriggerKind, UnknownCueType};
pub use room::{Room, RoomId};
pub use validation::{FirstCuePolicy, ValidationError};
pub use project::{CueKey, Project, ReferenceError};
pub use resolver::{resolve_project, resolve_room, ResolveError, ResolvedCue, Resolver, RoomSchedule};
pub use lanes::{pack, LaneAssignment};
pub use stitch::{stitch, GlobalTimeline, StitchedRoom};
pub use plan::{plan, TimelinePlan};
pub use summary::{Breakdown, NoteEntry, RoomSummary, ShowSummary, Tally};
pub use document::{DocumentError, ShowDocument, FORMAT_VERSION};
