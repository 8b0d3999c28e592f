// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cue definitions for the timeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a cue, unique within its room
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueId(pub String);

impl CueId {
    /// Create a cue ID from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random cue ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CueId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Category of a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum CueType {
    /// Sound playback
    #[default]
    Audio,
    /// Projected imagery
    Projection,
    /// Screens and monitors
    #[serde(rename = "TV")]
    Tv,
    /// Lighting state or effect
    Lighting,
    /// Video playback
    Video,
    /// Motors, doors, props
    Mechanical,
    /// Visitor-driven interactive element
    Interactive,
    /// Visitor activity
    Activity,
    /// Group moving between spaces
    #[serde(rename = "Group Movement")]
    GroupMovement,
    /// Something a facilitator does
    #[serde(rename = "Facilitator Action")]
    FacilitatorAction,
}

impl CueType {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Audio => "Audio",
            Self::Projection => "Projection",
            Self::Tv => "TV",
            Self::Lighting => "Lighting",
            Self::Video => "Video",
            Self::Mechanical => "Mechanical",
            Self::Interactive => "Interactive",
            Self::Activity => "Activity",
            Self::GroupMovement => "Group Movement",
            Self::FacilitatorAction => "Facilitator Action",
        }
    }

    /// Get all cue types
    pub fn all() -> &'static [CueType] {
        &[
            Self::Audio,
            Self::Projection,
            Self::Tv,
            Self::Lighting,
            Self::Video,
            Self::Mechanical,
            Self::Interactive,
            Self::Activity,
            Self::GroupMovement,
            Self::FacilitatorAction,
        ]
    }
}

impl fmt::Display for CueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CueType {
    type Err = UnknownCueType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCueType(s.to_string()))
    }
}

/// A cue type string that names no known [`CueType`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cue type {0:?}")]
pub struct UnknownCueType(pub String);

/// Playback behaviour of a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum PlayBehaviour {
    /// Plays through once
    #[default]
    #[serde(rename = "Play once")]
    OneShot,
    /// Repeats for as long as it runs
    #[serde(rename = "Loop")]
    Loop,
    /// Keeps running until stopped
    #[serde(rename = "Hold until stopped", alias = "Ambient")]
    HoldUntilStopped,
}

impl PlayBehaviour {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::OneShot => "Play once",
            Self::Loop => "Loop",
            Self::HoldUntilStopped => "Hold until stopped",
        }
    }
}

/// How operators fire a cue on site.
///
/// Descriptive only; timing always comes from the [`Trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum Activation {
    /// Runs from the show timeline
    #[default]
    #[serde(rename = "Timeline (auto)")]
    Timeline,
    /// Fired by a sensor
    #[serde(rename = "Sensor")]
    Sensor,
    /// Fired by an operator
    #[serde(rename = "Manual (operator)")]
    Manual,
}

impl Activation {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Timeline => "Timeline (auto)",
            Self::Sensor => "Sensor",
            Self::Manual => "Manual (operator)",
        }
    }
}

/// Rule that decides when a cue starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Trigger {
    /// Fixed offset in seconds from the start of the room
    AtTime(f64),
    /// When the cue declared just before this one ends
    AfterPrevious,
    /// When the named cue ends, wherever it sits in the project
    AfterCue(CueId),
}

impl Trigger {
    /// The kind of this trigger, without its reference
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::AtTime(_) => TriggerKind::AtTime,
            Self::AfterPrevious => TriggerKind::AfterPrevious,
            Self::AfterCue(_) => TriggerKind::AfterCue,
        }
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::AtTime(0.0)
    }
}

/// Trigger kinds, as written in show files
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum TriggerKind {
    /// See [`Trigger::AtTime`]
    #[default]
    #[serde(rename = "At fixed time (s)")]
    AtTime,
    /// See [`Trigger::AfterPrevious`]
    #[serde(rename = "After previous cue")]
    AfterPrevious,
    /// See [`Trigger::AfterCue`]
    #[serde(rename = "After cue")]
    AfterCue,
}

impl TriggerKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::AtTime => "At fixed time (s)",
            Self::AfterPrevious => "After previous cue",
            Self::AfterCue => "After cue",
        }
    }
}

/// A timed event in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Identifier, unique within the room
    pub id: CueId,
    /// Display name
    pub name: String,
    /// Category
    pub cue_type: CueType,
    /// How it is fired on site
    pub activation: Activation,
    /// Playback behaviour
    pub play: PlayBehaviour,
    /// Start rule
    pub trigger: Trigger,
    /// Duration in seconds
    pub duration: f64,
    /// Free-form notes for operators
    pub notes: String,
}

impl Cue {
    /// Create a new cue with default type, activation and playback
    pub fn new(id: impl Into<CueId>, name: impl Into<String>, trigger: Trigger, duration: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cue_type: CueType::default(),
            activation: Activation::default(),
            play: PlayBehaviour::default(),
            trigger,
            duration,
            notes: String::new(),
        }
    }

    /// Set the cue type
    pub fn with_type(mut self, cue_type: CueType) -> Self {
        self.cue_type = cue_type;
        self
    }

    /// Set the playback behaviour
    pub fn with_play(mut self, play: PlayBehaviour) -> Self {
        self.play = play;
        self
    }

    /// Set the activation
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Set the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// The cue this one waits for by name, if any
    pub fn dependency(&self) -> Option<&CueId> {
        match &self.trigger {
            Trigger::AfterCue(target) => Some(target),
            Trigger::AtTime(_) | Trigger::AfterPrevious => None,
        }
    }
}
