// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line commands.
//!
//! Each command returns the text to print, so it can be tested without a
//! terminal.

use crate::error::{AppError, Result};
use crate::report::{build_report, format_time, schedule_table};
use crate::session::ShowSession;
use crate::settings::PlannerSettings;
use crate::show_file;
use clap::{Args, Parser, Subcommand, ValueEnum};
use cueplan_timeline::{Activation, Cue, CueId, CueType, PlayBehaviour, ResolveError, RoomId, ShowSummary, Trigger};
use std::path::PathBuf;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "cueplan", about = "Plan cue timelines across rooms", version)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (defaults to cueplan.ron in the current directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a show file with the configured rooms
    New {
        /// Show file to create
        file: PathBuf,
    },
    /// Check that a show file loads and resolves
    Validate {
        /// Show file
        file: PathBuf,
    },
    /// Print resolved times and lanes
    Plan {
        /// Show file
        file: PathBuf,
        /// Only this room
        #[arg(long)]
        room: Option<String>,
    },
    /// Print the show report
    Summary {
        /// Show file
        file: PathBuf,
    },
    /// Add a cue to a room
    AddCue(AddCueArgs),
    /// Remove a cue from a room
    RemoveCue {
        /// Show file
        file: PathBuf,
        /// Room ID
        #[arg(long)]
        room: String,
        /// Cue ID
        #[arg(long)]
        cue: String,
    },
    /// Write a settings file with default values
    InitSettings {
        /// Where to write it
        path: PathBuf,
    },
}

/// Arguments of `add-cue`
#[derive(Debug, Args)]
pub struct AddCueArgs {
    /// Show file
    pub file: PathBuf,
    /// Room ID
    #[arg(long)]
    pub room: String,
    /// Display name
    #[arg(long)]
    pub name: String,
    /// Cue ID (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,
    /// Cue type, e.g. "Lighting" or "Group Movement"
    #[arg(long = "type", default_value = "Audio")]
    pub cue_type: String,
    /// Duration in seconds
    #[arg(long)]
    pub duration: f64,
    /// Start at a fixed time in seconds
    #[arg(long, conflicts_with_all = ["after", "after_previous"])]
    pub at: Option<f64>,
    /// Start when this cue ends
    #[arg(long, conflicts_with = "after_previous")]
    pub after: Option<String>,
    /// Start when the cue declared before ends
    #[arg(long)]
    pub after_previous: bool,
    /// How operators fire it
    #[arg(long, value_enum, default_value_t = ActivationArg::Timeline)]
    pub activation: ActivationArg,
    /// Playback behaviour
    #[arg(long, value_enum, default_value_t = PlayArg::Once)]
    pub play: PlayArg,
    /// Operator notes
    #[arg(long, default_value = "")]
    pub notes: String,
    /// Declared position in the room (appends when omitted)
    #[arg(long)]
    pub position: Option<usize>,
}

/// `--activation` values
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ActivationArg {
    /// Runs from the timeline
    Timeline,
    /// Fired by a sensor
    Sensor,
    /// Fired by an operator
    Manual,
}

impl From<ActivationArg> for Activation {
    fn from(arg: ActivationArg) -> Self {
        match arg {
            ActivationArg::Timeline => Activation::Timeline,
            ActivationArg::Sensor => Activation::Sensor,
            ActivationArg::Manual => Activation::Manual,
        }
    }
}

/// `--play` values
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlayArg {
    /// Plays through once
    Once,
    /// Repeats
    Loop,
    /// Runs until stopped
    Hold,
}

impl From<PlayArg> for PlayBehaviour {
    fn from(arg: PlayArg) -> Self {
        match arg {
            PlayArg::Once => PlayBehaviour::OneShot,
            PlayArg::Loop => PlayBehaviour::Loop,
            PlayArg::Hold => PlayBehaviour::HoldUntilStopped,
        }
    }
}

impl AddCueArgs {
    fn to_cue(&self) -> Result<Cue> {
        let cue_type: CueType = self
            .cue_type
            .parse()
            .map_err(|e| AppError::InvalidArgument(format!("--type: {e}")))?;

        let trigger = match (self.at, &self.after, self.after_previous) {
            (Some(time), None, false) => Trigger::AtTime(time),
            (None, Some(target), false) => Trigger::AfterCue(CueId::new(target.as_str())),
            (None, None, true) => Trigger::AfterPrevious,
            (None, None, false) => {
                return Err(AppError::InvalidArgument(
                    "one of --at, --after or --after-previous is required".to_string(),
                ))
            }
            _ => {
                return Err(AppError::InvalidArgument(
                    "--at, --after and --after-previous are exclusive".to_string(),
                ))
            }
        };

        let id = self.id.as_deref().map_or_else(CueId::generate, CueId::new);
        Ok(Cue::new(id, self.name.as_str(), trigger, self.duration)
            .with_type(cue_type)
            .with_activation(self.activation.into())
            .with_play(self.play.into())
            .with_notes(self.notes.as_str()))
    }
}

/// Run a command and return what to print
pub fn run(command: &Command, settings: &PlannerSettings, json: bool) -> Result<String> {
    let policy = settings.first_cue_policy;
    match command {
        Command::New { file } => {
            let project = show_file::create_show(file, settings.default_rooms.as_slice(), policy)?;
            Ok(format!("Created {} with {} room(s)", file.display(), project.rooms().len()))
        }

        Command::Validate { file } => {
            let session = ShowSession::open(file, policy)?;
            let plan = session.plan()?;
            let project = session.snapshot();
            Ok(format!(
                "{}: {} room(s), {} cue(s), runs {}",
                file.display(),
                project.rooms().len(),
                project.cue_count(),
                format_time(plan.total_duration(), settings.report.time_format)
            ))
        }

        Command::Plan { file, room } => {
            let session = ShowSession::open(file, policy)?;
            let plan = session.plan()?;
            let format = settings.report.time_format;

            match room.as_deref().map(RoomId::new) {
                Some(room_id) => {
                    let schedule = plan
                        .room(&room_id)
                        .ok_or(ResolveError::UnknownRoom(room_id))?;
                    if json {
                        Ok(serde_json::to_string_pretty(schedule)?)
                    } else {
                        Ok(schedule_table(schedule, format))
                    }
                }
                None if json => Ok(serde_json::to_string_pretty(&plan)?),
                None => {
                    let mut out: Vec<String> = plan.rooms.iter().map(|s| schedule_table(s, format)).collect();
                    out.push(format!("Total: {}", format_time(plan.total_duration(), format)));
                    Ok(out.join("\n"))
                }
            }
        }

        Command::Summary { file } => {
            let session = ShowSession::open(file, policy)?;
            let plan = session.plan()?;
            if json {
                Ok(serde_json::to_string_pretty(&ShowSummary::from_plan(&plan))?)
            } else {
                Ok(build_report(&plan, &settings.report))
            }
        }

        Command::AddCue(args) => {
            let session = ShowSession::open(&args.file, policy)?;
            let room_id = RoomId::new(args.room.as_str());
            let cue = args.to_cue()?;
            let cue_id = cue.id.clone();

            session.apply(&format!("add cue {cue_id}"), |project| {
                let index = match args.position {
                    Some(index) => index,
                    None => project.room(&room_id).map_or(0, |room| room.len()),
                };
                project.with_cue_inserted(&room_id, index, cue)
            })?;
            // Unresolvable edits are not saved
            session.plan()?;
            session.save()?;
            Ok(format!("Added cue {cue_id} to {room_id}"))
        }

        Command::RemoveCue { file, room, cue } => {
            let session = ShowSession::open(file, policy)?;
            let room_id = RoomId::new(room.as_str());
            let cue_id = CueId::new(cue.as_str());

            session.apply(&format!("remove cue {cue_id}"), |project| {
                project.with_cue_removed(&room_id, &cue_id)
            })?;
            session.plan()?;
            session.save()?;
            Ok(format!("Removed cue {cue_id} from {room_id}"))
        }

        Command::InitSettings { path } => {
            if path.exists() {
                return Err(AppError::AlreadyExists(path.clone()));
            }
            PlannerSettings::default().save(path)?;
            Ok(format!("Wrote default settings to {}", path.display()))
        }
    }
}
