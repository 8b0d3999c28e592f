// SPDX-License-Identifier: MIT OR Apache-2.0
//! Planner settings and configuration.
//!
//! Settings live in a RON file next to the show files:
//! - Room list for new shows
//! - First-cue policy used when loading and editing
//! - Default log filter
//! - Report formatting

use crate::error::{AppError, Result};
use cueplan_timeline::FirstCuePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "cueplan.ron";

/// Default log filter directive
pub const DEFAULT_LOG_FILTER: &str = "cueplan_app=info";

/// Rooms of the installation, in visiting order
pub const INSTALLATION_ROOMS: &[&str] = &[
    "Reception",
    "Aljuhfa Path",
    "Immersive Room",
    "Road to Yemen",
    "Yemen Market",
    "Road to North",
    "Levant Souq",
    "Fabric Room",
    "Mecca",
];

/// How times are written in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeFormat {
    /// Seconds only ("95.0 s")
    Seconds,
    /// Seconds with a clock reading ("95.0 s (01:35)")
    #[default]
    Clock,
}

/// Report settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Time format
    pub time_format: TimeFormat,
    /// Include the room-to-room timeline section
    pub include_global_timeline: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::Clock,
            include_global_timeline: true,
        }
    }
}

/// Complete planner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Settings format version
    pub version: u32,
    /// Rooms created by `new`, in order
    pub default_rooms: Vec<String>,
    /// What to do with "after previous" on a room's first cue
    pub first_cue_policy: FirstCuePolicy,
    /// Log filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Report settings
    pub report: ReportSettings,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            default_rooms: INSTALLATION_ROOMS.iter().map(|name| (*name).to_string()).collect(),
            first_cue_policy: FirstCuePolicy::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            report: ReportSettings::default(),
        }
    }
}

impl PlannerSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: PlannerSettings = ron::from_str(&content).map_err(|e| AppError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(AppError::UnsupportedSettingsVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| AppError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        std::fs::write(path, content).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Settings file in a directory
    pub fn settings_file_path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE_NAME)
    }
}
