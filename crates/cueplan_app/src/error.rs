// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application errors.

use cueplan_timeline::{DocumentError, ResolveError, ValidationError};
use std::path::PathBuf;

/// Anything that can stop a command
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Reading or writing a file failed
    #[error("{}: {source}", .path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Show file could not be read
    #[error("{}: {source}", .path.display())]
    Document {
        /// Show file
        path: PathBuf,
        /// Underlying error
        source: DocumentError,
    },

    /// Show files must be `.json`
    #[error("{} is not a show file (expected a .json extension)", .0.display())]
    NotAShowFile(PathBuf),

    /// Refusing to overwrite an existing file
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// Settings file could not be parsed or written
    #[error("Settings {}: {message}", .path.display())]
    Settings {
        /// Settings file
        path: PathBuf,
        /// Parser or serializer message
        message: String,
    },

    /// Settings written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedSettingsVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },

    /// Timeline could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Edit produced an invalid show
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// JSON output failed
    #[error("JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad command-line value
    #[error("{0}")]
    InvalidArgument(String),
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;
