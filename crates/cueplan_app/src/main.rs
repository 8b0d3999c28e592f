// SPDX-License-Identifier: MIT OR Apache-2.0
//! `cueplan` - cue scheduling and timeline layout for multi-room shows
//!
//! Loads a show file, resolves every cue's start time from its trigger,
//! packs overlapping cues into lanes and stitches the rooms into one show
//! timeline.
//!
//! ## Architecture
//!
//! Planning lives in `cueplan_timeline`; this binary owns show files,
//! settings and reports.

mod commands;
mod error;
mod report;
mod session;
mod settings;
mod show_file;

use clap::Parser;
use commands::Cli;
use settings::{PlannerSettings, DEFAULT_LOG_FILTER};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_settings(cli: &Cli) -> error::Result<PlannerSettings> {
    match &cli.settings {
        Some(path) => PlannerSettings::load(path),
        None => {
            let dir = std::env::current_dir().map_err(|source| error::AppError::Io {
                path: ".".into(),
                source,
            })?;
            PlannerSettings::load_or_default(&PlannerSettings::settings_file_path(&dir))
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(DEFAULT_LOG_FILTER);
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };
    init_tracing(&settings.log_filter);

    tracing::info!("Starting cueplan v{}", env!("CARGO_PKG_VERSION"));

    match commands::run(&cli.command, &settings, cli.json) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
