//! Logger setup for the scanner host.
//!
//! The rendered screen owns stdout, so terminal logs always go to stderr and
//! file logs go to `./scanner.log` in the working directory.

use std::fs::File;

use log::LevelFilter;
use serde::Deserialize;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILE: &str = "./scanner.log";

/// Where log records are written. Read from the `app` section of the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum LogDestination {
    #[default]
    File,
    /// stderr only.
    Terminal,
    Both,
    Off,
}

impl LogDestination {
    fn wants_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }

    fn wants_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }
}

pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let loggers = loggers_for(destination, level, scanner_config());
    if loggers.is_empty() {
        return;
    }
    // A logger installed earlier (tests) wins.
    let _ = CombinedLogger::init(loggers);
}

fn loggers_for(
    destination: LogDestination,
    level: LevelFilter,
    config: Config,
) -> Vec<Box<dyn SharedLogger>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if level == LevelFilter::Off {
        return loggers;
    }
    if destination.wants_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if destination.wants_file() {
        match File::create(LOG_FILE) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => eprintln!("Warning: could not create {LOG_FILE}: {err}"),
        }
    }
    loggers
}

fn scanner_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Debug)
        .build()
}
