//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::collections::HashMap;

use log::{self, info};
use fern;
use colored::{ColoredString, Colorize};
use serde::Deserialize;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Logging configuration, usually the `[logging]` table of an executable's
/// parameter file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggerParams {
    /// Minimum level for all targets, must be `info` or more verbose.
    pub level: LogLevel,

    /// Per-target overrides, e.g. `"arm_lib::servo_ctrl::sim" = "info"`.
    pub targets: HashMap<String, LogLevel>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level less than `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

/// A log level as written in parameter files.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LoggerParams {
    fn default() -> Self {
        let mut targets = HashMap::new();
        targets.insert("rustyline".to_string(), LogLevel::Info);

        Self {
            level: LogLevel::Debug,
            targets,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Lines go to stdout with coloured level tags and to the session's log file
/// without colour codes. Each line is prefixed with the elapsed session time
/// and the session's executable name.
///
/// # Notes
///
/// - `params.level` must be at least `info`, per-target overrides may be
///   anything.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    params: &LoggerParams,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    let min_level = LevelFilter::from(params.level);
    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new().level(min_level);
    for (target, level) in params.targets.iter() {
        dispatch = dispatch.level_for(target.clone(), LevelFilter::from(*level));
    }

    let stdout_name = session.exec_name.clone();
    let file_name = session.exec_name.clone();

    dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "{} {}",
                        line_prefix(&stdout_name, level_colour(record.level())),
                        line_body(record, message)
                    ))
                })
                .chain(std::io::stdout())
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "{} {}",
                        line_prefix(&file_name, level_tag(record.level())),
                        line_body(record, message)
                    ))
                })
                .chain(log_file)
        )
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    for (target, level) in params.targets.iter() {
        info!("    Log level for {}: {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// `[<elapsed> <tag> <exec>]` with the elapsed session time in seconds.
fn line_prefix<T: std::fmt::Display>(exec_name: &str, tag: T) -> String {
    format!(
        "[{:10.6} {} {}]",
        session::get_elapsed_seconds(),
        tag,
        exec_name
    )
}

/// The message, with the target included for debug and trace lines.
fn line_body(record: &log::Record, message: &std::fmt::Arguments) -> String {
    if record.level() > log::Level::Info {
        format!("{}: {}", record.target(), message)
    }
    else {
        format!("{}", message)
    }
}

/// Get the three letter tag of a log level
fn level_tag(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info  => "INF",
        log::Level::Warn  => "WRN",
        log::Level::Error => "ERR"
    }
}

/// Get the coloured tag of a log level
fn level_colour(level: log::Level) -> ColoredString {
    let tag = level_tag(level);
    match level {
        log::Level::Trace => tag.dimmed().italic(),
        log::Level::Debug => tag.dimmed(),
        log::Level::Info  => tag.normal(),
        log::Level::Warn  => tag.yellow(),
        log::Level::Error => tag.red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_parse() {
        let p: LoggerParams = toml::from_str(
            "level = \"trace\"\n[targets]\n\"arm_lib::servo_ctrl::sim\" = \"info\"\n"
        ).unwrap();

        assert_eq!(p.level, LogLevel::Trace);
        assert_eq!(
            p.targets.get("arm_lib::servo_ctrl::sim"),
            Some(&LogLevel::Info)
        );
    }

    #[test]
    fn test_params_default() {
        let p: LoggerParams = toml::from_str("").unwrap();

        assert_eq!(p, LoggerParams::default());
        assert_eq!(LevelFilter::from(p.level), LevelFilter::Debug);
        assert_eq!(p.targets.get("rustyline"), Some(&LogLevel::Info));
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Off), LevelFilter::Off);
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::Warn);
        assert!(LevelFilter::from(LogLevel::Warn) < log::Level::Info);
        assert!(!(LevelFilter::from(LogLevel::Info) < log::Level::Info));
    }

    #[test]
    fn test_line_prefix() {
        assert_eq!(level_tag(log::Level::Warn), "WRN");

        // Epoch may or may not be set depending on test order, only check the
        // fixed parts
        let prefix = line_prefix("arm_exec", level_tag(log::Level::Info));
        assert!(prefix.starts_with('['));
        assert!(prefix.ends_with(" INF arm_exec]"));
    }
}
