//! # Script interpreter module
//!
//! This module provides an interpreter for timed scripts. Each entry in a
//! script is a timestamp in seconds followed by a JSON payload terminated with
//! a semicolon:
//!
//! ```text
//! 0.0: {"x": 0.5, "y": 0.5, "depth": 75.0, "raised_fingers": 2};
//! 1.5: null;
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::fs;
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An entry which is scripted to occur at a specific time.
#[derive(Debug, Clone, PartialEq)]
pub struct Command<T> {
    /// The time the entry is supposed to execute at
    pub exec_time_s: f64,

    /// The payload of the entry
    pub payload: T
}

/// A script interpreter.
///
/// After initialising with the path to the script use `.pop_next` to step
/// through the entries in order. Timing is left to the caller.
pub struct ScriptInterpreter<T> {
    cmds: VecDeque<Command<T>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script timestamps must not decrease, found {1} s after {0} s")]
    OutOfOrder(f64, f64),

    #[error("Script contains an invalid payload at {0} s: {1}")]
    InvalidPayload(f64, serde_json::Error)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> ScriptInterpreter<T>
where
    T: DeserializeOwned
{

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());
        
        // Check that the script file exists.
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.display().to_string()));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        Self::parse(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn parse(script: &str) -> Result<Self, ScriptError> {
        // Empty queue of commands
        let mut queue: VecDeque<Command<T>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("script regex is valid");

        let mut last_time_s = 0.0;

        for cap in re.captures_iter(script) {
            // Parse the exec time
            let exec_time_s: f64 = cap[1]
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // Must be representable as a wait, long digit runs parse to huge
            // values or infinity
            if Duration::try_from_secs_f64(exec_time_s).is_err() {
                return Err(ScriptError::InvalidTimestamp(cap[1].to_string()))
            }

            if exec_time_s < last_time_s {
                return Err(ScriptError::OutOfOrder(last_time_s, exec_time_s))
            }
            last_time_s = exec_time_s;

            // The scripts contain JSON only.
            let payload = serde_json::from_str(cap[3].trim())
                .map_err(|e| ScriptError::InvalidPayload(exec_time_s, e))?;

            queue.push_back(Command {
                exec_time_s,
                payload
            });
        }

        if queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            cmds: queue
        })
    }
}

impl<T> ScriptInterpreter<T> {
    /// Pop the next entry regardless of its execution time.
    pub fn pop_next(&mut self) -> Option<Command<T>> {
        self.cmds.pop_front()
    }

    /// Get the number of entries remaining in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let script = "\
            0.0: 1;\n\
            0.5: 2;\n\
            # comments are ignored\n\
            2: 3;\n";
        let mut interp: ScriptInterpreter<u32> = ScriptInterpreter::parse(script).unwrap();

        assert_eq!(interp.get_num_cmds(), 3);
        assert_eq!(interp.get_duration(), 2.0);

        assert_eq!(interp.pop_next().map(|c| c.payload), Some(1));
        assert_eq!(interp.pop_next().map(|c| (c.exec_time_s, c.payload)), Some((0.5, 2)));
        assert_eq!(interp.get_num_cmds(), 1);
    }

    #[test]
    fn test_unrepresentable_timestamp() {
        assert!(matches!(
            ScriptInterpreter::<Option<u32>>::parse("99999999999999999999999: null;"),
            Err(ScriptError::InvalidTimestamp(_))
        ));

        let huge = format!("{}: null;", "9".repeat(400));
        assert!(matches!(
            ScriptInterpreter::<Option<u32>>::parse(&huge),
            Err(ScriptError::InvalidTimestamp(_))
        ));

        assert!(ScriptInterpreter::<Option<u32>>::parse("86400.5: null;").is_ok());
    }

    #[test]
    fn test_option_payloads() {
        let mut interp: ScriptInterpreter<Option<u32>> =
            ScriptInterpreter::parse("0.0: 4;\n0.1: null;\n").unwrap();

        assert_eq!(interp.pop_next(), Some(Command { exec_time_s: 0.0, payload: Some(4) }));
        assert_eq!(interp.pop_next(), Some(Command { exec_time_s: 0.1, payload: None }));
        assert_eq!(interp.pop_next(), None);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            ScriptInterpreter::<u32>::parse("nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::<u32>::parse("0.0: \"text\";"),
            Err(ScriptError::InvalidPayload(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::<u32>::parse("1.0: 1;\n0.5: 2;"),
            Err(ScriptError::OutOfOrder(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::<u32>::new("/not/a/script.txt"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
