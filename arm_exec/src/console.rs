//! Manual control console commands
//!
//! Parses the lines typed into `arm_console`. Joint names are passed through as text so that
//! unknown names follow the arm's name-keyed command path.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::arm::ArmDems;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub const HELP: &str = "\
Commands:
    apply <base> <reach> <height> <claw>   Command all joints (degrees)
    set <joint> <angle>                    Command one joint by name
    info [joint]                           Show joint state
    init                                   Return to the rest pose
    help                                   Show this message
    quit                                   Detach the servos and exit";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCmd {
    Apply(ArmDems),
    Set { joint: String, angle_deg: i32 },
    Info(Option<String>),
    Init,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleParseError {
    #[error("Unknown command {0:?}, type `help` for a list of commands")]
    UnknownCommand(String),

    #[error("`{cmd}` expects {expected} argument(s), got {found}")]
    WrongArgCount {
        cmd: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("Invalid angle {0:?}, expected an integer number of degrees")]
    InvalidAngle(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ConsoleCmd {
    pub fn parse(line: &str) -> Result<Self, ConsoleParseError> {
        let mut words = line.split_whitespace();

        let cmd = match words.next() {
            Some(c) => c.to_ascii_lowercase(),
            None => return Ok(ConsoleCmd::Empty),
        };
        let args: Vec<&str> = words.collect();

        match cmd.as_str() {
            "apply" => {
                check_args("apply", "4", &args, 4, 4)?;
                Ok(ConsoleCmd::Apply(ArmDems::new(
                    parse_angle(args[0])?,
                    parse_angle(args[1])?,
                    parse_angle(args[2])?,
                    parse_angle(args[3])?,
                )))
            }
            "set" => {
                check_args("set", "2", &args, 2, 2)?;
                Ok(ConsoleCmd::Set {
                    joint: args[0].to_string(),
                    angle_deg: parse_angle(args[1])?,
                })
            }
            "info" => {
                check_args("info", "0 or 1", &args, 0, 1)?;
                Ok(ConsoleCmd::Info(args.first().map(|s| s.to_string())))
            }
            "init" => {
                check_args("init", "0", &args, 0, 0)?;
                Ok(ConsoleCmd::Init)
            }
            "help" => Ok(ConsoleCmd::Help),
            "quit" | "exit" | "q" => Ok(ConsoleCmd::Quit),
            _ => Err(ConsoleParseError::UnknownCommand(cmd)),
        }
    }
}

fn check_args(
    cmd: &'static str,
    expected: &'static str,
    args: &[&str],
    min: usize,
    max: usize,
) -> Result<(), ConsoleParseError> {
    if args.len() < min || args.len() > max {
        Err(ConsoleParseError::WrongArgCount {
            cmd,
            expected,
            found: args.len(),
        })
    }
    else {
        Ok(())
    }
}

fn parse_angle(s: &str) -> Result<i32, ConsoleParseError> {
    s.parse()
        .map_err(|_| ConsoleParseError::InvalidAngle(s.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            ConsoleCmd::parse("apply 90 100 120 -5"),
            Ok(ConsoleCmd::Apply(ArmDems::new(90, 100, 120, -5)))
        );
        assert_eq!(
            ConsoleCmd::parse("  SET height 75 "),
            Ok(ConsoleCmd::Set {
                joint: "height".to_string(),
                angle_deg: 75
            })
        );
        assert_eq!(ConsoleCmd::parse("info"), Ok(ConsoleCmd::Info(None)));
        assert_eq!(
            ConsoleCmd::parse("info claw"),
            Ok(ConsoleCmd::Info(Some("claw".to_string())))
        );
        assert_eq!(ConsoleCmd::parse("init"), Ok(ConsoleCmd::Init));
        assert_eq!(ConsoleCmd::parse("q"), Ok(ConsoleCmd::Quit));
        assert_eq!(ConsoleCmd::parse("   "), Ok(ConsoleCmd::Empty));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ConsoleCmd::parse("apply 1 2 3"),
            Err(ConsoleParseError::WrongArgCount {
                cmd: "apply",
                expected: "4",
                found: 3
            })
        );
        assert_eq!(
            ConsoleCmd::parse("set reach ninety"),
            Err(ConsoleParseError::InvalidAngle("ninety".to_string()))
        );
        assert_eq!(
            ConsoleCmd::parse("dance"),
            Err(ConsoleParseError::UnknownCommand("dance".to_string()))
        );
    }
}
