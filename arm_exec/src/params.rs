//! # Arm Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use util::logger::LoggerParams;

use crate::servo_ctrl::firmata::{DEFAULT_MAX_PULSE_US, DEFAULT_MIN_PULSE_US};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct ArmExecParams {

    /// Serial link to the servo board
    pub transport: TransportParams,

    /// Time to wait after opening the transport before the first command. Opening the port
    /// resets most boards.
    ///
    /// Units: seconds
    pub settle_time_s: f64,

    /// Log levels, defaults to debug with rustyline held at info
    #[serde(default)]
    pub logging: LoggerParams,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TransportParams {

    /// Serial port the board is attached to, e.g. `/dev/ttyACM0`
    pub port: String,

    /// Baud rate of the serial link
    pub baud_rate: u32,

    /// Pulse width for 0 degrees
    ///
    /// Units: microseconds
    #[serde(default = "default_min_pulse_us")]
    pub min_pulse_us: u16,

    /// Pulse width for 180 degrees
    ///
    /// Units: microseconds
    #[serde(default = "default_max_pulse_us")]
    pub max_pulse_us: u16,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_min_pulse_us() -> u16 {
    DEFAULT_MIN_PULSE_US
}

fn default_max_pulse_us() -> u16 {
    DEFAULT_MAX_PULSE_US
}

#[cfg(test)]
mod test {
    use super::*;
    use util::logger::LogLevel;

    #[test]
    fn test_param_file() {
        let p: ArmExecParams = toml::from_str(include_str!("../../params/arm_exec.toml")).unwrap();
        assert_eq!(p.transport.baud_rate, 57600);
        assert_eq!(p.transport.min_pulse_us, 544);
        assert!(p.settle_time_s >= 0.0);
        assert_eq!(p.logging.level, LogLevel::Debug);
        assert_eq!(
            p.logging.targets.get("arm_lib::servo_ctrl::sim"),
            Some(&LogLevel::Info)
        );
    }

    #[test]
    fn test_pulse_defaults() {
        let p: ArmExecParams = toml::from_str(
            "settle_time_s = 0.0\n[transport]\nport = \"/dev/null\"\nbaud_rate = 9600\n",
        )
        .unwrap();
        assert_eq!(p.transport.min_pulse_us, DEFAULT_MIN_PULSE_US);
        assert_eq!(p.transport.max_pulse_us, DEFAULT_MAX_PULSE_US);
        assert_eq!(p.logging, LoggerParams::default());
    }
}
