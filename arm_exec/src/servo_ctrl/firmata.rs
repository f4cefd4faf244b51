//! [`ServoDriver`] implementation for a microcontroller running Firmata
//!
//! Only the handful of messages needed to drive hobby servos are implemented. All messages are
//! fire-and-forget, nothing is read back from the board.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashSet;
use std::io::Write;
use std::time::Duration;

use log::{debug, info};
use serialport::SerialPort;

use super::{ServoDriver, ServoError, MAX_ANGLE_DEG};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Firmata command bytes
mod cmd {
    pub const ANALOG_MESSAGE: u8 = 0xE0;
    pub const SET_PIN_MODE: u8 = 0xF4;
    pub const SET_DIGITAL_PIN_VALUE: u8 = 0xF5;
    pub const START_SYSEX: u8 = 0xF0;
    pub const END_SYSEX: u8 = 0xF7;
    pub const SERVO_CONFIG: u8 = 0x70;
    pub const EXTENDED_ANALOG: u8 = 0x6F;
}

/// Firmata pin modes
mod pin_mode {
    pub const OUTPUT: u8 = 0x01;
    pub const SERVO: u8 = 0x04;
}

/// Highest pin addressable by a Firmata message.
const MAX_PIN: u8 = 0x7F;

/// Pins above this can't be addressed by `ANALOG_MESSAGE`.
const MAX_ANALOG_MESSAGE_PIN: u8 = 0x0F;

/// Default pulse width for 0 degrees, matching the Arduino Servo library.
pub const DEFAULT_MIN_PULSE_US: u16 = 544;

/// Default pulse width for 180 degrees, matching the Arduino Servo library.
pub const DEFAULT_MAX_PULSE_US: u16 = 2400;

/// Write timeout for the serial port.
const SERIAL_TIMEOUT: Duration = Duration::from_millis(100);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Servo driver writing Firmata messages to a byte sink (usually a serial port).
pub struct FirmataDriver<S> {
    port: S,

    min_pulse_us: u16,

    max_pulse_us: u16,

    /// Pins which have been configured as servos.
    servo_pins: HashSet<u8>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FirmataDriver<Box<dyn SerialPort>> {
    /// Open a serial port to a Firmata board.
    pub fn open(
        port_name: &str,
        baud_rate: u32,
        min_pulse_us: u16,
        max_pulse_us: u16,
    ) -> Result<Self, ServoError> {
        info!("Opening Firmata board on {} at {} baud", port_name, baud_rate);

        let port = serialport::new(port_name, baud_rate)
            .timeout(SERIAL_TIMEOUT)
            .open()
            .map_err(|e| ServoError::Io(e.into()))?;

        Ok(Self::new(port, min_pulse_us, max_pulse_us))
    }
}

impl<S> FirmataDriver<S>
where
    S: Write,
{
    /// Create a new driver on an already opened byte sink.
    pub fn new(port: S, min_pulse_us: u16, max_pulse_us: u16) -> Self {
        Self {
            port,
            min_pulse_us,
            max_pulse_us,
            servo_pins: HashSet::new(),
        }
    }

    /// Get a reference to the underlying byte sink.
    pub fn get_ref(&self) -> &S {
        &self.port
    }

    fn send(&mut self, msg: &[u8]) -> Result<(), ServoError> {
        self.port.write_all(msg)?;
        self.port.flush()?;
        Ok(())
    }

    /// Put the pin in servo mode and send it the pulse range.
    fn configure_servo(&mut self, pin: u8) -> Result<(), ServoError> {
        debug!("Configuring pin {} as servo", pin);

        self.send(&[cmd::SET_PIN_MODE, pin, pin_mode::SERVO])?;

        let (min_lsb, min_msb) = split_14bit(self.min_pulse_us);
        let (max_lsb, max_msb) = split_14bit(self.max_pulse_us);
        self.send(&[
            cmd::START_SYSEX,
            cmd::SERVO_CONFIG,
            pin,
            min_lsb,
            min_msb,
            max_lsb,
            max_msb,
            cmd::END_SYSEX,
        ])?;

        self.servo_pins.insert(pin);

        Ok(())
    }
}

impl<S> ServoDriver for FirmataDriver<S>
where
    S: Write,
{
    fn set_angle(&mut self, channel: u8, angle_deg: u8) -> Result<(), ServoError> {
        if channel > MAX_PIN {
            return Err(ServoError::InvalidChannel(channel));
        }
        if angle_deg > MAX_ANGLE_DEG {
            return Err(ServoError::InvalidAngle(angle_deg));
        }

        if !self.servo_pins.contains(&channel) {
            self.configure_servo(channel)?;
        }

        let (lsb, msb) = split_14bit(angle_deg as u16);

        if channel <= MAX_ANALOG_MESSAGE_PIN {
            self.send(&[cmd::ANALOG_MESSAGE | channel, lsb, msb])
        }
        else {
            self.send(&[
                cmd::START_SYSEX,
                cmd::EXTENDED_ANALOG,
                channel,
                lsb,
                msb,
                cmd::END_SYSEX,
            ])
        }
    }

    fn detach(&mut self, channel: u8) -> Result<(), ServoError> {
        if channel > MAX_PIN {
            return Err(ServoError::InvalidChannel(channel));
        }

        // Switching to a low output stops the servo pulses entirely
        self.servo_pins.remove(&channel);
        self.send(&[cmd::SET_PIN_MODE, channel, pin_mode::OUTPUT])?;
        self.send(&[cmd::SET_DIGITAL_PIN_VALUE, channel, 0])
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Split a value into two 7-bit bytes, least significant first.
fn split_14bit(value: u16) -> (u8, u8) {
    ((value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8)
}
