//! # Servo Controller Module
//!
//! This module provides a unified servo control interface which can abstract over different types
//! of servo transport, and the [`Joint`] type which owns a single positional servo.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`ServoDriver`] implementation speaking the Firmata protocol to a microcontroller.
pub mod firmata;

/// A single positional servo with angle limits and write suppression.
pub mod joint;

/// In-memory [`ServoDriver`] used for dry runs and tests.
pub mod sim;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use firmata::FirmataDriver;
pub use joint::{Joint, Limit};
pub use sim::{SimDriver, SimEvent};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest angle a positional servo can be commanded to.
pub const MAX_ANGLE_DEG: u8 = 180;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing servo transports.
///
/// Writes are fire-and-forget, no acknowledgement is awaited from the hardware.
pub trait ServoDriver {

    /// Command the servo on `channel` to `angle_deg`.
    ///
    /// ## Arguments
    /// - `channel` - The hardware channel (pin) the servo is connected to
    /// - `angle_deg` - The angle to set. Must be between 0 and 180. Values outside this range
    ///   will be rejected.
    fn set_angle(&mut self, channel: u8, angle_deg: u8) -> Result<(), ServoError>;

    /// Stop driving the servo on `channel`, leaving it unpowered.
    fn detach(&mut self, channel: u8) -> Result<(), ServoError>;

}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ServoError {
    #[error("Transport write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("The transport is disconnected")]
    Disconnected,

    #[error("Channel {0} is not supported by the transport")]
    InvalidChannel(u8),

    #[error("Angle must be between 0 and 180 degrees, got {0}")]
    InvalidAngle(u8)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<D> ServoDriver for Box<D>
where
    D: ServoDriver + ?Sized
{
    fn set_angle(&mut self, channel: u8, angle_deg: u8) -> Result<(), ServoError> {
        (**self).set_angle(channel, angle_deg)
    }

    fn detach(&mut self, channel: u8) -> Result<(), ServoError> {
        (**self).detach(channel)
    }
}
