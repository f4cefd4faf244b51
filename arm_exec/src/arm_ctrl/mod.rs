//! Arm control module
//!
//! Owns the four joints of the arm and keeps the reach and height joints from interfering with
//! each other.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod coupling;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use coupling::*;
pub use params::*;
pub use state::*;

use comms_if::eqpt::arm::JointId;
use crate::servo_ctrl::ServoError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Transport failure while commanding the {joint} joint: {source}")]
    Transport {
        joint: JointId,
        #[source]
        source: ServoError,
    },

    #[error("Invalid arm parameters: {0}")]
    InvalidParams(String),
}
