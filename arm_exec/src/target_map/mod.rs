//! Target mapping module
//!
//! Converts perception samples into joint demands by interpolating each perception signal across
//! the matching joint's current limits.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

use comms_if::eqpt::arm::JointId;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised when building a TargetMapper.
#[derive(Debug, thiserror::Error)]
pub enum TargetMapError {
    #[error("The input domain for the {axis} joint must have min < max, got {domain:?}")]
    DegenerateDomain { axis: JointId, domain: [f64; 2] },

    #[error("The image size must be positive, got {0:?}")]
    InvalidImageSize([f64; 2]),
}
