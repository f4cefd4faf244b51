//! # Perception Samples
//!
//! Data produced by the perception pipeline once per frame. A frame where no
//! hand is tracked is represented by the absence of a sample (`None`, or
//! `null` in JSON), never by a sentinel value.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One sample of the tracked target.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TargetSample {
    /// Horizontal position of the tracked point in normalised image coordinates [0, 1].
    pub x: f64,

    /// Vertical position of the tracked point in normalised image coordinates [0, 1].
    pub y: f64,

    /// Unitless depth estimate, larger when the target is closer to the camera.
    pub depth: f64,

    /// Number of raised fingers, 0 to 5.
    pub raised_fingers: u8,
}
