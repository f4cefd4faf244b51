//! Reach/height mechanical coupling
//!
//! Raising the arm past a threshold requires retracting reach and extending reach past a
//! threshold requires limiting height. This is modelled as a line in (reach, height) space:
//!
//! ```text
//! height_floor = slope * reach + intercept
//! reach_floor  = (height - intercept) / slope
//! ```
//!
//! Each joint's floor is computed from the other joint's committed angle at the time of the
//! write, so the result depends on write order.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Linear floor relation between the reach and height joints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coupling {
    /// Slope of the height floor against reach.
    ///
    /// Units: degrees/degree
    pub slope: f64,

    /// Height floor when reach is at 0 degrees.
    ///
    /// Units: degrees
    pub intercept_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Coupling {
    fn default() -> Self {
        Self {
            slope: -0.75,
            intercept_deg: 165.0,
        }
    }
}

impl Coupling {
    /// Lowest height angle allowed with reach at `reach_deg`.
    pub fn height_floor_deg(&self, reach_deg: i32) -> f64 {
        self.slope * reach_deg as f64 + self.intercept_deg
    }

    /// Lowest reach angle allowed with height at `height_deg`.
    pub fn reach_floor_deg(&self, height_deg: i32) -> f64 {
        (height_deg as f64 - self.intercept_deg) / self.slope
    }

    /// The slope must be finite and non-zero for the reach floor to exist.
    pub fn is_valid(&self) -> bool {
        self.slope.is_finite() && self.slope != 0.0 && self.intercept_deg.is_finite()
    }
}

/// Raise `requested_deg` to `floor_deg` if it is below it.
///
/// The floor is rounded up so the returned angle never sits below it. Returns the angle and
/// whether it was raised.
pub fn apply_floor(requested_deg: i32, floor_deg: f64) -> (i32, bool) {
    if (requested_deg as f64) < floor_deg {
        (floor_deg.ceil() as i32, true)
    }
    else {
        (requested_deg, false)
    }
}
