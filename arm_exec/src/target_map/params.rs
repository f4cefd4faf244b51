//! Parameters structure for TargetMapper

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::arm::JointId;
use serde::{Deserialize, Serialize};

use super::TargetMapError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for target mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Size of the camera image the normalised target position is scaled to.
    ///
    /// Units: pixels, `[width, height]`
    pub image_size_px: [f64; 2],

    /// Horizontal target position to base angle.
    ///
    /// Units: pixels
    pub base: AxisMapping,

    /// Depth estimate to reach angle.
    pub reach: AxisMapping,

    /// Vertical target position to height angle.
    ///
    /// Units: pixels
    pub height: AxisMapping,

    /// Raised finger count to claw angle.
    pub claw: AxisMapping,
}

/// Mapping of one perception signal onto a joint's limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisMapping {
    /// `[min, max]` input range. Inputs outside it are held at the nearest edge.
    pub domain: [f64; 2],

    /// If true the domain minimum maps to the joint's maximum angle.
    pub reversed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            image_size_px: [640.0, 480.0],
            base: AxisMapping {
                domain: [0.0, 640.0],
                reversed: true,
            },
            reach: AxisMapping {
                domain: [30.0, 120.0],
                reversed: true,
            },
            height: AxisMapping {
                domain: [0.0, 480.0],
                reversed: true,
            },
            claw: AxisMapping {
                domain: [0.0, 5.0],
                reversed: true,
            },
        }
    }
}

impl Params {
    pub fn axis(&self, id: JointId) -> &AxisMapping {
        match id {
            JointId::Base => &self.base,
            JointId::Reach => &self.reach,
            JointId::Height => &self.height,
            JointId::Claw => &self.claw,
        }
    }

    /// Check every domain is usable for interpolation.
    pub fn validate(&self) -> Result<(), TargetMapError> {
        let [w, h] = self.image_size_px;
        if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
            return Err(TargetMapError::InvalidImageSize(self.image_size_px));
        }

        for &id in JointId::ALL.iter() {
            let domain = self.axis(id).domain;
            if !(domain[0].is_finite() && domain[1].is_finite() && domain[0] < domain[1]) {
                return Err(TargetMapError::DegenerateDomain { axis: id, domain });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn test_degenerate_domain() {
        let mut p = Params::default();
        p.reach.domain = [120.0, 30.0];
        assert!(matches!(
            p.validate(),
            Err(TargetMapError::DegenerateDomain { axis: JointId::Reach, .. })
        ));

        let mut p = Params::default();
        p.claw.domain = [5.0, 5.0];
        assert!(p.validate().is_err());

        let mut p = Params::default();
        p.base.domain = [0.0, std::f64::INFINITY];
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_bad_image_size() {
        let mut p = Params::default();
        p.image_size_px = [0.0, 480.0];
        assert!(matches!(p.validate(), Err(TargetMapError::InvalidImageSize(_))));
    }

    #[test]
    fn test_param_file() {
        let p: Params =
            toml::from_str(include_str!("../../../params/target_map.toml")).unwrap();
        assert!(p.validate().is_ok());
        assert_eq!(p.image_size_px, [640.0, 480.0]);
        assert_eq!(p.reach, Params::default().reach);
    }
}
