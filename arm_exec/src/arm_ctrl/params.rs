//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::arm::JointId;
use serde::{Deserialize, Serialize};

use super::{ArmCtrlError, Coupling};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    // ---- JOINTS ----
    pub base: JointParams,

    pub reach: JointParams,

    pub height: JointParams,

    pub claw: JointParams,

    // ---- CONSTRAINTS ----
    /// Coupling between the reach and height joints.
    pub coupling: Coupling,

    // ---- REST POSE ----
    /// Angle the base is attached at. All other joints attach at the midpoint of their limits.
    ///
    /// Units: degrees
    pub base_attach_deg: i32,
}

/// Parameters for a single joint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JointParams {
    /// Hardware channel (pin) of the servo.
    pub channel: u8,

    /// `[min, max]` angle limits. Values outside [0, 180] are clamped and an inverted pair is
    /// swapped when applied.
    ///
    /// Units: degrees
    pub limits_deg: [i32; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            base: JointParams {
                channel: 8,
                limits_deg: [10, 170],
            },
            reach: JointParams {
                channel: 9,
                limits_deg: [60, 160],
            },
            height: JointParams {
                channel: 10,
                limits_deg: [70, 170],
            },
            claw: JointParams {
                channel: 11,
                limits_deg: [100, 170],
            },
            coupling: Coupling::default(),
            base_attach_deg: 60,
        }
    }
}

impl Params {
    /// Get the parameters of one joint.
    pub fn joint(&self, id: JointId) -> &JointParams {
        match id {
            JointId::Base => &self.base,
            JointId::Reach => &self.reach,
            JointId::Height => &self.height,
            JointId::Claw => &self.claw,
        }
    }

    /// Check the parameters can be used to drive the arm.
    ///
    /// Out of range limits are not an error, they are clamped when applied.
    pub fn validate(&self) -> Result<(), ArmCtrlError> {
        for (i, a) in JointId::ALL.iter().enumerate() {
            for b in JointId::ALL.iter().skip(i + 1) {
                if self.joint(*a).channel == self.joint(*b).channel {
                    return Err(ArmCtrlError::InvalidParams(format!(
                        "{} and {} joints share channel {}",
                        a,
                        b,
                        self.joint(*a).channel
                    )));
                }
            }
        }

        if !self.coupling.is_valid() {
            return Err(ArmCtrlError::InvalidParams(format!(
                "coupling slope must be finite and non-zero, got {:?}",
                self.coupling
            )));
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
    fn test_shared_channel() {
        let mut p = Params::default();
        p.claw.channel = p.reach.channel;
        assert!(matches!(p.validate(), Err(ArmCtrlError::InvalidParams(_))));
    }

    #[test]
    fn test_zero_slope() {
        let mut p = Params::default();
        p.coupling.slope = 0.0;
        assert!(matches!(p.validate(), Err(ArmCtrlError::InvalidParams(_))));
    }

    #[test]
    fn test_param_file() {
        let p: Params = toml::from_str(include_str!("../../../params/arm_ctrl.toml")).unwrap();
        assert!(p.validate().is_ok());
        assert_eq!(p.reach.limits_deg, [60, 160]);
        assert_eq!(p.base_attach_deg, 60);
        assert_eq!(p.coupling, Coupling::default());
    }
}
