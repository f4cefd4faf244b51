//! Implementations for the TargetMapper state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use util::maths::lin_interp;

// Internal
use super::{AxisMapping, Params, TargetMapError};
use crate::arm_ctrl::{self, ArmCtrl, ArmCtrlError};
use crate::servo_ctrl::ServoDriver;
use comms_if::eqpt::{
    arm::{ArmDems, JointId},
    perception::TargetSample,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Target mapping module state
pub struct TargetMapper {
    params: Params,

    /// Whether the previous cycle had a target.
    tracking: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Result of one perception cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutput {
    /// A target was tracked and `dems` were applied to the arm.
    Tracking {
        dems: ArmDems,
        report: arm_ctrl::StatusReport,
    },

    /// No target, the arm was returned to its rest pose.
    Lost { report: arm_ctrl::StatusReport },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TargetMapper {
    pub fn new(params: Params) -> Result<Self, TargetMapError> {
        params.validate()?;

        Ok(Self {
            params,
            tracking: false,
        })
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Compute joint demands for a sample against the arm's current joint limits.
    pub fn map<D: ServoDriver>(&self, sample: &TargetSample, arm: &ArmCtrl<D>) -> ArmDems {
        let [width_px, height_px] = self.params.image_size_px;

        let mut dems = ArmDems::default();

        for &id in JointId::ALL.iter() {
            let input = match id {
                JointId::Base => sample.x * width_px,
                JointId::Reach => sample.depth,
                JointId::Height => sample.y * height_px,
                JointId::Claw => sample.raised_fingers as f64,
            };

            dems.set(id, map_axis(self.params.axis(id), input, arm.limits_deg(id)));
        }

        dems
    }

    /// Run one perception cycle.
    ///
    /// With a sample the mapped demands are applied to the arm in one batch. Without one the
    /// arm is returned to its rest pose.
    pub fn proc<D: ServoDriver>(
        &mut self,
        sample: Option<&TargetSample>,
        arm: &mut ArmCtrl<D>,
    ) -> Result<CycleOutput, ArmCtrlError> {
        match sample {
            Some(s) => {
                if !self.tracking {
                    info!("Target acquired");
                    self.tracking = true;
                }

                let dems = self.map(s, arm);
                debug!("Target {:?} mapped to {}", s, dems);

                let report = arm.apply(&dems)?;

                Ok(CycleOutput::Tracking { dems, report })
            }
            None => {
                if self.tracking {
                    info!("Target lost, returning arm to rest pose");
                    self.tracking = false;
                }

                let report = arm.initialize()?;

                Ok(CycleOutput::Lost { report })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Interpolate `input` across the mapping's domain onto `(min, max)` limits.
///
/// The result is truncated to whole degrees. A NaN input is treated as the domain minimum.
fn map_axis(mapping: &AxisMapping, input: f64, limits_deg: (i32, i32)) -> i32 {
    let (min, max) = (limits_deg.0 as f64, limits_deg.1 as f64);
    let target_range = if mapping.reversed { (max, min) } else { (min, max) };

    let input = if input.is_nan() { mapping.domain[0] } else { input };

    lin_interp((mapping.domain[0], mapping.domain[1]), target_range, input) as i32
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
