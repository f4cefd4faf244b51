//! # Arm Equipment Demands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of joints on the arm.
pub const NUM_JOINTS: usize = 4;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Angle demands for every joint of the arm, in degrees.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArmDems {
    pub base_deg: i32,
    pub reach_deg: i32,
    pub height_deg: i32,
    pub claw_deg: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the joints on the arm.
///
/// The declaration order is the order joints are initialised and written in.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum JointId {
    Base,
    Reach,
    Height,
    Claw,
}

/// Error returned when parsing a joint name that doesn't exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown joint name {0:?}, expected one of Base, Reach, Height or Claw")]
pub struct UnknownJoint(pub String);

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl JointId {
    /// All joints, in declaration order.
    pub const ALL: [JointId; NUM_JOINTS] = [
        JointId::Base,
        JointId::Reach,
        JointId::Height,
        JointId::Claw,
    ];

    /// Index of the joint in declaration order.
    pub fn index(self) -> usize {
        match self {
            JointId::Base => 0,
            JointId::Reach => 1,
            JointId::Height => 2,
            JointId::Claw => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            JointId::Base => "Base",
            JointId::Reach => "Reach",
            JointId::Height => "Height",
            JointId::Claw => "Claw",
        }
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JointId {
    type Err = UnknownJoint;

    /// Parse a joint name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JointId::ALL
            .iter()
            .copied()
            .find(|j| j.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownJoint(s.to_string()))
    }
}

impl ArmDems {
    pub fn new(base_deg: i32, reach_deg: i32, height_deg: i32, claw_deg: i32) -> Self {
        Self {
            base_deg,
            reach_deg,
            height_deg,
            claw_deg,
        }
    }

    /// Get the demand for a single joint.
    pub fn get(&self, joint: JointId) -> i32 {
        match joint {
            JointId::Base => self.base_deg,
            JointId::Reach => self.reach_deg,
            JointId::Height => self.height_deg,
            JointId::Claw => self.claw_deg,
        }
    }

    /// Set the demand for a single joint.
    pub fn set(&mut self, joint: JointId, angle_deg: i32) {
        match joint {
            JointId::Base => self.base_deg = angle_deg,
            JointId::Reach => self.reach_deg = angle_deg,
            JointId::Height => self.height_deg = angle_deg,
            JointId::Claw => self.claw_deg = angle_deg,
        }
    }
}

impl fmt::Display for ArmDems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Base: {}, Reach: {}, Height: {}, Claw: {}",
            self.base_deg, self.reach_deg, self.height_deg, self.claw_deg
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_joint_from_str() {
        assert_eq!("Base".parse::<JointId>(), Ok(JointId::Base));
        assert_eq!("height".parse::<JointId>(), Ok(JointId::Height));
        assert_eq!(" CLAW ".parse::<JointId>(), Ok(JointId::Claw));
        assert_eq!(
            "Wrist".parse::<JointId>(),
            Err(UnknownJoint("Wrist".to_string()))
        );
    }

    #[test]
    fn test_joint_order() {
        for (i, j) in JointId::ALL.iter().enumerate() {
            assert_eq!(j.index(), i);
        }
    }

    #[test]
    fn test_dems_get_set() {
        let mut dems = ArmDems::new(1, 2, 3, 4);
        assert_eq!(dems.get(JointId::Height), 3);
        dems.set(JointId::Reach, 20);
        assert_eq!(dems, ArmDems::new(1, 20, 3, 4));
    }
}
