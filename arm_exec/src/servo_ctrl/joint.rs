//! A single positional servo joint

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::arm::JointId;
use log::trace;
use std::fmt;
use util::maths::clamp;

use super::{ServoDriver, ServoError, MAX_ANGLE_DEG};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One positional servo of the arm.
///
/// The joint never reads the hardware back, the last angle accepted by the transport is treated
/// as the servo's position.
#[derive(Debug, Clone)]
pub struct Joint {
    id: JointId,

    channel: u8,

    /// Last angle accepted by the transport.
    ///
    /// Units: degrees
    commanded_deg: i32,

    /// `[min, max]`, `min <= max` always holds.
    ///
    /// Units: degrees
    limits_deg: [i32; 2],

    /// True while the servo is holding `commanded_deg`. Writes are only suppressed while
    /// energised.
    energised: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Which of the two angle limits to access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Min,
    Max,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Joint {
    /// Create a new joint on the given channel with the full [0, 180] range.
    pub fn new(id: JointId, channel: u8) -> Self {
        Self {
            id,
            channel,
            commanded_deg: 0,
            limits_deg: [0, MAX_ANGLE_DEG as i32],
            energised: false,
        }
    }

    pub fn id(&self) -> JointId {
        self.id
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }

    /// Get one of the joint's angle limits.
    pub fn limit(&self, bound: Limit) -> i32 {
        self.limits_deg[bound.index()]
    }

    pub fn min_deg(&self) -> i32 {
        self.limit(Limit::Min)
    }

    pub fn max_deg(&self) -> i32 {
        self.limit(Limit::Max)
    }

    /// Mean of the two limits, rounded down.
    pub fn midpoint_deg(&self) -> i32 {
        (self.min_deg() + self.max_deg()) / 2
    }

    /// Set one of the joint's angle limits.
    ///
    /// The angle is clamped to [0, 180]. If the new value leaves the minimum above the maximum
    /// the two limits are swapped, so this never fails.
    pub fn set_limit(&mut self, bound: Limit, angle_deg: i32) {
        self.limits_deg[bound.index()] = clamp(&angle_deg, &0, &(MAX_ANGLE_DEG as i32));

        if self.limits_deg[1] < self.limits_deg[0] {
            self.limits_deg.swap(0, 1);
        }
    }

    /// Clamp an angle into the joint's limits.
    pub fn clamp_to_limits(&self, angle_deg: i32) -> i32 {
        clamp(&angle_deg, &self.min_deg(), &self.max_deg())
    }

    /// Attach the servo, moving it to `angle_deg` or the midpoint of the limits if `None`.
    ///
    /// Returns whether a transport write was issued.
    pub fn attach<D: ServoDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        angle_deg: Option<i32>,
    ) -> Result<bool, ServoError> {
        let angle_deg = angle_deg.unwrap_or_else(|| self.midpoint_deg());
        self.write(driver, angle_deg)
    }

    /// Command the servo to `angle_deg`, clamped to the joint's limits.
    ///
    /// If the servo is already holding the clamped angle nothing is sent. Returns whether a
    /// transport write was issued. The commanded angle only changes once the transport has
    /// accepted the write.
    pub fn write<D: ServoDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        angle_deg: i32,
    ) -> Result<bool, ServoError> {
        let angle_deg = self.clamp_to_limits(angle_deg);

        if self.energised && angle_deg == self.commanded_deg {
            return Ok(false);
        }

        // Limits are always inside [0, 180] so this can't truncate
        driver.set_angle(self.channel, angle_deg as u8)?;

        trace!("{} (ch {}) -> {} deg", self.id, self.channel, angle_deg);

        self.commanded_deg = angle_deg;
        self.energised = true;

        Ok(true)
    }

    /// The last angle sent to the servo.
    pub fn read(&self) -> i32 {
        self.commanded_deg
    }

    /// Stop driving the servo.
    ///
    /// The commanded angle is kept, but the next write will always be sent.
    pub fn detach<D: ServoDriver + ?Sized>(&mut self, driver: &mut D) -> Result<(), ServoError> {
        self.energised = false;
        driver.detach(self.channel)
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {{ ch: {} ; angle: {} ; limits: [{}, {}] ; {} }}",
            self.id,
            self.channel,
            self.commanded_deg,
            self.min_deg(),
            self.max_deg(),
            if self.energised { "attached" } else { "detached" }
        )
    }
}

impl Limit {
    fn index(self) -> usize {
        match self {
            Limit::Min => 0,
            Limit::Max => 1,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::servo_ctrl::{SimDriver, SimEvent};

    fn joint_with_limits(min: i32, max: i32) -> Joint {
        let mut j = Joint::new(JointId::Reach, 9);
        j.set_limit(Limit::Min, min);
        j.set_limit(Limit::Max, max);
        j
    }

    #[test]
    fn test_write_read_clamps() {
        let mut drv = SimDriver::new();
        let mut j = joint_with_limits(60, 160);

        for &a in &[-40, 0, 59, 60, 61, 100, 159, 160, 161, 180, 500] {
            j.write(&mut drv, a).unwrap();
            assert_eq!(j.read(), clamp(&a, &60, &160));
            assert!(j.read() >= j.min_deg() && j.read() <= j.max_deg());
        }
    }

    #[test]
    fn test_write_suppression() {
        let mut drv = SimDriver::new();
        let mut j = joint_with_limits(60, 160);

        assert!(j.write(&mut drv, 100).unwrap());
        assert!(!j.write(&mut drv, 100).unwrap());
        assert_eq!(drv.num_sets(), 1);

        // Both clamp to 160, so the second is suppressed
        assert!(j.write(&mut drv, 170).unwrap());
        assert!(!j.write(&mut drv, 175).unwrap());
        assert_eq!(drv.num_sets(), 2);
    }

    #[test]
    fn test_first_write_always_sent() {
        let mut drv = SimDriver::new();
        let mut j = joint_with_limits(0, 180);

        // Commanded angle starts at zero but the servo isn't driven yet
        assert_eq!(j.read(), 0);
        assert!(j.write(&mut drv, 0).unwrap());
        assert_eq!(drv.events(), &[SimEvent::Set { channel: 9, angle_deg: 0 }]);
    }

    #[test]
    fn test_set_limit_swaps() {
        let mut j = Joint::new(JointId::Base, 8);

        j.set_limit(Limit::Min, 170);
        j.set_limit(Limit::Max, 10);
        assert_eq!((j.min_deg(), j.max_deg()), (10, 170));

        j.set_limit(Limit::Max, 5);
        assert_eq!((j.min_deg(), j.max_deg()), (5, 10));

        j.set_limit(Limit::Min, -30);
        j.set_limit(Limit::Max, 400);
        assert_eq!((j.min_deg(), j.max_deg()), (0, 180));
    }

    #[test]
    fn test_set_limit_any_order_normalised() {
        let values = [-10, 0, 45, 90, 135, 180, 200];
        for &a in &values {
            for &b in &values {
                for &first_max in &[true, false] {
                    let mut j = Joint::new(JointId::Height, 10);
                    if first_max {
                        j.set_limit(Limit::Max, a);
                        j.set_limit(Limit::Min, b);
                    } else {
                        j.set_limit(Limit::Min, a);
                        j.set_limit(Limit::Max, b);
                    }
                    assert!(j.min_deg() <= j.max_deg());
                    assert!(j.min_deg() >= 0 && j.max_deg() <= 180);
                }
            }
        }
    }

    #[test]
    fn test_attach() {
        let mut drv = SimDriver::new();
        let mut j = joint_with_limits(70, 170);

        assert!(j.attach(&mut drv, None).unwrap());
        assert_eq!(j.read(), 120);

        // Odd sums round down
        let mut j = joint_with_limits(100, 171);
        j.attach(&mut drv, None).unwrap();
        assert_eq!(j.read(), 135);

        let mut j = joint_with_limits(10, 170);
        j.attach(&mut drv, Some(60)).unwrap();
        assert_eq!(j.read(), 60);
    }

    #[test]
    fn test_detach() {
        let mut drv = SimDriver::new();
        let mut j = joint_with_limits(60, 160);

        j.write(&mut drv, 100).unwrap();
        j.detach(&mut drv).unwrap();

        assert_eq!(j.read(), 100);
        assert!(!j.is_energised());
        assert_eq!(drv.events().last(), Some(&SimEvent::Detach { channel: 9 }));

        // Re-driving the same angle after a detach must reach the hardware
        assert!(j.write(&mut drv, 100).unwrap());
    }

    #[test]
    fn test_failed_write_keeps_angle() {
        let mut drv = SimDriver::new();
        let mut j = joint_with_limits(60, 160);

        j.write(&mut drv, 100).unwrap();
        drv.disconnect();

        assert!(matches!(j.write(&mut drv, 120), Err(ServoError::Disconnected)));
        assert_eq!(j.read(), 100);
    }
}
