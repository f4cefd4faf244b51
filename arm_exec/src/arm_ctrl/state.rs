//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;
use std::fmt;

// Internal
use super::{apply_floor, ArmCtrlError, Params};
use crate::servo_ctrl::{Joint, Limit, ServoDriver};
use comms_if::eqpt::arm::{ArmDems, JointId, NUM_JOINTS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
///
/// Owns the servo transport and one [`Joint`] per [`JointId`].
pub struct ArmCtrl<D: ServoDriver> {
    params: Params,

    driver: D,

    /// Indexed by `JointId::index`
    joints: [Joint; NUM_JOINTS],

    report: StatusReport,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq, Eq)]
pub struct StatusReport {
    /// Joints whose demand was raised by the reach/height coupling floor.
    pub floor_limited: [bool; NUM_JOINTS],

    /// Joints whose demand was clamped to the joint's own limits.
    pub abs_pos_limited: [bool; NUM_JOINTS],

    /// Number of commands sent to the transport.
    pub writes_issued: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D: ServoDriver> ArmCtrl<D> {
    /// Create a new arm controller and move the arm to its rest pose.
    pub fn new(params: Params, driver: D) -> Result<Self, ArmCtrlError> {
        params.validate()?;

        let joints = [
            Joint::new(JointId::Base, params.base.channel),
            Joint::new(JointId::Reach, params.reach.channel),
            Joint::new(JointId::Height, params.height.channel),
            Joint::new(JointId::Claw, params.claw.channel),
        ];

        let mut arm = Self {
            params,
            driver,
            joints,
            report: StatusReport::default(),
        };

        arm.initialize()?;

        Ok(arm)
    }

    /// Apply the configured limits to every joint and attach it, moving the arm to its rest
    /// pose.
    ///
    /// The coupling floor is not applied here. Can be called repeatedly, joints already at
    /// their rest angle are not rewritten.
    pub fn initialize(&mut self) -> Result<StatusReport, ArmCtrlError> {
        self.report = StatusReport::default();

        for &id in JointId::ALL.iter() {
            let limits_deg = self.params.joint(id).limits_deg;
            let attach_deg = match id {
                JointId::Base => Some(self.params.base_attach_deg),
                _ => None,
            };

            let joint = &mut self.joints[id.index()];
            joint.set_limit(Limit::Min, limits_deg[0]);
            joint.set_limit(Limit::Max, limits_deg[1]);

            if let Some(a) = attach_deg {
                self.report.abs_pos_limited[id.index()] = joint.clamp_to_limits(a) != a;
            }

            let issued = joint
                .attach(&mut self.driver, attach_deg)
                .map_err(|source| ArmCtrlError::Transport { joint: id, source })?;

            if issued {
                self.report.writes_issued += 1;
            }
        }

        debug!("Arm initialised to rest pose ({})", self.commanded());

        Ok(self.report)
    }

    /// Command all four joints from one set of demands.
    ///
    /// Joints are written in the order Base, Reach, Height, Claw. The reach floor is computed
    /// from the height angle committed on the previous cycle, the height floor from the reach
    /// angle just written on this cycle.
    pub fn apply(&mut self, dems: &ArmDems) -> Result<StatusReport, ArmCtrlError> {
        self.report = StatusReport::default();

        for &id in JointId::ALL.iter() {
            self.command(id, dems.get(id))?;
        }

        trace!(
            "ArmCtrl applied {} -> {} ({} writes)",
            dems,
            self.commanded(),
            self.report.writes_issued
        );

        Ok(self.report)
    }

    /// Command a single joint, applying the coupling floor from the other joint's committed
    /// angle.
    pub fn single(&mut self, id: JointId, angle_deg: i32) -> Result<StatusReport, ArmCtrlError> {
        self.report = StatusReport::default();

        self.command(id, angle_deg)?;

        Ok(self.report)
    }

    /// Command a single joint by name.
    ///
    /// Names are matched ignoring case. An unknown name is logged and ignored.
    pub fn single_by_name(
        &mut self,
        name: &str,
        angle_deg: i32,
    ) -> Result<StatusReport, ArmCtrlError> {
        match name.parse::<JointId>() {
            Ok(id) => self.single(id, angle_deg),
            Err(e) => {
                warn!("{}, command ignored", e);
                Ok(StatusReport::default())
            }
        }
    }

    /// Detach every joint and release the transport.
    ///
    /// Transport errors are logged but not returned, the arm is being shut down anyway.
    pub fn close(mut self) -> D {
        for joint in self.joints.iter_mut() {
            if let Err(e) = joint.detach(&mut self.driver) {
                warn!("Could not detach the {} joint: {}", joint.id(), e);
            }
        }

        debug!("Arm closed");

        self.driver
    }

    pub fn joint(&self, id: JointId) -> &Joint {
        &self.joints[id.index()]
    }

    /// The angles last sent to each joint.
    pub fn commanded(&self) -> ArmDems {
        let mut dems = ArmDems::default();
        for joint in self.joints.iter() {
            dems.set(joint.id(), joint.read());
        }
        dems
    }

    /// Current `(min, max)` limits of a joint.
    pub fn limits_deg(&self, id: JointId) -> (i32, i32) {
        let joint = self.joint(id);
        (joint.min_deg(), joint.max_deg())
    }

    /// Human readable description of a joint.
    pub fn info(&self, id: JointId) -> String {
        self.joint(id).to_string()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn report(&self) -> StatusReport {
        self.report
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Floor, clamp and write one joint.
    fn command(&mut self, id: JointId, angle_deg: i32) -> Result<(), ArmCtrlError> {
        let coupling = self.params.coupling;

        let (angle_deg, floor_limited) = match id {
            JointId::Height => apply_floor(
                angle_deg,
                coupling.height_floor_deg(self.joint(JointId::Reach).read()),
            ),
            JointId::Reach => apply_floor(
                angle_deg,
                coupling.reach_floor_deg(self.joint(JointId::Height).read()),
            ),
            _ => (angle_deg, false),
        };

        let joint = &mut self.joints[id.index()];

        self.report.floor_limited[id.index()] = floor_limited;
        self.report.abs_pos_limited[id.index()] = joint.clamp_to_limits(angle_deg) != angle_deg;

        let issued = joint
            .write(&mut self.driver, angle_deg)
            .map_err(|source| ArmCtrlError::Transport { joint: id, source })?;

        if issued {
            self.report.writes_issued += 1;
        }

        Ok(())
    }
}

impl<D: ServoDriver> fmt::Display for ArmCtrl<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arm {{ ")?;
        for (i, joint) in self.joints.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", joint)?;
        }
        write!(f, " }}")
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::servo_ctrl::{ServoError, SimDriver, SimEvent};

    fn arm() -> ArmCtrl<SimDriver> {
        ArmCtrl::new(Params::default(), SimDriver::new()).unwrap()
    }

    /// The pose the default parameters attach to.
    fn rest() -> ArmDems {
        ArmDems::new(60, 110, 120, 135)
    }

    #[test]
    fn test_new_attaches_in_order() {
        let arm = arm();

        assert_eq!(arm.commanded(), rest());
        assert_eq!(
            arm.driver().events(),
            &[
                SimEvent::Set { channel: 8, angle_deg: 60 },
                SimEvent::Set { channel: 9, angle_deg: 110 },
                SimEvent::Set { channel: 10, angle_deg: 120 },
                SimEvent::Set { channel: 11, angle_deg: 135 },
            ]
        );
        assert_eq!(arm.limits_deg(JointId::Base), (10, 170));
        assert_eq!(arm.limits_deg(JointId::Claw), (100, 170));
    }

    #[test]
    fn test_apply_rest_pose_is_silent() {
        let mut arm = arm();

        let report = arm.apply(&rest()).unwrap();

        assert_eq!(report.writes_issued, 0);
        assert_eq!(arm.driver().num_sets(), 4);
        assert_eq!(arm.commanded(), rest());
    }

    #[test]
    fn test_height_floor_from_reach() {
        let mut arm = arm();

        arm.single(JointId::Reach, 100).unwrap();
        assert_eq!(arm.joint(JointId::Reach).read(), 100);

        let report = arm.single(JointId::Height, 50).unwrap();

        assert_eq!(arm.joint(JointId::Height).read(), 90);
        assert!(report.floor_limited[JointId::Height.index()]);
        assert_eq!(arm.driver().last_angle(10), Some(90));
    }

    #[test]
    fn test_reach_floor_from_height() {
        let mut arm = arm();

        arm.single(JointId::Height, 150).unwrap();
        assert_eq!(arm.joint(JointId::Height).read(), 150);

        // Floor is 20, below the joint's own minimum of 60
        let report = arm.single(JointId::Reach, 40).unwrap();

        assert_eq!(arm.joint(JointId::Reach).read(), 60);
        assert!(!report.floor_limited[JointId::Reach.index()]);
        assert!(report.abs_pos_limited[JointId::Reach.index()]);
    }

    #[test]
    fn test_fractional_floor_rounds_up() {
        let mut arm = arm();

        // Reach is at 110, so the height floor is 82.5
        arm.single(JointId::Height, 75).unwrap();
        assert_eq!(arm.joint(JointId::Height).read(), 83);
    }

    #[test]
    fn test_batch_order_dependence() {
        // In a batch reach is written first, its floor comes from the previous height (120)
        let mut batch = arm();
        batch.apply(&ArmDems::new(60, 60, 75, 135)).unwrap();
        assert_eq!(batch.joint(JointId::Reach).read(), 60);
        assert_eq!(batch.joint(JointId::Height).read(), 120);

        // Writing height first gives a different result
        let mut reversed = arm();
        reversed.single(JointId::Height, 75).unwrap();
        reversed.single(JointId::Reach, 60).unwrap();
        assert_eq!(reversed.joint(JointId::Height).read(), 83);
        assert_eq!(reversed.joint(JointId::Reach).read(), 110);
    }

    #[test]
    fn test_coupling_holds_after_every_batch() {
        let mut arm = arm();
        let coupling = arm.params().coupling;

        for reach in (0..=180).step_by(15) {
            for height in (0..=180).step_by(15) {
                arm.apply(&ArmDems::new(90, reach, height, 120)).unwrap();

                let c = arm.commanded();
                assert!(c.height_deg as f64 >= coupling.height_floor_deg(c.reach_deg));
                assert!(c.reach_deg as f64 >= coupling.reach_floor_deg(c.height_deg));
                for &id in JointId::ALL.iter() {
                    let (min, max) = arm.limits_deg(id);
                    assert!(c.get(id) >= min && c.get(id) <= max);
                }
            }
        }
    }

    #[test]
    fn test_single_by_name() {
        let mut arm = arm();

        arm.single_by_name("height", 75).unwrap();
        assert_eq!(arm.joint(JointId::Height).read(), 83);

        arm.single_by_name("CLAW", 150).unwrap();
        assert_eq!(arm.joint(JointId::Claw).read(), 150);
    }

    #[test]
    fn test_unknown_name_is_noop() {
        let mut arm = arm();
        let before = arm.commanded();
        let num_events = arm.driver().events().len();

        let report = arm.single_by_name("Wrist", 90).unwrap();

        assert_eq!(report, StatusReport::default());
        assert_eq!(arm.commanded(), before);
        assert_eq!(arm.driver().events().len(), num_events);
    }

    #[test]
    fn test_initialize_returns_to_rest() {
        let mut arm = arm();

        arm.apply(&ArmDems::new(150, 150, 100, 100)).unwrap();
        assert_ne!(arm.commanded(), rest());

        let report = arm.initialize().unwrap();
        assert_eq!(arm.commanded(), rest());
        assert_eq!(report.writes_issued, 4);

        // Already at rest, nothing more to send
        assert_eq!(arm.initialize().unwrap().writes_issued, 0);
    }

    #[test]
    fn test_transport_failure() {
        let mut arm = arm();
        arm.driver_mut().disconnect();

        // Unchanged demands never reach the transport
        assert!(arm.apply(&rest()).is_ok());

        let r = arm.apply(&ArmDems::new(60, 150, 120, 135));
        match r {
            Err(ArmCtrlError::Transport { joint, source }) => {
                assert_eq!(joint, JointId::Reach);
                assert!(matches!(source, ServoError::Disconnected));
            }
            _ => panic!("Expected a transport error"),
        }
        assert_eq!(arm.commanded(), rest());
    }

    #[test]
    fn test_close_detaches_all() {
        let arm = arm();
        let drv = arm.close();

        assert_eq!(
            &drv.events()[4..],
            &[
                SimEvent::Detach { channel: 8 },
                SimEvent::Detach { channel: 9 },
                SimEvent::Detach { channel: 10 },
                SimEvent::Detach { channel: 11 },
            ]
        );
    }

    #[test]
    fn test_close_ignores_transport_errors() {
        let mut arm = arm();
        arm.driver_mut().disconnect();

        let drv = arm.close();
        assert_eq!(drv.events().len(), 4);
    }

    #[test]
    fn test_inverted_limits_in_params() {
        let mut params = Params::default();
        params.claw.limits_deg = [170, 100];
        params.base.limits_deg = [-20, 250];

        let arm = ArmCtrl::new(params, SimDriver::new()).unwrap();
        assert_eq!(arm.limits_deg(JointId::Claw), (100, 170));
        assert_eq!(arm.limits_deg(JointId::Base), (0, 180));
    }

    #[test]
    fn test_info() {
        let arm = arm();
        assert_eq!(
            arm.info(JointId::Reach),
            "Reach { ch: 9 ; angle: 110 ; limits: [60, 160] ; attached }"
        );
    }
}
