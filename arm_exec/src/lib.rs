//! # Arm library.
//!
//! Servo coordination for a four joint (base, reach, height, claw) hobby arm driven from a hand
//! tracking pipeline. Exposed as a library so the executables and tests can share it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control - owns the joints and enforces the reach/height coupling
pub mod arm_ctrl;

/// Manual control console command parsing
pub mod console;

/// Parameters for the executables
pub mod params;

/// Perception sources - deliver tracked target samples to the control loop
pub mod perception;

/// Servo control - single joints and the transports that drive them
pub mod servo_ctrl;

/// Target mapping - converts perception samples into joint demands
pub mod target_map;
