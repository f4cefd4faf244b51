//! # Communications interface crate.
//!
//! Provides the interface types exchanged between the arm controller and its
//! collaborators (the perception pipeline and the servo transport).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Demand and sample definitions for equipment (the arm and the perception pipeline)
pub mod eqpt;
