//! [`ServoDriver`] implementation which records commands in memory
//!
//! Used when running without hardware (`--sim`) and as the transport in tests.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use log::debug;

use super::{ServoDriver, ServoError, MAX_ANGLE_DEG};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Most events kept in the history. Once exceeded the oldest half is dropped.
pub const MAX_EVENT_HISTORY: usize = 1024;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated servo transport.
#[derive(Debug, Default)]
pub struct SimDriver {
    /// Recent events, oldest first. Bounded by [`MAX_EVENT_HISTORY`].
    events: Vec<SimEvent>,

    /// Last angle set on each channel, kept for the whole run.
    last_angles: HashMap<u8, u8>,

    /// Total angle commands received.
    num_sets: usize,

    disconnected: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command received by the [`SimDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Set { channel: u8, angle_deg: u8 },
    Detach { channel: u8 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent commands received, oldest first.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Number of angle commands received since creation.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Last angle commanded on `channel`, if any.
    pub fn last_angle(&self, channel: u8) -> Option<u8> {
        self.last_angles.get(&channel).copied()
    }

    fn record(&mut self, event: SimEvent) {
        if self.events.len() >= MAX_EVENT_HISTORY {
            self.events.drain(..MAX_EVENT_HISTORY / 2);
        }
        self.events.push(event);
    }

    /// Make every following command fail as if the link had dropped.
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    pub fn reconnect(&mut self) {
        self.disconnected = false;
    }
}

impl ServoDriver for SimDriver {
    fn set_angle(&mut self, channel: u8, angle_deg: u8) -> Result<(), ServoError> {
        if self.disconnected {
            return Err(ServoError::Disconnected);
        }
        if angle_deg > MAX_ANGLE_DEG {
            return Err(ServoError::InvalidAngle(angle_deg));
        }

        debug!("SIM set ch {} to {} deg", channel, angle_deg);
        self.record(SimEvent::Set { channel, angle_deg });
        self.last_angles.insert(channel, angle_deg);
        self.num_sets += 1;

        Ok(())
    }

    fn detach(&mut self, channel: u8) -> Result<(), ServoError> {
        if self.disconnected {
            return Err(ServoError::Disconnected);
        }

        debug!("SIM detach ch {}", channel);
        self.record(SimEvent::Detach { channel });

        Ok(())
    }
}
