//! Perception sources
//!
//! The hand tracking pipeline runs outside this software. These sources deliver its output to
//! the control loop one frame at a time.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod json_lines;
mod script;
mod threaded;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use json_lines::JsonLinesSource;
pub use script::ScriptedSource;
pub use threaded::ThreadedSource;

use std::time::Duration;

use comms_if::eqpt::perception::TargetSample;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Longest a source blocks before checking whether it has been stopped.
pub const STOP_POLL_PERIOD: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A producer of perception frames.
pub trait TargetSource {
    /// Block until the next frame is available.
    fn next_frame(&mut self) -> Result<PerceptionFrame, PerceptionError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One frame from the perception pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerceptionFrame {
    /// A target was tracked.
    Target(TargetSample),

    /// No target in this frame.
    Lost,

    /// The source has no more frames.
    EndOfStream,

    /// The source was stopped while waiting for a frame.
    Stopped,
}

/// Errors raised by perception sources.
#[derive(Debug, thiserror::Error)]
pub enum PerceptionError {
    #[error("Could not read from the perception source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid perception sample {line:?}: {source}")]
    InvalidSample {
        line: String,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl From<Option<TargetSample>> for PerceptionFrame {
    fn from(sample: Option<TargetSample>) -> Self {
        match sample {
            Some(s) => PerceptionFrame::Target(s),
            None => PerceptionFrame::Lost,
        }
    }
}

impl<S: TargetSource + ?Sized> TargetSource for Box<S> {
    fn next_frame(&mut self) -> Result<PerceptionFrame, PerceptionError> {
        (**self).next_frame()
    }
}
