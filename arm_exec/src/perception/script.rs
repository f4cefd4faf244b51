//! Perception source replaying a timed script

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use comms_if::eqpt::perception::TargetSample;
use log::info;
use util::script_interpreter::{ScriptError, ScriptInterpreter};

use super::{PerceptionError, PerceptionFrame, TargetSource, STOP_POLL_PERIOD};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Replays recorded perception frames at the times given in the script.
///
/// Script entries are `<time_s>: <sample or null>;`. Time is measured from the first call to
/// `next_frame`.
pub struct ScriptedSource {
    interp: ScriptInterpreter<Option<TargetSample>>,

    start: Option<Instant>,

    /// Cleared by the owner to abandon a wait.
    running: Option<Arc<AtomicBool>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptedSource {
    /// Load a script from a file.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let interp = ScriptInterpreter::new(path)?;

        info!(
            "Loaded perception script with {} frames over {:.2} s",
            interp.get_num_cmds(),
            interp.get_duration()
        );

        Ok(Self::from_interpreter(interp))
    }

    pub fn from_interpreter(interp: ScriptInterpreter<Option<TargetSample>>) -> Self {
        Self {
            interp,
            start: None,
            running: None,
        }
    }

    /// Abandon waits once `running` is cleared, `next_frame` then returns
    /// [`PerceptionFrame::Stopped`].
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }

    fn is_stopped(&self) -> bool {
        self.running
            .as_ref()
            .map_or(false, |r| !r.load(Ordering::SeqCst))
    }

    pub fn num_remaining(&self) -> usize {
        self.interp.get_num_cmds()
    }
}

impl TargetSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<PerceptionFrame, PerceptionError> {
        let start = *self.start.get_or_insert_with(Instant::now);

        let cmd = match self.interp.pop_next() {
            Some(c) => c,
            None => return Ok(PerceptionFrame::EndOfStream),
        };

        // Block until the frame is due, a frame abandoned by a stop is dropped
        let due = Duration::try_from_secs_f64(cmd.exec_time_s).unwrap_or(Duration::MAX);
        loop {
            if self.is_stopped() {
                return Ok(PerceptionFrame::Stopped);
            }

            let elapsed = start.elapsed();
            if elapsed >= due {
                break;
            }
            thread::sleep((due - elapsed).min(STOP_POLL_PERIOD));
        }

        Ok(cmd.payload.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_replay() {
        let script = "\
            0.0: {\"x\": 0.5, \"y\": 0.5, \"depth\": 75.0, \"raised_fingers\": 2};\n\
            0.0: null;\n\
            0.01: {\"x\": 0.2, \"y\": 0.3, \"depth\": 50.0, \"raised_fingers\": 0};\n";
        let mut src = ScriptedSource::from_interpreter(ScriptInterpreter::parse(script).unwrap());

        assert_eq!(src.num_remaining(), 3);
        assert!(matches!(src.next_frame().unwrap(), PerceptionFrame::Target(s) if s.raised_fingers == 2));
        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::Lost);

        let before = Instant::now();
        assert!(matches!(src.next_frame().unwrap(), PerceptionFrame::Target(s) if s.depth == 50.0));
        assert!(before.elapsed() <= Duration::from_secs(1));

        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::EndOfStream);
    }

    #[test]
    fn test_stop_during_long_wait() {
        let running = Arc::new(AtomicBool::new(true));
        let mut src = ScriptedSource::from_interpreter(
            ScriptInterpreter::parse("0.0: null;\n3600.0: null;\n").unwrap(),
        )
        .with_running_flag(running.clone());

        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::Lost);

        let stopper = {
            let running = running.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                running.store(false, Ordering::SeqCst);
            })
        };

        let before = Instant::now();
        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::Stopped);
        assert!(before.elapsed() < Duration::from_secs(5));

        stopper.join().unwrap();
    }

    #[test]
    fn test_stopped_before_wait() {
        let running = Arc::new(AtomicBool::new(false));
        let mut src = ScriptedSource::from_interpreter(
            ScriptInterpreter::parse("10.0: null;\n").unwrap(),
        )
        .with_running_flag(running);

        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::Stopped);
    }

    #[test]
    fn test_example_script() {
        let interp: ScriptInterpreter<Option<TargetSample>> =
            ScriptInterpreter::parse(include_str!("../../../scripts/wave.txt")).unwrap();
        assert!(interp.get_num_cmds() > 0);
    }
}
