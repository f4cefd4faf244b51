//! Perception source running another source on a background thread

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;

use log::debug;

use super::{PerceptionError, PerceptionFrame, TargetSource, STOP_POLL_PERIOD};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Reads frames from a blocking source on a worker thread so that the owner can give up waiting
/// once `running` is cleared.
///
/// A source stuck in a read (a stalled tracker on stdin) is left behind on its thread when
/// stopped.
pub struct ThreadedSource {
    rx: Receiver<Result<PerceptionFrame, PerceptionError>>,

    running: Arc<AtomicBool>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ThreadedSource {
    /// Move `source` onto a new worker thread.
    pub fn spawn<S>(mut source: S, running: Arc<AtomicBool>) -> Self
    where
        S: TargetSource + Send + 'static,
    {
        // Only one frame in flight, the worker blocks until it's taken
        let (tx, rx) = mpsc::sync_channel(1);

        thread::spawn(move || loop {
            let frame = source.next_frame();

            let last = matches!(
                frame,
                Ok(PerceptionFrame::EndOfStream)
                    | Ok(PerceptionFrame::Stopped)
                    | Err(PerceptionError::Io(_))
            );

            if tx.send(frame).is_err() || last {
                debug!("Perception worker exiting");
                break;
            }
        });

        Self { rx, running }
    }
}

impl TargetSource for ThreadedSource {
    fn next_frame(&mut self) -> Result<PerceptionFrame, PerceptionError> {
        loop {
            if !self.running.load(Ordering::SeqCst) {
                return Ok(PerceptionFrame::Stopped);
            }

            match self.rx.recv_timeout(STOP_POLL_PERIOD) {
                Ok(frame) => return frame,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(PerceptionFrame::EndOfStream),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::perception::JsonLinesSource;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    /// A source whose read never completes.
    struct Stalled;

    impl TargetSource for Stalled {
        fn next_frame(&mut self) -> Result<PerceptionFrame, PerceptionError> {
            thread::sleep(Duration::from_secs(3600));
            Ok(PerceptionFrame::Lost)
        }
    }

    #[test]
    fn test_forwards_frames() {
        let input = "{\"x\": 0.5, \"y\": 0.5, \"depth\": 75.0, \"raised_fingers\": 2}\nnull\n";
        let running = Arc::new(AtomicBool::new(true));
        let mut src = ThreadedSource::spawn(JsonLinesSource::new(Cursor::new(input)), running);

        assert!(matches!(src.next_frame().unwrap(), PerceptionFrame::Target(s) if s.raised_fingers == 2));
        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::Lost);
        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::EndOfStream);

        // Worker has gone, the stream stays ended
        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::EndOfStream);
    }

    #[test]
    fn test_stop_while_source_stalled() {
        let running = Arc::new(AtomicBool::new(true));
        let mut src = ThreadedSource::spawn(Stalled, running.clone());

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
}
