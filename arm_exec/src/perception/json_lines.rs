//! Perception source reading one JSON sample per line

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::io::BufRead;

use comms_if::eqpt::perception::TargetSample;

use super::{PerceptionError, PerceptionFrame, TargetSource};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Reads frames from a stream of JSON lines, such as a tracker piped into stdin.
///
/// Each line is either a [`TargetSample`] object or `null` when no target is tracked. Blank
/// lines are skipped.
pub struct JsonLinesSource<R> {
    reader: R,

    line: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl<R: BufRead> TargetSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<PerceptionFrame, PerceptionError> {
        loop {
            self.line.clear();

            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(PerceptionFrame::EndOfStream);
            }

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            let sample: Option<TargetSample> =
                serde_json::from_str(line).map_err(|source| PerceptionError::InvalidSample {
                    line: line.to_string(),
                    source,
                })?;

            return Ok(sample.into());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_frames() {
        let input = "{\"x\": 0.5, \"y\": 0.4, \"depth\": 80.0, \"raised_fingers\": 1}\n\
                     \n\
                     null\n\
                     {\"x\": 0.1, \"y\": 0.9, \"depth\": 40.0, \"raised_fingers\": 5}";
        let mut src = JsonLinesSource::new(Cursor::new(input));

        assert_eq!(
            src.next_frame().unwrap(),
            PerceptionFrame::Target(TargetSample {
                x: 0.5,
                y: 0.4,
                depth: 80.0,
                raised_fingers: 1
            })
        );
        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::Lost);
        assert!(matches!(src.next_frame().unwrap(), PerceptionFrame::Target(_)));
        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::EndOfStream);
    }

    #[test]
    fn test_invalid_line_then_continue() {
        let mut src = JsonLinesSource::new(Cursor::new("not json\nnull\n"));

        assert!(matches!(
            src.next_frame(),
            Err(PerceptionError::InvalidSample { .. })
        ));
        assert_eq!(src.next_frame().unwrap(), PerceptionFrame::Lost);
    }
}
