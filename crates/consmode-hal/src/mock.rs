//! Test doubles for the privileged writer
//!
//! Real writes go through an elevation prompt, which tests must never
//! trigger. [`RecordingWriter`] captures the tokens a caller would have
//! written and returns a scripted outcome; [`DirectWriter`] writes the
//! token to an arbitrary (unprivileged) path so write-then-read behavior
//! can be exercised against a temp file.

use crate::writer::{PrivilegedWriter, WriteError};
use crate::ConservationState;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Records written tokens and returns a scripted result.
#[derive(Debug, Clone)]
pub struct RecordingWriter {
    written: Arc<Mutex<Vec<String>>>,
    fail_code: Option<i32>,
}

impl RecordingWriter {
    /// A writer whose writes all succeed.
    pub fn succeeding() -> Self {
        Self {
            written: Arc::new(Mutex::new(Vec::new())),
            fail_code: None,
        }
    }

    /// A writer whose writes all fail as if the helper exited with `code`.
    pub fn failing(code: i32) -> Self {
        Self {
            written: Arc::new(Mutex::new(Vec::new())),
            fail_code: Some(code),
        }
    }

    /// Tokens written so far, in order.
    pub fn written(&self) -> Vec<String> {
        self.written.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl PrivilegedWriter for RecordingWriter {
    fn write_flag(&self, enable: bool) -> Result<(), WriteError> {
        if let Ok(mut written) = self.written.lock() {
            written.push(ConservationState::token(enable).to_string());
        }

        match self.fail_code {
            None => Ok(()),
            Some(code) => Err(WriteError::HelperFailed { code }),
        }
    }
}

/// Writes the token straight to a path without elevation. Intended for
/// tempdir-backed integration tests.
#[derive(Debug, Clone)]
pub struct DirectWriter {
    control_path: PathBuf,
}

impl DirectWriter {
    pub fn new(control_path: impl Into<PathBuf>) -> Self {
        Self {
            control_path: control_path.into(),
        }
    }
}

impl PrivilegedWriter for DirectWriter {
    fn write_flag(&self, enable: bool) -> Result<(), WriteError> {
        let mut contents = ConservationState::token(enable).to_string();
        contents.push('\n');
        fs::write(&self.control_path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_writer_captures_tokens() {
        let writer = RecordingWriter::succeeding();

        writer.write_flag(true).unwrap();
        writer.write_flag(false).unwrap();

        assert_eq!(writer.written(), vec!["1", "0"]);
    }

    #[test]
    fn test_recording_writer_scripted_failure() {
        let writer = RecordingWriter::failing(126);

        let err = writer.write_flag(true).err().unwrap();
        assert!(matches!(err, WriteError::HelperFailed { code: 126 }));

        // The attempt is still recorded.
        assert_eq!(writer.written(), vec!["1"]);
    }

    #[test]
    fn test_direct_writer_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conservation_mode");
        let writer = DirectWriter::new(&path);

        writer.write_flag(true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1\n");
    }
}
