//! Conservation state reads
//!
//! The store is the only component that derives displayed state, and it is
//! deliberately infallible: a failed read degrades to `Unknown` so the
//! surface keeps running and the next read can recover.

use crate::ConservationState;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads the conservation flag from the control path.
#[derive(Debug, Clone)]
pub struct StateStore {
    control_path: PathBuf,
}

impl StateStore {
    pub fn new(control_path: impl Into<PathBuf>) -> Self {
        Self {
            control_path: control_path.into(),
        }
    }

    /// Read the current flag state. Never fails; I/O problems map to
    /// `Unknown` and are logged.
    pub fn read(&self) -> ConservationState {
        match fs::read_to_string(&self.control_path) {
            Ok(contents) => {
                let token = contents.lines().next().unwrap_or("");
                ConservationState::from_token(token)
            }
            Err(e) => {
                tracing::warn!(
                    "failed to read {}: {}",
                    self.control_path.display(),
                    e
                );
                ConservationState::Unknown
            }
        }
    }

    pub fn control_path(&self) -> &Path {
        &self.control_path
    }
}
