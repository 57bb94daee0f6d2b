//! Elevated writes to the control path
//!
//! The control path is root-owned, and in desktop sessions the ability to
//! write protected files does not always follow from the process's own
//! identity. Writes therefore go through an elevation helper subprocess
//! running `tee` on the control path, with the token piped to its stdin.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::ConservationState;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("no elevation helper found on PATH (tried pkexec, sudo)")]
    HelperNotFound,

    #[error("failed to spawn elevation helper {helper}: {source}")]
    Spawn {
        helper: String,
        source: std::io::Error,
    },

    #[error("elevation helper exited with status {code}")]
    HelperFailed { code: i32 },

    #[error("elevation helper terminated by a signal")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability to write the conservation flag. The production implementation
/// escalates through a helper subprocess; tests substitute doubles from
/// [`crate::mock`].
pub trait PrivilegedWriter: Send + Sync {
    fn write_flag(&self, enable: bool) -> Result<(), WriteError>;
}

/// Helpers tried in order when none is configured.
const DEFAULT_HELPERS: &[&str] = &["pkexec", "sudo"];

/// Writes the flag by spawning `<helper> tee <control path>` and piping the
/// token to it.
#[derive(Debug, Clone)]
pub struct HelperWriter {
    helper: PathBuf,
    control_path: PathBuf,
}

impl HelperWriter {
    /// Resolve the elevation helper and build a writer. An explicit
    /// `helper_override` names the helper to use; otherwise `pkexec` is
    /// preferred, then `sudo`.
    pub fn new(
        control_path: impl Into<PathBuf>,
        helper_override: Option<&str>,
    ) -> Result<Self, WriteError> {
        let helper = match helper_override {
            Some(name) => which::which(name).map_err(|_| WriteError::HelperNotFound)?,
            None => DEFAULT_HELPERS
                .iter()
                .find_map(|name| which::which(name).ok())
                .ok_or(WriteError::HelperNotFound)?,
        };

        tracing::info!("Using elevation helper {}", helper.display());

        Ok(Self {
            helper,
            control_path: control_path.into(),
        })
    }

    /// Build a writer around a specific helper binary, skipping PATH
    /// resolution. Useful for tests and unusual setups.
    pub fn with_helper(helper: impl Into<PathBuf>, control_path: impl Into<PathBuf>) -> Self {
        Self {
            helper: helper.into(),
            control_path: control_path.into(),
        }
    }

    pub fn helper(&self) -> &Path {
        &self.helper
    }
}

impl PrivilegedWriter for HelperWriter {
    fn write_flag(&self, enable: bool) -> Result<(), WriteError> {
        let token = ConservationState::token(enable);

        tracing::debug!(
            "writing {} to {} via {}",
            token,
            self.control_path.display(),
            self.helper.display()
        );

        let mut child = Command::new(&self.helper)
            .arg("tee")
            .arg(&self.control_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| WriteError::Spawn {
                helper: self.helper.display().to_string(),
                source: e,
            })?;

        // Write the token and drop the handle so the helper sees EOF.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("helper stdin not captured"))?;
        stdin.write_all(token.as_bytes())?;
        stdin.write_all(b"\n")?;
        drop(stdin);

        // The helper may sit on an interactive elevation prompt; no timeout
        // is imposed, a cancelled prompt shows up as a non-zero exit.
        let status = child.wait()?;

        if status.success() {
            Ok(())
        } else {
            match status.code() {
                Some(code) => Err(WriteError::HelperFailed { code }),
                None => Err(WriteError::Interrupted),
            }
        }
    }
}
