//! Conservation-mode hardware access
//!
//! This crate wraps the Lenovo IdeaPad ACPI driver's battery conservation
//! flag, exposed as a root-owned sysfs attribute, behind a small API the
//! rest of the system uses: check privileges, probe for the attribute,
//! read the current flag, and flip it through an elevation helper.
//!
//! # Example
//!
//! ```no_run
//! use consmode_hal::{probe, privilege, StateStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     if !privilege::has_elevated_rights() {
//!         anyhow::bail!("not running as root");
//!     }
//!     let path = probe::resolve_control_path();
//!     let store = StateStore::new(path);
//!     println!("conservation mode: {}", store.read());
//!     Ok(())
//! }
//! ```

pub mod flag;
pub mod mock;
pub mod privilege;
pub mod probe;
pub mod store;
pub mod writer;

pub use flag::ConservationState;
pub use store::StateStore;
pub use writer::{HelperWriter, PrivilegedWriter, WriteError};

use std::path::PathBuf;
use thiserror::Error;

/// Fatal startup failures. Both terminate the process with exit code 1,
/// but carry distinct messages so the operator can tell a permissions
/// problem from a machine that lacks the driver attribute entirely.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("elevated privileges are required to control conservation mode; re-run via sudo or pkexec")]
    NotPrivileged,

    #[error("conservation mode attribute not found at {0}; this device does not expose the ideapad_acpi conservation flag")]
    UnsupportedDevice(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HAL Result type
pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_have_distinct_messages() {
        let privilege = format!("{}", ControlError::NotPrivileged);
        let device = format!(
            "{}",
            ControlError::UnsupportedDevice(PathBuf::from("/sys/missing"))
        );

        assert_ne!(privilege, device);
        assert!(privilege.contains("privileges"));
        assert!(device.contains("/sys/missing"));
    }
}
