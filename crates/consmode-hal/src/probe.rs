//! Control path probing
//!
//! The conservation flag lives under the ideapad_acpi platform driver. The
//! device instance name (`VPC2004:00`) can vary between machines, so the
//! probe scans the driver directory for the attribute and falls back to the
//! fixed default path.

use std::fs;
use std::path::{Path, PathBuf};

/// Default control path on Lenovo IdeaPad hardware.
pub const CONSERVATION_PATH: &str =
    "/sys/bus/platform/drivers/ideapad_acpi/VPC2004:00/conservation_mode";

/// Directory scanned for device instances exposing the attribute.
const DRIVER_DIR: &str = "/sys/bus/platform/drivers/ideapad_acpi";

/// Check whether a control path exists on this host.
pub fn control_path_exists(path: &Path) -> bool {
    path.exists()
}

/// Scan the ideapad_acpi driver directory for a device instance exposing
/// `conservation_mode`. Returns the first match.
pub fn detect_control_path() -> Option<PathBuf> {
    let driver_dir = Path::new(DRIVER_DIR);
    if !driver_dir.exists() {
        return None;
    }

    for entry in fs::read_dir(driver_dir).ok()?.flatten() {
        let candidate = entry.path().join("conservation_mode");
        if candidate.exists() {
            tracing::info!("Found conservation flag at {}", candidate.display());
            return Some(candidate);
        }
    }

    None
}

/// Resolve the control path for this host: scan result if any, otherwise
/// the fixed default.
pub fn resolve_control_path() -> PathBuf {
    detect_control_path().unwrap_or_else(|| PathBuf::from(CONSERVATION_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_constant() {
        assert!(CONSERVATION_PATH.ends_with("conservation_mode"));
        assert!(CONSERVATION_PATH.starts_with(DRIVER_DIR));
    }

    #[test]
    fn test_existence_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conservation_mode");

        assert!(!control_path_exists(&path));
        fs::write(&path, "1\n").unwrap();
        assert!(control_path_exists(&path));
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        // On machines without the driver the scan finds nothing and the
        // fixed default comes back.
        let resolved = resolve_control_path();
        if detect_control_path().is_none() {
            assert_eq!(resolved, PathBuf::from(CONSERVATION_PATH));
        } else {
            assert!(resolved.ends_with("conservation_mode"));
        }
    }
}
