//! Privilege checks
//!
//! Writing the control path requires the superuser identity. The native
//! check queries the effective uid directly; the helper-based check shells
//! out to `id -u` and fails closed on any problem determining the answer.

use std::process::Command;

/// Check whether the current process runs with the superuser identity.
pub fn has_elevated_rights() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Fallback check through the `id` utility. Returns `true` only when the
/// helper runs, exits zero, and its first stdout line parses to uid 0;
/// anything else (helper missing, bad exit, garbage output) is treated as
/// not privileged.
pub fn id_helper_reports_root(helper: &str) -> bool {
    let output = match Command::new(helper).arg("-u").output() {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("identity helper {} unavailable: {}", helper, e);
            return false;
        }
    };

    if !output.status.success() {
        tracing::warn!("identity helper {} exited with {}", helper, output.status);
        return false;
    }

    parse_uid_output(&output.stdout) == Some(0)
}

/// Parse the first line of `id -u` output into a uid.
fn parse_uid_output(stdout: &[u8]) -> Option<u32> {
    std::str::from_utf8(stdout)
        .ok()?
        .lines()
        .next()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_uid() {
        assert_eq!(parse_uid_output(b"0\n"), Some(0));
        assert_eq!(parse_uid_output(b"0"), Some(0));
    }

    #[test]
    fn test_parse_non_root_uid() {
        assert_eq!(parse_uid_output(b"1000\n"), Some(1000));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert_eq!(parse_uid_output(b"not-a-uid\n"), None);
        assert_eq!(parse_uid_output(b""), None);
        assert_eq!(parse_uid_output(&[0xff, 0xfe]), None);
    }

    #[test]
    fn test_missing_helper_fails_closed() {
        assert!(!id_helper_reports_root("/nonexistent/id-helper"));
    }

    #[test]
    fn test_native_check_does_not_panic() {
        // Actual value depends on the test runner's identity.
        let _ = has_elevated_rights();
    }
}
