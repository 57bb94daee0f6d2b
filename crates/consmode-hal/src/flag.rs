//! Conservation flag model
//!
//! The driver exposes the flag as a single ASCII token, `"0"` or `"1"`.
//! Anything else that still reads successfully counts as disabled; only an
//! I/O failure degrades to `Unknown`.

use std::fmt;

/// Displayed state of the conservation flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConservationState {
    Enabled,
    Disabled,
    /// The control path could not be read; the real state is unknown.
    Unknown,
}

impl ConservationState {
    /// Interpret a token read from the control path. `"1"` means enabled;
    /// any other readable content means disabled.
    pub fn from_token(token: &str) -> Self {
        if token.trim() == "1" {
            ConservationState::Enabled
        } else {
            ConservationState::Disabled
        }
    }

    /// Token written to the control path for a requested state.
    pub fn token(enable: bool) -> &'static str {
        if enable {
            "1"
        } else {
            "0"
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConservationState::Enabled => "Enabled",
            ConservationState::Disabled => "Disabled",
            ConservationState::Unknown => "Unknown",
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ConservationState::Enabled)
    }
}

impl fmt::Display for ConservationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_one_is_enabled() {
        assert_eq!(
            ConservationState::from_token("1"),
            ConservationState::Enabled
        );
        assert_eq!(
            ConservationState::from_token("1\n"),
            ConservationState::Enabled
        );
    }

    #[test]
    fn test_token_zero_is_disabled() {
        assert_eq!(
            ConservationState::from_token("0"),
            ConservationState::Disabled
        );
    }

    #[test]
    fn test_unexpected_token_is_disabled() {
        // Readable-but-malformed content counts as disabled, not unknown.
        assert_eq!(
            ConservationState::from_token("weird"),
            ConservationState::Disabled
        );
        assert_eq!(
            ConservationState::from_token(""),
            ConservationState::Disabled
        );
        assert_eq!(
            ConservationState::from_token("11"),
            ConservationState::Disabled
        );
    }

    #[test]
    fn test_write_tokens() {
        assert_eq!(ConservationState::token(true), "1");
        assert_eq!(ConservationState::token(false), "0");
    }

    #[test]
    fn test_display() {
        assert_eq!(ConservationState::Enabled.to_string(), "Enabled");
        assert_eq!(ConservationState::Unknown.to_string(), "Unknown");
    }
}
