//! VT mode resolution.
//!
//! Maps the host's requested mode text to a wire protocol variant. The
//! recognized literals follow common TERM naming; matching is exact and
//! case-sensitive.

use std::str::FromStr;

use crate::error::VtIoError;

/// Mode literal for the full-fidelity color variant.
pub const XTERM_256_MODE: &str = "xterm-256color";
/// Mode literal for the indexed 16-color variant.
pub const XTERM_MODE: &str = "xterm";
/// Mode literal for the Telnet-negotiated variant.
pub const TELNET_MODE: &str = "telnet";
/// Explicit request for whatever the default variant is.
pub const DEFAULT_MODE: &str = "default";

/// Wire protocol variant spoken with the terminal peer.
///
/// `Unresolved` is the initial sentinel; a successful parse never produces
/// it, so a caller holding any other variant knows resolution happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VtMode {
    #[default]
    Unresolved,
    /// Full-fidelity color VT output.
    Xterm256,
    /// Indexed 16-color VT output.
    Xterm,
    /// Telnet-negotiated VT output.
    Telnet,
}

impl FromStr for VtMode {
    type Err = VtIoError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            XTERM_256_MODE | DEFAULT_MODE => Ok(VtMode::Xterm256),
            XTERM_MODE => Ok(VtMode::Xterm),
            TELNET_MODE => Ok(VtMode::Telnet),
            _ => Err(VtIoError::InvalidArgument(text.to_string())),
        }
    }
}
