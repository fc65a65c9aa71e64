//! Error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for blocker operations.
pub type Result<T> = std::result::Result<T, BlockerError>;

/// Errors returned by blocker operations.
#[derive(Debug, Error)]
pub enum BlockerError {
    /// Filesystem I/O failed (typically `PermissionDenied` on the hosts file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The process lacks the privileges to edit the hosts file and
    /// elevation was not attempted.
    #[error("permission denied: root privileges are required to edit {}", path.display())]
    PermissionDenied {
        /// The hosts file that could not be edited.
        path: PathBuf,
    },

    /// Re-invoking the program through `sudo` failed.
    #[error("failed to elevate privileges: {0}")]
    Elevation(String),

    /// This OS has no elevation mechanism the blocker can drive.
    #[error("cannot elevate privileges on {os}; run this program as Administrator")]
    ElevationUnavailable {
        /// The OS name as reported by the target.
        os: String,
    },

    /// No DNS cache flush command is known for this OS.
    #[error("unsupported platform: {os}")]
    UnsupportedPlatform {
        /// The OS name as reported by the target.
        os: String,
    },

    /// A DNS cache flush command could not be run or exited non-zero.
    #[error("`{command}` failed: {detail}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Exit status or spawn error, plus captured output.
        detail: String,
    },

    /// Reading a domain from the terminal failed.
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// The interrupt handler could not be installed.
    #[error("failed to wait for interrupt signal: {0}")]
    Signal(#[source] std::io::Error),
}

impl BlockerError {
    /// Returns `true` if the failure comes down to missing permissions.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied { .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}
