//! Internal utilities.

use std::path::Path;

/// Checks whether the process runs with an effective uid of root.
#[cfg(unix)]
#[must_use]
pub fn is_root() -> bool {
    // SAFETY: `geteuid` has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// Checks whether the process may rewrite `hosts_path`.
///
/// On Unix the system hosts file needs an effective uid of root. Any other
/// path, and every path on other platforms, is probed by opening it for
/// appending (which neither truncates nor creates it).
#[must_use]
pub fn can_edit(hosts_path: &Path) -> bool {
    #[cfg(unix)]
    {
        if hosts_path == crate::platform::Platform::current().default_hosts_path() {
            return is_root();
        }
    }

    std::fs::OpenOptions::new()
        .append(true)
        .open(hosts_path)
        .is_ok()
}
