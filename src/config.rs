//! Blocking session configuration.

use crate::platform::Platform;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Default redirect target for blocked names.
pub const DEFAULT_REDIRECT: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Configuration for a blocking session.
///
/// # Example
///
/// ```
/// use hosts_blocker::BlockerConfig;
///
/// let config = BlockerConfig::new()
///     .with_hosts_path("/tmp/hosts")
///     .with_www(false);
///
/// assert_eq!(config.hosts_path.to_str(), Some("/tmp/hosts"));
/// assert_eq!(config.redirect.to_string(), "127.0.0.1");
/// assert!(!config.block_www);
/// ```
#[derive(Debug, Clone)]
pub struct BlockerConfig {
    /// Hosts file to edit.
    pub hosts_path: PathBuf,

    /// Address every redirect entry points at.
    pub redirect: IpAddr,

    /// Also redirect `www.<domain>` for each domain.
    pub block_www: bool,

    /// Flush the DNS cache again after the hosts file is restored.
    pub flush_on_restore: bool,
}

impl BlockerConfig {
    /// Creates a config using the current platform's hosts file,
    /// redirecting to `127.0.0.1`.
    #[must_use]
    pub fn new() -> Self {
        Self::for_platform(&Platform::current())
    }

    /// Creates a config using `platform`'s default hosts file.
    #[must_use]
    pub fn for_platform(platform: &Platform) -> Self {
        Self {
            hosts_path: platform.default_hosts_path(),
            redirect: DEFAULT_REDIRECT,
            block_www: true,
            flush_on_restore: true,
        }
    }

    /// Overrides the hosts file path.
    #[must_use]
    pub fn with_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.hosts_path = path.into();
        self
    }

    /// Overrides the redirect address.
    #[must_use]
    pub const fn with_redirect(mut self, redirect: IpAddr) -> Self {
        self.redirect = redirect;
        self
    }

    /// Enables or disables the `www.` entry.
    #[must_use]
    pub const fn with_www(mut self, enabled: bool) -> Self {
        self.block_www = enabled;
        self
    }

    /// Enables or disables the flush after restore.
    #[must_use]
    pub const fn with_flush_on_restore(mut self, enabled: bool) -> Self {
        self.flush_on_restore = enabled;
        self
    }
}

impl Default for BlockerConfig {
    fn default() -> Self {
        Self::new()
    }
}
