//! Hosts file snapshot, append and restore.
//!
//! The file is never edited in place while blocking: entries are appended
//! after the original content, and restoring overwrites the whole file with
//! the bytes captured before the first append.

use crate::config::BlockerConfig;
use crate::error::Result;
use std::fmt;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

/// One `<redirect> <target>` line in the hosts file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectEntry {
    /// Address the target is redirected to.
    pub redirect: IpAddr,
    /// Host name or literal address being redirected.
    pub target: String,
}

impl fmt::Display for RedirectEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.redirect, self.target)
    }
}

/// Builds the entries that block `domain`.
///
/// The bare domain comes first, then `www.<domain>` (if enabled), then one
/// entry per resolved address.
///
/// ```
/// use hosts_blocker::{BlockerConfig, hosts::redirect_entries};
/// use std::net::Ipv4Addr;
///
/// let config = BlockerConfig::new();
/// let ip: Ipv4Addr = "93.184.216.34".parse().unwrap();
/// let lines: Vec<String> = redirect_entries("example.com", &[ip], &config)
///     .iter()
///     .map(ToString::to_string)
///     .collect();
///
/// assert_eq!(lines, [
///     "127.0.0.1 example.com",
///     "127.0.0.1 www.example.com",
///     "127.0.0.1 93.184.216.34",
/// ]);
/// ```
#[must_use]
pub fn redirect_entries(
    domain: &str,
    addrs: &[Ipv4Addr],
    config: &BlockerConfig,
) -> Vec<RedirectEntry> {
    let entry = |target: String| RedirectEntry {
        redirect: config.redirect,
        target,
    };

    let mut entries = Vec::with_capacity(addrs.len() + 2);
    entries.push(entry(domain.to_string()));
    if config.block_www {
        entries.push(entry(format!("www.{domain}")));
    }
    entries.extend(addrs.iter().map(|ip| entry(ip.to_string())));
    entries
}

/// The hosts file content captured before blocking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    path: PathBuf,
    content: Vec<u8>,
}

impl Snapshot {
    /// The file this snapshot was taken from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The original bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Returns `true` if appending can start directly on a fresh line.
    fn ends_on_line_boundary(&self) -> bool {
        self.content.is_empty() || self.content.ends_with(b"\n")
    }
}

/// Handle to the hosts file being edited.
///
/// # Lifecycle
///
/// 1. [`snapshot`](Self::snapshot) reads the original content.
/// 2. [`append`](Self::append) adds redirect entries after it.
/// 3. [`restore`](Self::restore) writes the snapshot back verbatim.
///
/// # Permissions
///
/// The system hosts file requires root (or Administrator on Windows). The
/// caller must handle elevation.
///
/// # Example
///
/// ```rust,ignore
/// use hosts_blocker::{BlockerConfig, HostsFile, hosts::redirect_entries};
///
/// let hosts = HostsFile::new();
/// let snapshot = hosts.snapshot()?;
/// hosts.append(&snapshot, &redirect_entries("example.com", &[], &BlockerConfig::new()))?;
/// // ...
/// hosts.restore(&snapshot)?;
/// ```
pub struct HostsFile {
    path: PathBuf,
}

impl HostsFile {
    /// Targets the current platform's hosts file.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: crate::platform::Platform::current().default_hosts_path(),
        }
    }

    /// Targets a custom path (useful for testing).
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the hosts file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full current content.
    ///
    /// # Errors
    ///
    /// Returns [`BlockerError::Io`](crate::BlockerError::Io) if the file
    /// cannot be read.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let content = std::fs::read(&self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            bytes = content.len(),
            "Captured hosts file snapshot"
        );
        Ok(Snapshot {
            path: self.path.clone(),
            content,
        })
    }

    /// Appends `entries`, one per line, after the existing content.
    ///
    /// If `snapshot` shows the file does not end with a newline, one is
    /// written first so the first entry starts on its own line.
    ///
    /// # Errors
    ///
    /// Returns [`BlockerError::Io`](crate::BlockerError::Io) if the file
    /// cannot be opened for appending or written.
    pub fn append(&self, snapshot: &Snapshot, entries: &[RedirectEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        if !snapshot.ends_on_line_boundary() {
            buf.push('\n');
        }
        for entry in entries {
            buf.push_str(&entry.to_string());
            buf.push('\n');
        }

        let mut file = std::fs::OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(buf.as_bytes())?;
        file.flush()?;

        tracing::info!(
            path = %self.path.display(),
            entries = entries.len(),
            "Appended redirect entries"
        );
        Ok(())
    }

    /// Overwrites the file with the snapshot's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BlockerError::Io`](crate::BlockerError::Io) if the file
    /// cannot be written.
    pub fn restore(&self, snapshot: &Snapshot) -> Result<()> {
        if snapshot.path != self.path {
            tracing::warn!(
                snapshot = %snapshot.path.display(),
                target = %self.path.display(),
                "Restoring snapshot onto a different file"
            );
        }
        std::fs::write(&self.path, &snapshot.content)?;
        tracing::info!(path = %self.path.display(), "Restored hosts file");
        Ok(())
    }
}

impl Default for HostsFile {
    fn default() -> Self {
        Self::new()
    }
}
