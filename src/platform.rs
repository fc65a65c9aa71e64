//! Platform detection and per-OS constants.

use std::fmt;
use std::path::PathBuf;

/// Hosts file location on Unix-like systems.
const UNIX_HOSTS_PATH: &str = "/etc/hosts";

/// Hosts file location on Windows.
const WINDOWS_HOSTS_PATH: &str = r"C:\Windows\System32\drivers\etc\hosts";

/// A single external command used to flush the resolver cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushCommand {
    /// Program name, looked up on `PATH`.
    pub program: &'static str,
    /// Arguments passed verbatim.
    pub args: &'static [&'static str],
}

impl fmt::Display for FlushCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program)?;
        for arg in self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How the commands of a [`FlushPlan`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPlan {
    /// Every command must succeed, in order.
    All(&'static [FlushCommand]),
    /// Commands are tried in order until one succeeds.
    FirstSuccess(&'static [FlushCommand]),
}

impl FlushPlan {
    /// The commands of this plan, in execution order.
    #[must_use]
    pub const fn commands(&self) -> &'static [FlushCommand] {
        match self {
            Self::All(cmds) | Self::FirstSuccess(cmds) => cmds,
        }
    }
}

const MACOS_FLUSH: &[FlushCommand] = &[
    FlushCommand {
        program: "dscacheutil",
        args: &["-flushcache"],
    },
    FlushCommand {
        program: "killall",
        args: &["-HUP", "mDNSResponder"],
    },
];

const LINUX_FLUSH: &[FlushCommand] = &[
    FlushCommand {
        program: "systemd-resolve",
        args: &["--flush-caches"],
    },
    FlushCommand {
        program: "resolvectl",
        args: &["flush-caches"],
    },
    FlushCommand {
        program: "service",
        args: &["nscd", "restart"],
    },
    FlushCommand {
        program: "nscd",
        args: &["-K"],
    },
    FlushCommand {
        program: "systemctl",
        args: &["restart", "dnsmasq"],
    },
    FlushCommand {
        program: "systemctl",
        args: &["restart", "NetworkManager"],
    },
    FlushCommand {
        program: "systemctl",
        args: &["restart", "pdnsd"],
    },
    // Last resort: a newer mtime makes caching resolvers re-read the file.
    FlushCommand {
        program: "touch",
        args: &[UNIX_HOSTS_PATH],
    },
];

const WINDOWS_FLUSH: &[FlushCommand] = &[FlushCommand {
    program: "ipconfig",
    args: &["/flushdns"],
}];

/// The operating system family the blocker runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    /// Any other OS; carries the target OS name.
    Unsupported(String),
}

impl Platform {
    /// Detects the platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` value to a platform.
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Returns `true` if a DNS cache flush is known for this platform.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Default hosts file location.
    #[must_use]
    pub fn default_hosts_path(&self) -> PathBuf {
        match self {
            Self::Windows => PathBuf::from(WINDOWS_HOSTS_PATH),
            _ => PathBuf::from(UNIX_HOSTS_PATH),
        }
    }

    /// The commands that flush the resolver cache, or `None` if unknown.
    #[must_use]
    pub const fn flush_plan(&self) -> Option<FlushPlan> {
        match self {
            Self::Linux => Some(FlushPlan::FirstSuccess(LINUX_FLUSH)),
            Self::MacOs => Some(FlushPlan::All(MACOS_FLUSH)),
            Self::Windows => Some(FlushPlan::All(WINDOWS_FLUSH)),
            Self::Unsupported(_) => None,
        }
    }

    /// Short OS name used in messages.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Unsupported(os) => os,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
