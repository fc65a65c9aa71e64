//! # hosts-blocker
//!
//! Temporarily block websites by redirecting them to loopback in the hosts
//! file, and put the file back exactly as it was when the session ends.
//!
//! A session asks for domain names, resolves each one's IPv4 addresses,
//! appends `127.0.0.1 <name>` entries for the domain, its `www.` form and
//! every address, flushes the OS resolver cache, and then waits. On Ctrl+C
//! the original bytes of the hosts file are written back.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use hosts_blocker::{BlockerConfig, Context, CtrlC, OsSystem, Platform, SystemResolver};
//! use hosts_blocker::prompt::TerminalPrompt;
//!
//! let mut stdout = std::io::stdout();
//! let mut ctx = Context {
//!     config: BlockerConfig::new(),
//!     platform: Platform::current(),
//!     system: &OsSystem,
//!     resolver: &SystemResolver,
//!     out: &mut stdout,
//!     elevate: true,
//! };
//! let outcome = hosts_blocker::run(&mut ctx, &mut TerminalPrompt::new(), &mut CtrlC::new())?;
//! std::process::exit(outcome.exit_code());
//! ```
//!
//! ## Recovery
//!
//! Only the interrupt signal restores the file. If the process is killed any
//! other way, the appended entries stay until removed by hand. They are
//! always the last lines of the file.
//!
//! ## Permissions
//!
//! Editing the hosts file requires root (Administrator on Windows). On Unix
//! an unprivileged run re-executes itself through `sudo`.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod hosts;
pub mod platform;
pub mod prompt;
pub mod resolve;
pub mod session;
pub mod signal;
pub mod system;
pub mod util;

pub use config::BlockerConfig;
pub use error::{BlockerError, Result};
pub use hosts::{HostsFile, RedirectEntry, Snapshot};
pub use platform::Platform;
pub use resolve::{Resolve, SystemResolver};
pub use session::{BlockSession, Context, Outcome, run};
pub use signal::{CtrlC, ShutdownSignal};
pub use system::{OsSystem, System};
