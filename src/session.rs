//! The block/restore session.
//!
//! [`run`] drives the whole flow. Each step is also public so callers can
//! compose them differently:
//!
//! 1. [`ensure_privileged`] re-runs the program elevated when needed.
//! 2. [`collect_domains`](crate::prompt::collect_domains) gathers names.
//! 3. [`block`] snapshots the hosts file and appends redirect entries.
//! 4. [`flush`] clears the resolver cache.
//! 5. [`wait_and_restore`] blocks on the shutdown signal, then restores.
//!
//! The shutdown signal is armed before step 3, so an interrupt that lands
//! while entries are being appended or the cache is being flushed still ends
//! in a restore.

use crate::config::BlockerConfig;
use crate::error::{BlockerError, Result};
use crate::hosts::{HostsFile, Snapshot, redirect_entries};
use crate::platform::Platform;
use crate::prompt::{DomainPrompt, collect_domains};
use crate::resolve::Resolve;
use crate::signal::ShutdownSignal;
use crate::system::System;
use std::io::Write;

/// Everything a session needs from the outside world.
pub struct Context<'a> {
    /// Hosts file location and entry options.
    pub config: BlockerConfig,
    /// OS family, selects the DNS cache flush commands.
    pub platform: Platform,
    /// Privilege check, elevation and cache flushing.
    pub system: &'a dyn System,
    /// Looks up the addresses blocked alongside each domain.
    pub resolver: &'a dyn Resolve,
    /// Sink for user-facing status messages.
    pub out: &'a mut dyn Write,
    /// Re-run through the OS elevation mechanism when unprivileged.
    pub elevate: bool,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The session ran in an elevated child process that exited with `code`.
    Elevated { code: i32 },
    /// No domains were entered; the hosts file was not touched.
    NoDomains,
    /// No flush command exists for this OS. The hosts file still holds the
    /// appended entries.
    UnsupportedPlatform,
    /// The shutdown signal fired and the original hosts file was restored.
    Restored,
}

impl Outcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Elevated { code } => *code,
            Self::NoDomains | Self::Restored => 0,
            Self::UnsupportedPlatform => 1,
        }
    }
}

/// A blocked hosts file waiting to be restored.
#[derive(Debug)]
pub struct BlockSession {
    /// Domains blocked, in entry order.
    pub domains: Vec<String>,
    snapshot: Snapshot,
}

impl BlockSession {
    /// The hosts file content from before blocking.
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// Runs a complete session.
///
/// # Errors
///
/// Returns any I/O, elevation, prompt or signal error. DNS lookup and cache
/// flush failures are not errors.
pub fn run(
    ctx: &mut Context<'_>,
    prompt: &mut dyn DomainPrompt,
    shutdown: &mut dyn ShutdownSignal,
) -> Result<Outcome> {
    if let Some(code) = ensure_privileged(ctx)? {
        return Ok(Outcome::Elevated { code });
    }

    let domains = collect_domains(prompt)?;
    if domains.is_empty() {
        writeln!(ctx.out, "No websites provided. Exiting...")?;
        return Ok(Outcome::NoDomains);
    }

    shutdown.arm()?;
    let session = block(ctx, domains)?;

    if !flush(ctx)? {
        return Ok(Outcome::UnsupportedPlatform);
    }

    wait_and_restore(ctx, &session, shutdown)?;
    Ok(Outcome::Restored)
}

/// Makes sure the process may edit the hosts file.
///
/// Returns `Some(exit_code)` if the work was handed to an elevated child,
/// in which case the caller must not continue.
///
/// # Errors
///
/// Returns [`BlockerError::PermissionDenied`] when unprivileged with
/// elevation disabled, or the elevation error.
pub fn ensure_privileged(ctx: &mut Context<'_>) -> Result<Option<i32>> {
    if ctx.system.is_privileged(&ctx.config.hosts_path) {
        return Ok(None);
    }
    if !ctx.elevate {
        return Err(BlockerError::PermissionDenied {
            path: ctx.config.hosts_path.clone(),
        });
    }

    writeln!(ctx.out, "Elevating privileges to root...")?;
    let code = ctx.system.elevate()?;
    tracing::debug!(code, "Elevated process exited");
    Ok(Some(code))
}

/// Snapshots the hosts file and appends redirect entries for `domains`.
///
/// # Errors
///
/// Returns [`BlockerError::Io`] if the hosts file cannot be read or
/// appended to.
pub fn block(ctx: &mut Context<'_>, domains: Vec<String>) -> Result<BlockSession> {
    let hosts = HostsFile::with_path(&ctx.config.hosts_path);
    let snapshot = hosts.snapshot()?;

    let mut entries = Vec::new();
    for domain in &domains {
        let addrs = ctx.resolver.resolve_ipv4(domain);
        tracing::info!(domain = %domain, addrs = addrs.len(), "Blocking domain");
        entries.extend(redirect_entries(domain, &addrs, &ctx.config));
    }
    hosts.append(&snapshot, &entries)?;

    for domain in &domains {
        writeln!(ctx.out, "Blocked: {domain} and its IP addresses")?;
    }

    Ok(BlockSession { domains, snapshot })
}

/// Flushes the DNS cache.
///
/// Returns `false` on an unsupported platform, after telling the user. The
/// hosts file is left blocked in that case. Flush failures on supported
/// platforms are logged and otherwise ignored.
///
/// # Errors
///
/// Returns [`BlockerError::Io`] if the status message cannot be written.
pub fn flush(ctx: &mut Context<'_>) -> Result<bool> {
    if !ctx.platform.is_supported() {
        writeln!(ctx.out, "Unsupported platform. Exiting...")?;
        tracing::warn!(
            os = %ctx.platform,
            path = %ctx.config.hosts_path.display(),
            "Hosts file left with block entries"
        );
        return Ok(false);
    }

    if let Err(e) = ctx.system.flush_dns_cache(&ctx.platform) {
        tracing::warn!(error = %e, "Failed to flush DNS cache");
    }
    Ok(true)
}

/// Blocks until `shutdown` fires, then restores the original hosts file.
///
/// # Errors
///
/// Returns the signal error, or [`BlockerError::Io`] if the restore fails.
pub fn wait_and_restore(
    ctx: &mut Context<'_>,
    session: &BlockSession,
    shutdown: &mut dyn ShutdownSignal,
) -> Result<()> {
    writeln!(
        ctx.out,
        "The websites have been blocked. Press Ctrl+C to unblock and exit."
    )?;
    ctx.out.flush()?;

    shutdown.wait()?;

    writeln!(ctx.out, "\nRestoring the original hosts file...")?;
    HostsFile::with_path(&ctx.config.hosts_path).restore(&session.snapshot)?;

    if ctx.config.flush_on_restore {
        if let Err(e) = ctx.system.flush_dns_cache(&ctx.platform) {
            tracing::warn!(error = %e, "Failed to flush DNS cache after restore");
        }
    }

    writeln!(ctx.out, "Websites have been unblocked.")?;
    tracing::info!(domains = session.domains.len(), "Unblocked");
    Ok(())
}
