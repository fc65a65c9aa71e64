//! OS capabilities: privilege checks, elevation and DNS cache flushing.

use crate::error::{BlockerError, Result};
use crate::platform::{FlushCommand, FlushPlan, Platform};
use std::path::Path;
use std::process::Command;

/// Operations that touch the operating system outside the hosts file.
pub trait System {
    /// Returns `true` if the process may rewrite `hosts_path`.
    fn is_privileged(&self, hosts_path: &Path) -> bool;

    /// Re-runs the current program with elevated privileges and waits for it.
    ///
    /// Returns the elevated process's exit code. The caller is expected to
    /// exit with it rather than continue.
    ///
    /// # Errors
    ///
    /// Returns [`BlockerError::Elevation`] if the elevated process could not
    /// be started, or [`BlockerError::ElevationUnavailable`] on an OS without
    /// a supported mechanism.
    fn elevate(&self) -> Result<i32>;

    /// Flushes the OS resolver cache.
    ///
    /// # Errors
    ///
    /// Returns [`BlockerError::UnsupportedPlatform`] if `platform` has no
    /// known flush command, or [`BlockerError::CommandFailed`] if the
    /// command(s) failed.
    fn flush_dns_cache(&self, platform: &Platform) -> Result<()>;
}

/// The real operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSystem;

impl System for OsSystem {
    fn is_privileged(&self, hosts_path: &Path) -> bool {
        crate::util::can_edit(hosts_path)
    }

    fn elevate(&self) -> Result<i32> {
        elevate_current_process()
    }

    fn flush_dns_cache(&self, platform: &Platform) -> Result<()> {
        let plan = platform
            .flush_plan()
            .ok_or_else(|| BlockerError::UnsupportedPlatform {
                os: platform.name().to_string(),
            })?;
        run_plan(plan, run_command)
    }
}

/// Executes `plan` with `run` as the command runner.
///
/// `All` stops at the first failure. `FirstSuccess` stops at the first
/// success and otherwise reports the last failure.
fn run_plan(plan: FlushPlan, mut run: impl FnMut(&FlushCommand) -> Result<()>) -> Result<()> {
    match plan {
        FlushPlan::All(cmds) => {
            for cmd in cmds {
                run(cmd)?;
            }
            tracing::info!(commands = cmds.len(), "Flushed DNS cache");
            Ok(())
        }
        FlushPlan::FirstSuccess(cmds) => {
            let mut last_err = None;
            for cmd in cmds {
                match run(cmd) {
                    Ok(()) => {
                        tracing::info!(command = %cmd, "Flushed DNS cache");
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::debug!(command = %cmd, error = %e, "Flush method failed");
                        last_err = Some(e);
                    }
                }
            }
            Err(last_err.unwrap_or_else(|| BlockerError::CommandFailed {
                command: String::new(),
                detail: "no flush commands configured".to_string(),
            }))
        }
    }
}

fn run_command(cmd: &FlushCommand) -> Result<()> {
    let output = Command::new(cmd.program)
        .args(cmd.args)
        .output()
        .map_err(|e| BlockerError::CommandFailed {
            command: cmd.to_string(),
            detail: e.to_string(),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let mut detail = output.status.to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        detail.push_str(", output: ");
        detail.push_str(stderr);
    }
    Err(BlockerError::CommandFailed {
        command: cmd.to_string(),
        detail,
    })
}

#[cfg(unix)]
fn elevate_current_process() -> Result<i32> {
    let exe = std::env::current_exe()
        .map_err(|e| BlockerError::Elevation(format!("cannot locate executable: {e}")))?;

    tracing::debug!(exe = %exe.display(), "Re-running through sudo");
    let mut child = Command::new("sudo")
        .arg(&exe)
        .args(std::env::args_os().skip(1))
        .spawn()
        .map_err(|e| BlockerError::Elevation(format!("cannot run sudo: {e}")))?;

    // Ctrl+C reaches the whole process group. The elevated child owns the
    // restore, so the parent ignores SIGINT until the child exits. This is
    // set after spawning so the child does not inherit the ignored signal.
    // SAFETY: installing SIG_IGN has no memory-safety preconditions.
    let previous = unsafe { libc::signal(libc::SIGINT, libc::SIG_IGN) };
    let status = child.wait();
    // SAFETY: `previous` was returned by `signal` for the same signal.
    unsafe {
        libc::signal(libc::SIGINT, previous);
    }

    let status = status.map_err(|e| BlockerError::Elevation(e.to_string()))?;
    Ok(status.code().unwrap_or(1))
}

#[cfg(not(unix))]
fn elevate_current_process() -> Result<i32> {
    Err(BlockerError::ElevationUnavailable {
        os: std::env::consts::OS.to_string(),
    })
}
