//! Integration tests for `hosts-blocker`.
//!
//! Tests marked `#[ignore]` require root:
//!
//! ```bash
//! sudo cargo test -- --ignored
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::mpsc;

use hosts_blocker::prompt::PresetDomains;
use hosts_blocker::{
    BlockerConfig, Context, HostsFile, Outcome, Platform, Resolve, Result, ShutdownSignal, System,
    session,
};

const ORIGINAL: &str = "127.0.0.1\tlocalhost\n::1\tlocalhost ip6-localhost\n# keep me\n";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RootSystem {
    flushes: RefCell<usize>,
}

impl System for RootSystem {
    fn is_privileged(&self, _: &Path) -> bool {
        true
    }
    fn elevate(&self) -> Result<i32> {
        panic!("already privileged");
    }
    fn flush_dns_cache(&self, _: &Platform) -> Result<()> {
        *self.flushes.borrow_mut() += 1;
        Ok(())
    }
}

#[derive(Default)]
struct StaticDns(HashMap<&'static str, Vec<Ipv4Addr>>);

impl StaticDns {
    fn with(mut self, domain: &'static str, ips: &[&str]) -> Self {
        self.0
            .insert(domain, ips.iter().map(|ip| ip.parse().unwrap()).collect());
        self
    }
}

impl Resolve for StaticDns {
    fn resolve_ipv4(&self, domain: &str) -> Vec<Ipv4Addr> {
        self.0.get(domain).cloned().unwrap_or_default()
    }
}

/// Checks the hosts file while "blocked", then lets the session restore.
struct Inspect<'a> {
    path: &'a Path,
    seen: RefCell<Option<String>>,
}

impl ShutdownSignal for Inspect<'_> {
    fn wait(&mut self) -> Result<()> {
        *self.seen.borrow_mut() = Some(std::fs::read_to_string(self.path).unwrap());
        Ok(())
    }
}

fn hosts_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("hosts");
    std::fs::write(&path, ORIGINAL).unwrap();
    path
}

fn context<'a>(
    path: &Path,
    system: &'a RootSystem,
    dns: &'a StaticDns,
    out: &'a mut Vec<u8>,
) -> Context<'a> {
    Context {
        config: BlockerConfig::for_platform(&Platform::Linux).with_hosts_path(path),
        platform: Platform::Linux,
        system,
        resolver: dns,
        out,
        elevate: false,
    }
}

// ---------------------------------------------------------------------------
// Tempfile tests (no root required)
// ---------------------------------------------------------------------------

#[test]
fn full_session_blocks_then_restores() {
    let dir = tempfile::tempdir().unwrap();
    let path = hosts_file(&dir);
    let system = RootSystem::default();
    let dns = StaticDns::default().with("example.com", &["93.184.216.34"]);
    let mut out = Vec::new();
    let mut ctx = context(&path, &system, &dns, &mut out);

    let mut signal = Inspect {
        path: &path,
        seen: RefCell::new(None),
    };
    let mut prompt = PresetDomains::new(["example.com", ""]);

    let outcome = hosts_blocker::run(&mut ctx, &mut prompt, &mut signal).unwrap();
    assert_eq!(outcome, Outcome::Restored);

    // While blocked.
    let blocked = signal.seen.into_inner().unwrap();
    assert_eq!(
        blocked,
        format!(
            "{ORIGINAL}127.0.0.1 example.com\n127.0.0.1 www.example.com\n127.0.0.1 93.184.216.34\n"
        )
    );

    // After restore.
    assert_eq!(std::fs::read(&path).unwrap(), ORIGINAL.as_bytes());
    assert_eq!(*system.flushes.borrow(), 2);

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Blocked: example.com and its IP addresses"));
    assert!(out.contains("Press Ctrl+C to unblock"));
    assert!(out.contains("Websites have been unblocked."));
}

#[test]
fn address_count_matches_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let path = hosts_file(&dir);
    let system = RootSystem::default();
    let dns = StaticDns::default()
        .with("three.test", &["10.0.0.1", "10.0.0.2", "10.0.0.3"])
        .with("none.test", &[]);
    let mut out = Vec::new();
    let mut ctx = context(&path, &system, &dns, &mut out);

    let session = session::block(&mut ctx, vec!["three.test".into(), "none.test".into()]).unwrap();
    assert_eq!(session.domains, ["three.test", "none.test"]);
    assert_eq!(session.snapshot().as_bytes(), ORIGINAL.as_bytes());

    let content = std::fs::read_to_string(&path).unwrap();
    let appended: Vec<&str> = content[ORIGINAL.len()..].lines().collect();
    assert_eq!(
        appended,
        [
            "127.0.0.1 three.test",
            "127.0.0.1 www.three.test",
            "127.0.0.1 10.0.0.1",
            "127.0.0.1 10.0.0.2",
            "127.0.0.1 10.0.0.3",
            "127.0.0.1 none.test",
            "127.0.0.1 www.none.test",
        ]
    );
}

#[test]
fn no_domains_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = hosts_file(&dir);
    let system = RootSystem::default();
    let dns = StaticDns::default();
    let mut out = Vec::new();
    let mut ctx = context(&path, &system, &dns, &mut out);

    let (_tx, mut rx) = mpsc::channel::<()>();
    let mut prompt = PresetDomains::new([""]);

    let outcome = hosts_blocker::run(&mut ctx, &mut prompt, &mut rx).unwrap();
    assert_eq!(outcome, Outcome::NoDomains);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(std::fs::read(&path).unwrap(), ORIGINAL.as_bytes());
    assert_eq!(*system.flushes.borrow(), 0);
    assert!(
        String::from_utf8(out)
            .unwrap()
            .contains("No websites provided")
    );
}

#[test]
fn unsupported_platform_keeps_entries_and_skips_wait() {
    let dir = tempfile::tempdir().unwrap();
    let path = hosts_file(&dir);
    let system = RootSystem::default();
    let dns = StaticDns::default();
    let mut out = Vec::new();
    let mut ctx = context(&path, &system, &dns, &mut out);
    ctx.platform = Platform::from_os("solaris");

    // Never fires; entering the wait would hang the test.
    let (_tx, mut rx) = mpsc::channel::<()>();
    let mut prompt = PresetDomains::new(["a.test"]);

    let outcome = hosts_blocker::run(&mut ctx, &mut prompt, &mut rx).unwrap();
    assert_eq!(outcome, Outcome::UnsupportedPlatform);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with(ORIGINAL));
    assert!(content.contains("127.0.0.1 www.a.test"));
    assert!(
        String::from_utf8(out)
            .unwrap()
            .contains("Unsupported platform")
    );
}

#[test]
fn restore_undoes_outside_edits_too() {
    let dir = tempfile::tempdir().unwrap();
    let path = hosts_file(&dir);
    let hosts = HostsFile::with_path(&path);

    let snapshot = hosts.snapshot().unwrap();
    std::fs::write(&path, "clobbered").unwrap();
    hosts.restore(&snapshot).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), ORIGINAL);
}

#[test]
fn missing_hosts_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing");
    let system = RootSystem::default();
    let dns = StaticDns::default();
    let mut out = Vec::new();
    let mut ctx = context(&path, &system, &dns, &mut out);

    let err = session::block(&mut ctx, vec!["a.test".into()]).unwrap_err();
    assert!(matches!(err, hosts_blocker::BlockerError::Io(_)));
}

/// Delivers the interrupt from inside the cache flush.
struct InterruptDuringFlush {
    tx: mpsc::Sender<()>,
}

impl System for InterruptDuringFlush {
    fn is_privileged(&self, _: &Path) -> bool {
        true
    }
    fn elevate(&self) -> Result<i32> {
        panic!("already privileged");
    }
    fn flush_dns_cache(&self, _: &Platform) -> Result<()> {
        let _ = self.tx.send(());
        Ok(())
    }
}

/// A channel signal that records the hosts file when it is armed.
struct ArmedChannel<'a> {
    path: &'a Path,
    rx: mpsc::Receiver<()>,
    at_arm: Option<String>,
}

impl ShutdownSignal for ArmedChannel<'_> {
    fn arm(&mut self) -> Result<()> {
        self.at_arm = Some(std::fs::read_to_string(self.path).unwrap());
        Ok(())
    }
    fn wait(&mut self) -> Result<()> {
        self.rx.wait()
    }
}

#[test]
fn interrupt_during_flush_still_restores() {
    let dir = tempfile::tempdir().unwrap();
    let path = hosts_file(&dir);
    let (tx, rx) = mpsc::channel();
    let system = InterruptDuringFlush { tx };
    let dns = StaticDns::default().with("example.com", &["93.184.216.34"]);
    let mut out = Vec::new();
    let mut ctx = Context {
        config: BlockerConfig::for_platform(&Platform::Linux)
            .with_hosts_path(&path)
            .with_flush_on_restore(false),
        platform: Platform::Linux,
        system: &system,
        resolver: &dns,
        out: &mut out,
        elevate: false,
    };
    let mut signal = ArmedChannel {
        path: &path,
        rx,
        at_arm: None,
    };
    let mut prompt = PresetDomains::new(["example.com"]);

    let outcome = hosts_blocker::run(&mut ctx, &mut prompt, &mut signal).unwrap();
    assert_eq!(outcome, Outcome::Restored);

    // Listening started before anything was appended.
    assert_eq!(signal.at_arm.as_deref(), Some(ORIGINAL));
    assert_eq!(std::fs::read(&path).unwrap(), ORIGINAL.as_bytes());
    assert!(
        String::from_utf8(out)
            .unwrap()
            .contains("Websites have been unblocked.")
    );
}

#[cfg(target_os = "linux")]
#[test]
fn sigint_during_slow_flush_restores_hosts_file() {
    use std::os::unix::fs::PermissionsExt;
    use std::process::{Command, Stdio};
    use std::time::Duration;

    let dir = tempfile::tempdir().unwrap();
    let path = hosts_file(&dir);

    // A flush command slow enough to be interrupted.
    let bin = dir.path().join("bin");
    std::fs::create_dir(&bin).unwrap();
    let flush = bin.join("systemd-resolve");
    std::fs::write(&flush, "#!/bin/sh\nsleep 3\n").unwrap();
    std::fs::set_permissions(&flush, std::fs::Permissions::from_mode(0o755)).unwrap();

    let search_path = std::env::join_paths(
        std::iter::once(bin.clone()).chain(std::env::split_paths(
            &std::env::var_os("PATH").unwrap_or_default(),
        )),
    )
    .unwrap();

    let child = Command::new(env!("CARGO_BIN_EXE_hosts-blocker"))
        .arg("--hosts-file")
        .arg(&path)
        .args(["--no-elevate", "--no-flush-on-restore", "localhost"])
        .env("PATH", search_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Wait for the entries; the slow flush runs right after them.
    let mut blocked = false;
    for _ in 0..50 {
        if std::fs::read_to_string(&path)
            .unwrap()
            .contains("127.0.0.1 www.localhost")
        {
            blocked = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(blocked, "entries never appended");

    // SAFETY: sending a signal to our own child process.
    #[allow(clippy::cast_possible_wrap)]
    let rc = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGINT) };
    assert_eq!(rc, 0);

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stdout).contains("Restoring the original hosts file")
    );
    assert_eq!(std::fs::read(&path).unwrap(), ORIGINAL.as_bytes());
}

// ---------------------------------------------------------------------------
// Root-only tests
// ---------------------------------------------------------------------------

#[test]
#[ignore = "requires root to flush the system DNS cache"]
fn real_dns_flush() {
    use hosts_blocker::OsSystem;
    OsSystem.flush_dns_cache(&Platform::current()).unwrap();
}

#[test]
#[ignore = "requires root to write the system hosts file"]
fn real_hosts_round_trip() {
    let hosts = HostsFile::new();
    let snapshot = hosts.snapshot().unwrap();
    let config = BlockerConfig::new();

    hosts
        .append(
            &snapshot,
            &hosts_blocker::hosts::redirect_entries("hosts-blocker-test.invalid", &[], &config),
        )
        .unwrap();
    assert!(
        std::fs::read_to_string(hosts.path())
            .unwrap()
            .contains("hosts-blocker-test.invalid")
    );

    hosts.restore(&snapshot).unwrap();
    assert_eq!(std::fs::read(hosts.path()).unwrap(), snapshot.as_bytes());
}
