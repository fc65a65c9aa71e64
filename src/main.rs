//! hosts-blocker - block websites until Ctrl+C.

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::debug;

use hosts_blocker::prompt::{DomainPrompt, PresetDomains, TerminalPrompt};
use hosts_blocker::{
    BlockerConfig, Context, CtrlC, OsSystem, Platform, SystemResolver, config::DEFAULT_REDIRECT,
};

/// Temporarily block websites through the hosts file. Ctrl+C restores it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Domains to block. Prompts interactively when omitted.
    domains: Vec<String>,

    /// Hosts file to edit instead of the platform default.
    #[arg(long, value_name = "PATH")]
    hosts_file: Option<PathBuf>,

    /// Address blocked names are redirected to.
    #[arg(long, value_name = "IP", default_value_t = DEFAULT_REDIRECT)]
    redirect: IpAddr,

    /// Do not add a `www.` entry for each domain.
    #[arg(long)]
    no_www: bool,

    /// Fail instead of re-running through sudo when not root.
    #[arg(long)]
    no_elevate: bool,

    /// Skip the DNS cache flush after restoring.
    #[arg(long)]
    no_flush_on_restore: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self, platform: &Platform) -> BlockerConfig {
        let mut config = BlockerConfig::for_platform(platform)
            .with_redirect(self.redirect)
            .with_www(!self.no_www)
            .with_flush_on_restore(!self.no_flush_on_restore);
        if let Some(path) = &self.hosts_file {
            config = config.with_hosts_path(path);
        }
        config
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the `-v` level.
fn setup_logging(verbose: u8) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        tracing_subscriber::EnvFilter::new(format!("hosts_blocker={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<i32> {
    let platform = Platform::current();
    let config = args.config(&platform);
    debug!(?config, %platform, "Starting");

    let mut prompt: Box<dyn DomainPrompt> = if args.domains.is_empty() {
        Box::new(TerminalPrompt::new())
    } else {
        Box::new(PresetDomains::new(args.domains))
    };

    let mut stdout = std::io::stdout();
    let mut ctx = Context {
        config,
        platform,
        system: &OsSystem,
        resolver: &SystemResolver,
        out: &mut stdout,
        elevate: !args.no_elevate,
    };

    let outcome = hosts_blocker::run(&mut ctx, prompt.as_mut(), &mut CtrlC::new())
        .with_context(|| format!("blocking via {}", ctx.config.hosts_path.display()))?;
    debug!(?outcome, "Finished");
    Ok(outcome.exit_code())
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    match run(args) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
