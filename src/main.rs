//! apt-ferry CLI entrypoint.
//!
//! Dispatches one (routine, phase) pair per invocation and reports
//! per-host outcomes to the operator. Per-host failures never change
//! the exit code; only argument errors and fatal archive failures do.

use apt_ferry::cli::{Cli, PhaseSelection};
use apt_ferry::collect::SignatureCollector;
use apt_ferry::config::Config;
use apt_ferry::download::HttpDownloader;
use apt_ferry::error::Result;
use apt_ferry::fetch::ResourceFetcher;
use apt_ferry::install::RemoteInstaller;
use apt_ferry::remote::{PingProbe, SshExecutor};
use apt_ferry::report::{RunSummary, epilogue};
use apt_ferry::routine::Phase;
use clap::Parser;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    if let Err(err) = run(&cli, &mut stderr) {
        write_stderr_line(&mut stderr, err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let config = Config::load(&cli.config)?;
    let routine = cli.routine();

    if cli.dry_run {
        print_dry_run_info(cli, &config, stderr);
        return Ok(());
    }

    let (phase, summary) = match cli.phase() {
        PhaseSelection::Find => {
            let executor = SshExecutor::new(&config.remote_user);
            let collector = SignatureCollector::new(&config, routine, &executor, &PingProbe);
            (Phase::Find, collector.run(cli.workers)?)
        }
        PhaseSelection::Get(archive) => {
            let fetcher = ResourceFetcher::new(&config, routine, &HttpDownloader);
            (Phase::Get, fetcher.run(&archive)?)
        }
        PhaseSelection::Install(archive) => {
            let executor = SshExecutor::new(&config.remote_user);
            let installer = RemoteInstaller::new(&config, routine, &executor);
            (Phase::Install, installer.run(&archive)?)
        }
    };

    report_summary(cli, phase, &summary, stderr);
    Ok(())
}

/// Print per-host outcomes, the checksum verdict, and the epilogue.
fn report_summary(cli: &Cli, phase: Phase, summary: &RunSummary, stderr: &mut dyn Write) {
    if !cli.quiet {
        for outcome in &summary.outcomes {
            write_stderr_line(stderr, outcome);
        }
    }
    if phase == Phase::Get {
        write_stderr_line(stderr, summary.checksums.display_text());
    }
    let failed = summary.failed_hosts();
    if !failed.is_empty() {
        write_stderr_line(stderr, format!("Failed hosts: {}", failed.join(", ")));
    }
    if !cli.quiet {
        let text = epilogue(cli.routine(), phase, summary.archive.as_deref());
        if !text.is_empty() {
            write_stderr_line(stderr, "");
            write_stderr_line(stderr, text);
        }
    }
}

/// Show what FIND would do without touching any host.
fn print_dry_run_info(cli: &Cli, config: &Config, stderr: &mut dyn Write) {
    let routine = cli.routine();
    write_stderr_line(stderr, "Dry run - no hosts will be contacted");
    write_stderr_line(
        stderr,
        format!("Remote command: {}", routine.print_uris_command()),
    );
    write_stderr_line(stderr, "Target hosts:");
    for host in config.targets(cli.workers) {
        write_stderr_line(stderr, format!("  - {host}"));
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}
