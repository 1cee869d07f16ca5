//! CLI argument definitions for apt-ferry.
//!
//! Exactly one routine (`--update` or `--upgrade`) and one phase
//! (`--find`, `--get <ARCHIVE>`, or `--install <ARCHIVE>`) are selected
//! per invocation. Separated from the main entrypoint to keep the
//! binary focused on orchestration.

use crate::routine::Routine;
use camino::Utf8PathBuf;
use clap::{ArgGroup, Parser};

/// Ferry APT metadata and packages across an air gap.
#[derive(Parser, Debug)]
#[command(name = "apt-ferry")]
#[command(version, about)]
#[command(group = ArgGroup::new("routine").required(true).args(["update", "upgrade"]))]
#[command(group = ArgGroup::new("phase").required(true).args(["find", "get", "install"]))]
#[command(long_about = concat!(
    "Ferry APT metadata and packages across an air gap.\n\n",
    "Each run executes one phase of one routine. FIND collects per-host ",
    "resource manifests over ssh and packs them into a transport archive. ",
    "GET runs on an internet-connected machine: it downloads every listed ",
    "resource, verifies checksums, and packs a bundle. INSTALL pushes the ",
    "bundle contents back onto each host and applies them.\n\n",
    "The transport archives cross the air gap by hand: carry the FIND ",
    "output to the connected machine, and the GET output back.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Collect pending-upgrade manifests from all hosts:\n",
    "    $ apt-ferry --upgrade --find\n\n",
    "  Download the listed packages on the connected machine:\n",
    "    $ apt-ferry --upgrade --get upgrade-sigs-2026-08-29.tar\n\n",
    "  Apply the downloaded packages on the air-gapped hosts:\n",
    "    $ apt-ferry --upgrade --install upgrade-bundle-2026-08-29.tar\n\n",
    "  Refresh repository metadata on the worker subset only:\n",
    "    $ apt-ferry --update --find --workers\n",
))]
pub struct Cli {
    /// Run the metadata-refresh routine.
    #[arg(long)]
    pub update: bool,

    /// Run the package-upgrade routine.
    #[arg(long)]
    pub upgrade: bool,

    /// FIND: collect signature files from the target hosts.
    #[arg(long)]
    pub find: bool,

    /// GET: download the resources listed in a sigs archive.
    #[arg(long, value_name = "ARCHIVE")]
    pub get: Option<Utf8PathBuf>,

    /// INSTALL: apply a downloaded bundle to the target hosts.
    #[arg(long, value_name = "ARCHIVE")]
    pub install: Option<Utf8PathBuf>,

    /// Configuration file with hosts and remote identity.
    #[arg(short, long, value_name = "FILE", default_value = "apt-ferry.toml")]
    pub config: Utf8PathBuf,

    /// Operate on the configured worker subset instead of all hosts.
    #[arg(long)]
    pub workers: bool,

    /// FIND only: show the hosts and remote command without running.
    #[arg(long, conflicts_with_all = ["get", "install"])]
    pub dry_run: bool,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

/// The phase selected on the command line, with its input archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseSelection {
    /// Collect signature files.
    Find,
    /// Download from the given sigs archive.
    Get(Utf8PathBuf),
    /// Apply the given bundle archive.
    Install(Utf8PathBuf),
}

impl Cli {
    /// The selected routine.
    #[must_use]
    pub const fn routine(&self) -> Routine {
        if self.update {
            Routine::Update
        } else {
            Routine::Upgrade
        }
    }

    /// The selected phase and its input, if any.
    ///
    /// The clap group guarantees exactly one selector is present.
    #[must_use]
    pub fn phase(&self) -> PhaseSelection {
        if let Some(archive) = &self.get {
            PhaseSelection::Get(archive.clone())
        } else if let Some(archive) = &self.install {
            PhaseSelection::Install(archive.clone())
        } else {
            PhaseSelection::Find
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
