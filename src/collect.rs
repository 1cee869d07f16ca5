//! FIND phase: collect per-host signature files.
//!
//! For each target host the collector probes liveness, runs the
//! routine's `--print-uris` listing remotely into a host-named
//! signature file, retrieves it, and finally packs every retrieved file
//! into one dated transport archive for hand-off. One host's failure
//! never blocks the rest; only packing the archive itself is fatal.

use crate::archive::{pack_dir, recreate_dir};
use crate::config::Config;
use crate::error::Result;
use crate::remote::{LivenessProbe, RemoteExecutor};
use crate::report::{HostStatus, RunSummary};
use crate::routine::Routine;
use log::{debug, warn};
use std::fs;

/// Runs the FIND phase for one routine.
pub struct SignatureCollector<'a> {
    config: &'a Config,
    routine: Routine,
    executor: &'a dyn RemoteExecutor,
    probe: &'a dyn LivenessProbe,
}

impl<'a> SignatureCollector<'a> {
    /// Create a collector over the given topology and remote channel.
    #[must_use]
    pub fn new(
        config: &'a Config,
        routine: Routine,
        executor: &'a dyn RemoteExecutor,
        probe: &'a dyn LivenessProbe,
    ) -> Self {
        Self {
            config,
            routine,
            executor,
            probe,
        }
    }

    /// Collect signature files from every target host and pack them.
    ///
    /// # Errors
    ///
    /// Returns an error only for phase-fatal conditions: the staging
    /// directory cannot be prepared or the transport archive cannot be
    /// written. Per-host failures are recorded in the summary instead.
    pub fn run(&self, workers_only: bool) -> Result<RunSummary> {
        let staging = self
            .config
            .scratch(&format!("{}-find-sigs", self.routine));
        recreate_dir(&staging)?;

        let mut summary = RunSummary::default();
        for host in self.config.targets(workers_only) {
            if !self.probe.is_up(host) {
                warn!("{host} is down, skipping");
                summary.record(host, HostStatus::Skipped("unreachable".to_owned()));
                continue;
            }
            debug!("{host} is up, collecting {} signature", self.routine);

            let status = match self.collect_host(host, &staging) {
                Ok(()) => HostStatus::Succeeded,
                Err(e) => {
                    warn!("signature collection failed on {host}: {e}");
                    HostStatus::Failed(e.to_string())
                }
            };
            summary.record(host, status);
        }

        fs::create_dir_all(&self.config.output_dir)?;
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let archive = self
            .config
            .output_dir
            .join(self.routine.sigs_archive_name(&date));
        pack_dir(&staging, &archive)?;
        summary.archive = Some(archive);
        Ok(summary)
    }

    /// Produce and retrieve one host's signature file.
    fn collect_host(&self, host: &str, staging: &camino::Utf8Path) -> Result<()> {
        let sig_name = self.routine.signature_name(host);
        let remote_path = format!("/tmp/{sig_name}");
        let command = format!("{} > {remote_path}", self.routine.print_uris_command());
        self.executor.execute(host, &command)?;
        self.executor
            .transfer_in(host, &remote_path, &staging.join(&sig_name))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "collect_tests.rs"]
mod tests;
