//! INSTALL phase: apply downloaded artifacts on the target hosts.
//!
//! The installer unpacks a GET bundle into per-host archives, then for
//! each host transfers its archive and applies it over one remote
//! session. The update routine replaces apt's metadata directory; the
//! upgrade routine installs the staged packages. Per-host failures are
//! recorded and the loop always proceeds to the next host.

use crate::archive::{recreate_dir, unpack};
use crate::config::Config;
use crate::error::Result;
use crate::remote::RemoteExecutor;
use crate::report::{HostStatus, RunSummary};
use crate::routine::Routine;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};

/// Where apt keeps its repository indexes on the targets.
const APT_LISTS_DIR: &str = "/var/lib/apt/lists";

/// Remote scratch directory for staged upgrade packages.
const UPGRADE_STAGE_DIR: &str = "/tmp/apt-ferry-upgrade";

/// A per-host archive with its target host carried as data.
///
/// The hostname is derived from the filename stem exactly once, here,
/// instead of being re-parsed at each later step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostArchive {
    /// Host this archive's contents were produced for.
    pub host: String,
    /// Local path to the archive.
    pub path: Utf8PathBuf,
}

impl HostArchive {
    /// Bind an unpacked archive to its host via the filename stem.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FerryError::Malformed`] when the
    /// filename does not follow `<routine>-<hostname>.tar`.
    pub fn from_path(routine: Routine, path: &Utf8Path) -> Result<Self> {
        let stem = path.file_stem().unwrap_or_default();
        let host = routine.host_from_stem(stem)?;
        Ok(Self {
            host,
            path: path.to_owned(),
        })
    }

    /// The archive's own filename.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or_default()
    }
}

/// Runs the INSTALL phase for one routine.
pub struct RemoteInstaller<'a> {
    config: &'a Config,
    routine: Routine,
    executor: &'a dyn RemoteExecutor,
}

impl<'a> RemoteInstaller<'a> {
    /// Create an installer over the given remote channel.
    #[must_use]
    pub fn new(config: &'a Config, routine: Routine, executor: &'a dyn RemoteExecutor) -> Self {
        Self {
            config,
            routine,
            executor,
        }
    }

    /// Transfer and apply every per-host archive in the bundle.
    ///
    /// # Errors
    ///
    /// Returns an error only when the bundle itself cannot be unpacked
    /// or the staging directory cannot be prepared. Per-host transfer
    /// and apply failures are recorded in the summary and never abort
    /// the batch.
    pub fn run(&self, bundle: &Utf8Path) -> Result<RunSummary> {
        let staging = self
            .config
            .scratch(&format!("{}-install", self.routine));
        recreate_dir(&staging)?;
        let extracted = unpack(bundle, &staging)?;

        let mut summary = RunSummary::default();
        for path in extracted
            .iter()
            .filter(|p| p.extension() == Some("tar"))
        {
            let archive = match HostArchive::from_path(self.routine, path) {
                Ok(archive) => archive,
                Err(e) => {
                    warn!("ignoring unrecognized bundle member {path}: {e}");
                    summary.record(
                        path.file_name().unwrap_or_default(),
                        HostStatus::Skipped("unrecognized archive name".to_owned()),
                    );
                    continue;
                }
            };
            debug!("applying {} to {}", archive.file_name(), archive.host);
            let status = match self.apply_host(&archive) {
                Ok(()) => HostStatus::Succeeded,
                Err(e) => {
                    warn!("install failed on {}: {e}", archive.host);
                    HostStatus::Failed(e.to_string())
                }
            };
            summary.record(&archive.host, status);
        }
        Ok(summary)
    }

    /// Transfer one archive and apply it over a single remote session.
    fn apply_host(&self, archive: &HostArchive) -> Result<()> {
        let remote_path = format!("/tmp/{}", archive.file_name());
        self.executor
            .transfer_out(&archive.host, &archive.path, &remote_path)?;
        let command = match self.routine {
            Routine::Update => update_apply_command(&remote_path),
            Routine::Upgrade => upgrade_apply_command(&remote_path),
        };
        self.executor.execute(&archive.host, &command)?;
        Ok(())
    }
}

/// Remote command that replaces the apt metadata directory with the
/// archive contents.
///
/// The lists directory is cleared first, members are extracted flat,
/// compressed indexes are decompressed in place, and any compressed
/// originals left behind are removed: apt's reader chokes on stale
/// compressed files next to their expanded forms.
fn update_apply_command(remote_archive: &str) -> String {
    format!(
        "sudo sh -c \"rm -rf {lists}/* && \
         tar -xf {remote_archive} -C {lists} && \
         (gunzip -f {lists}/*.gz || true) && \
         rm -f {lists}/*.gz\"",
        lists = APT_LISTS_DIR
    )
}

/// Remote command that stages and installs the archived packages.
///
/// dpkg runs twice in sequence: the first pass can leave packages
/// unconfigured when dependencies arrive later in the same batch, and
/// the second pass picks those up. A heuristic retry, not a
/// convergence guarantee.
fn upgrade_apply_command(remote_archive: &str) -> String {
    format!(
        "sudo sh -c \"rm -rf {stage} && mkdir -p {stage} && \
         tar -xf {remote_archive} -C {stage} && \
         (dpkg -i {stage}/*.deb; dpkg -i {stage}/*.deb) && \
         apt-get -y autoremove && apt-get clean\"",
        stage = UPGRADE_STAGE_DIR
    )
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
