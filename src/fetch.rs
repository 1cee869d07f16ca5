//! GET phase: download resources and repack them per host.
//!
//! The fetcher unpacks a FIND transport archive, downloads every
//! resource each signature file lists, verifies digests where present,
//! and repacks twice: the download directory into a per-host archive
//! named after the signature stem, then all per-host archives into one
//! dated aggregate. A per-host archive is packed even when downloads
//! failed or mismatched; a partial archive still supports a partial
//! install on the other side of the gap.

use crate::archive::{pack_dir, recreate_dir, unpack};
use crate::config::Config;
use crate::digest::sha256_file;
use crate::download::Downloader;
use crate::error::Result;
use crate::report::{HostStatus, Mismatch, RunSummary};
use crate::routine::Routine;
use crate::signature::SignatureFile;
use camino::Utf8Path;
use log::{debug, warn};
use std::fs;

/// Runs the GET phase for one routine.
pub struct ResourceFetcher<'a> {
    config: &'a Config,
    routine: Routine,
    downloader: &'a dyn Downloader,
}

/// Downloads and checksum results for one signature file.
struct FileResult {
    download_failures: usize,
    mismatches: Vec<Mismatch>,
}

impl<'a> ResourceFetcher<'a> {
    /// Create a fetcher using the given download channel.
    #[must_use]
    pub fn new(config: &'a Config, routine: Routine, downloader: &'a dyn Downloader) -> Self {
        Self {
            config,
            routine,
            downloader,
        }
    }

    /// Fetch everything a sigs archive lists and pack the bundle.
    ///
    /// # Errors
    ///
    /// Returns an error for phase-fatal conditions only: the input
    /// archive cannot be unpacked, scratch directories cannot be
    /// prepared, or an output archive cannot be written. Download
    /// failures and checksum mismatches are recorded in the summary.
    pub fn run(&self, sigs_archive: &Utf8Path) -> Result<RunSummary> {
        let staging = self.config.scratch(&format!("{}-get-sigs", self.routine));
        let downloads = self
            .config
            .scratch(&format!("{}-downloads", self.routine));
        let bundles = self.config.scratch(&format!("{}-archives", self.routine));
        recreate_dir(&staging)?;
        recreate_dir(&bundles)?;

        let extracted = unpack(sigs_archive, &staging)?;
        let mut summary = RunSummary::default();

        for sig_path in extracted
            .iter()
            .filter(|p| p.extension() == Some("sig"))
        {
            let signature = SignatureFile::load(sig_path)?;
            recreate_dir(&downloads)?;
            let result = self.fetch_all(&signature, &downloads);

            if result.mismatches.is_empty() {
                debug!("{}: all digests verified", signature.stem);
            } else {
                warn!(
                    "{}: {} checksum mismatch(es)",
                    signature.stem,
                    result.mismatches.len()
                );
            }

            // Pack regardless of failures above.
            let host_archive = bundles.join(format!("{}.tar", signature.stem));
            pack_dir(&downloads, &host_archive)?;

            let label = self
                .routine
                .host_from_stem(&signature.stem)
                .unwrap_or_else(|_| signature.stem.clone());
            let status = if result.download_failures == 0 {
                HostStatus::Succeeded
            } else {
                HostStatus::Failed(format!(
                    "{} download(s) failed",
                    result.download_failures
                ))
            };
            summary.record(&label, status);
            summary.checksums.mismatches.extend(result.mismatches);
        }

        fs::create_dir_all(&self.config.output_dir)?;
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let bundle = self
            .config
            .output_dir
            .join(self.routine.bundle_archive_name(&date));
        pack_dir(&bundles, &bundle)?;
        summary.archive = Some(bundle);
        Ok(summary)
    }

    /// Download every record in one signature file and verify digests.
    fn fetch_all(&self, signature: &SignatureFile, downloads: &Utf8Path) -> FileResult {
        let mut result = FileResult {
            download_failures: 0,
            mismatches: Vec::new(),
        };
        for record in &signature.records {
            let dest = downloads.join(&record.filename);
            if let Err(e) = self.downloader.fetch(&record.uri, &dest) {
                warn!("{}: {e}", signature.stem);
                result.download_failures += 1;
                continue;
            }
            let Some(expected) = &record.digest else {
                continue;
            };
            match sha256_file(&dest) {
                Ok(actual) if actual == *expected => {}
                Ok(actual) => result.mismatches.push(Mismatch {
                    stem: signature.stem.clone(),
                    filename: record.filename.clone(),
                    expected: expected.clone(),
                    actual,
                }),
                Err(e) => {
                    warn!("{}: cannot hash {}: {e}", signature.stem, record.filename);
                    result.download_failures += 1;
                }
            }
        }
        result
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
