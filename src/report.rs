//! Per-host outcomes, phase summaries, and operator-facing text.
//!
//! Every phase processes hosts independently and never aborts the batch
//! on one host's failure; the price is that failures must be collected
//! and shown, not swallowed. `RunSummary` is the value the phases hand
//! back for that.

use crate::digest::ContentDigest;
use crate::routine::{Phase, Routine};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// How one host's unit of work ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostStatus {
    /// The host was processed successfully.
    Succeeded,
    /// The host was skipped before any remote work (e.g. probe down).
    Skipped(String),
    /// Remote work was attempted and failed.
    Failed(String),
}

/// A tagged result for a single host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOutcome {
    /// The host this outcome belongs to.
    pub host: String,
    /// What happened.
    pub status: HostStatus,
}

impl fmt::Display for HostOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            HostStatus::Succeeded => write!(f, "{}: Complete.", self.host),
            HostStatus::Skipped(reason) => write!(f, "{}: skipped ({reason})", self.host),
            HostStatus::Failed(reason) => write!(f, "{}: FAILED ({reason})", self.host),
        }
    }
}

/// One checksum mismatch found during GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Signature file stem the record came from.
    pub stem: String,
    /// Target filename of the mismatching resource.
    pub filename: String,
    /// Digest the signature record promised.
    pub expected: ContentDigest,
    /// Digest computed from the downloaded bytes.
    pub actual: ContentDigest,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}: expected {}, got {}",
            self.stem, self.filename, self.expected, self.actual
        )
    }
}

/// Accumulated checksum results for a GET run. Informational only: a
/// failing report never blocks packing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumReport {
    /// Every mismatch seen, in discovery order.
    pub mismatches: Vec<Mismatch>,
}

impl ChecksumReport {
    /// True when no mismatch was recorded.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// "PASS" or "FAIL" plus the enumerated mismatches.
    #[must_use]
    pub fn display_text(&self) -> String {
        if self.passed() {
            return "Checksum verification: PASS".to_owned();
        }
        let mut text = format!(
            "Checksum verification: FAIL ({} mismatch(es))",
            self.mismatches.len()
        );
        for mismatch in &self.mismatches {
            text.push_str("\n  ");
            text.push_str(&mismatch.to_string());
        }
        text
    }
}

/// Everything a phase run produced: per-host outcomes, the transport
/// archive written (FIND and GET), and the checksum report (GET).
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Outcomes in processing order.
    pub outcomes: Vec<HostOutcome>,
    /// Transport archive produced by this phase, if any.
    pub archive: Option<Utf8PathBuf>,
    /// Checksum results, empty outside GET.
    pub checksums: ChecksumReport,
}

impl RunSummary {
    /// Record an outcome for `host`.
    pub fn record(&mut self, host: &str, status: HostStatus) {
        self.outcomes.push(HostOutcome {
            host: host.to_owned(),
            status,
        });
    }

    /// Hosts whose remote work failed (not merely skipped).
    #[must_use]
    pub fn failed_hosts(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, HostStatus::Failed(_)))
            .map(|outcome| outcome.host.as_str())
            .collect()
    }

    /// Hosts that were skipped before any remote work.
    #[must_use]
    pub fn skipped_hosts(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, HostStatus::Skipped(_)))
            .map(|outcome| outcome.host.as_str())
            .collect()
    }
}

/// Operator guidance printed after a phase completes, naming the next
/// step across the air gap.
#[must_use]
pub fn epilogue(routine: Routine, phase: Phase, archive: Option<&Utf8Path>) -> String {
    let flag = format!("--{routine}");
    match (phase, archive) {
        (Phase::Find, Some(path)) => format!(
            "Carry {path} to the connected machine and run:\n  apt-ferry {flag} --get {path}"
        ),
        (Phase::Get, Some(path)) => format!(
            "Carry {path} back across the air gap and run:\n  apt-ferry {flag} --install {path}"
        ),
        (Phase::Install, _) => format!("{routine} applied on all attempted hosts."),
        // A FIND or GET run that produced no archive failed before
        // hand-off; there is no next step to describe.
        (Phase::Find | Phase::Get, None) => String::new(),
    }
}
