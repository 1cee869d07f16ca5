//! Routine and phase selection, remote command lines, and archive naming.
//!
//! Host identity rides through every repack in the filename stem
//! `<routine>-<hostname>`. This module is the single place that builds
//! and parses those names, so the convention cannot drift between
//! phases.

use crate::error::{FerryError, Result};
use std::fmt;

/// The top-level pipeline variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Routine {
    /// Metadata refresh: fetch fresh repository indexes.
    Update,
    /// Package upgrade: fetch pending package files.
    Upgrade,
}

impl Routine {
    /// Lowercase name used in filenames and user messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Upgrade => "upgrade",
        }
    }

    /// The remote apt invocation whose output becomes a signature file.
    ///
    /// Both forms print the URIs apt would fetch without touching the
    /// target system. The upgrade listing appends a checksum field per
    /// line; the update listing does not.
    #[must_use]
    pub const fn print_uris_command(self) -> &'static str {
        match self {
            Self::Update => "apt-get --print-uris -qq update",
            Self::Upgrade => "apt-get --print-uris -qq upgrade",
        }
    }

    /// Name of the per-host signature file: `<routine>-<host>.sig`.
    #[must_use]
    pub fn signature_name(self, host: &str) -> String {
        format!("{}-{host}.sig", self.as_str())
    }

    /// Name of the per-host resource archive: `<routine>-<host>.tar`.
    #[must_use]
    pub fn host_archive_name(self, host: &str) -> String {
        format!("{}-{host}.tar", self.as_str())
    }

    /// Name of the dated FIND output archive.
    #[must_use]
    pub fn sigs_archive_name(self, date: &str) -> String {
        format!("{}-sigs-{date}.tar", self.as_str())
    }

    /// Name of the dated GET output archive.
    #[must_use]
    pub fn bundle_archive_name(self, date: &str) -> String {
        format!("{}-bundle-{date}.tar", self.as_str())
    }

    /// Recover the hostname from a `<routine>-<hostname>` filename stem.
    ///
    /// Strips the routine prefix rather than splitting on the last
    /// separator, so hostnames containing `-` survive the round trip.
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Malformed`] when the stem does not carry
    /// this routine's prefix or the hostname part is empty.
    pub fn host_from_stem(self, stem: &str) -> Result<String> {
        let prefix = format!("{}-", self.as_str());
        match stem.strip_prefix(&prefix) {
            Some(host) if !host.is_empty() => Ok(host.to_owned()),
            _ => Err(FerryError::Malformed {
                what: "archive name",
                reason: format!("expected stem {prefix}<hostname>, got {stem}"),
            }),
        }
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three sequential pipeline phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Discover the set of remote resources to fetch.
    Find,
    /// Download the discovered resources on a connected machine.
    Get,
    /// Apply downloaded artifacts to the disconnected targets.
    Install,
}

impl Phase {
    /// Lowercase name used in scratch directory names and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::Get => "get",
            Self::Install => "install",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
