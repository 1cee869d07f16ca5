//! Configuration for the ferry pipeline.
//!
//! All of the state the shell original kept in globals lives here as an
//! explicit value handed to each phase: the host topology, the remote
//! login identity, and the scratch/output directories. Loaded from a
//! TOML file.

use crate::error::{FerryError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;

/// Runtime configuration, deserialized from `apt-ferry.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Target hostnames, processed in this order.
    pub hosts: Vec<String>,
    /// Optional subset of `hosts` selected by `--workers`.
    #[serde(default)]
    pub workers: Vec<String>,
    /// Login user for ssh/scp sessions.
    pub remote_user: String,
    /// Root for per-phase scratch directories.
    #[serde(default = "default_scratch_root")]
    pub scratch_root: Utf8PathBuf,
    /// Directory transport archives are delivered to for hand-off.
    #[serde(default = "default_output_dir")]
    pub output_dir: Utf8PathBuf,
}

fn default_scratch_root() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
        .join("apt-ferry")
}

fn default_output_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(".")
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::InvalidConfig`] when the file is missing,
    /// unparsable, or fails validation.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FerryError::InvalidConfig {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| FerryError::InvalidConfig {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// The hosts a phase operates on: the worker subset when requested,
    /// otherwise the full topology.
    #[must_use]
    pub fn targets(&self, workers_only: bool) -> &[String] {
        if workers_only { &self.workers } else { &self.hosts }
    }

    /// A named scratch directory under the configured root.
    #[must_use]
    pub fn scratch(&self, name: &str) -> Utf8PathBuf {
        self.scratch_root.join(name)
    }

    fn validate(&self, path: &Utf8Path) -> Result<()> {
        if self.hosts.is_empty() {
            return Err(FerryError::InvalidConfig {
                path: path.to_owned(),
                reason: "hosts list is empty".to_owned(),
            });
        }
        if self.remote_user.is_empty() {
            return Err(FerryError::InvalidConfig {
                path: path.to_owned(),
                reason: "remote_user is empty".to_owned(),
            });
        }
        if let Some(stray) = self
            .workers
            .iter()
            .find(|worker| !self.hosts.contains(worker))
        {
            return Err(FerryError::InvalidConfig {
                path: path.to_owned(),
                reason: format!("worker {stray} is not in the hosts list"),
            });
        }
        Ok(())
    }
}
