//! Remote command execution and liveness probing.
//!
//! `RemoteExecutor` runs commands on a named host over ssh and copies
//! files with scp, under the configured login identity. It performs no
//! retry and no reachability check: callers probe liveness first and
//! contain failures to the host they belong to.

use crate::error::{FerryError, Result};
use camino::Utf8Path;
use std::process::Command;

/// Runs commands on remote hosts and copies files to and from them.
pub trait RemoteExecutor {
    /// Run `command` on `host` and return its stdout.
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::RemoteCommandFailed`] on a non-zero remote
    /// exit status (carrying trimmed stderr) and [`FerryError::Io`] if
    /// the local ssh process cannot be spawned.
    fn execute(&self, host: &str, command: &str) -> Result<String>;

    /// Copy a local file to `remote` on `host`.
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::TransferFailed`] if scp exits non-zero.
    fn transfer_out(&self, host: &str, local: &Utf8Path, remote: &str) -> Result<()>;

    /// Copy `remote` on `host` to a local path.
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::TransferFailed`] if scp exits non-zero.
    fn transfer_in(&self, host: &str, remote: &str, local: &Utf8Path) -> Result<()>;
}

/// Answers whether a host is reachable. Fail fast: the probe is bounded
/// to roughly one second.
pub trait LivenessProbe {
    /// Returns true when `host` responds.
    fn is_up(&self, host: &str) -> bool;
}

/// Production executor shelling out to `ssh` and `scp`.
pub struct SshExecutor {
    user: String,
}

impl SshExecutor {
    /// Create an executor that logs in as `user`.
    #[must_use]
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_owned(),
        }
    }

    /// `user@host` login target for ssh/scp.
    fn login(&self, host: &str) -> String {
        format!("{}@{host}", self.user)
    }
}

impl RemoteExecutor for SshExecutor {
    fn execute(&self, host: &str, command: &str) -> Result<String> {
        let login = self.login(host);
        let output = Command::new("ssh")
            .args(["-o", "BatchMode=yes", login.as_str(), command])
            .output()?;
        if !output.status.success() {
            return Err(FerryError::RemoteCommandFailed {
                host: host.to_owned(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn transfer_out(&self, host: &str, local: &Utf8Path, remote: &str) -> Result<()> {
        let target = format!("{}:{remote}", self.login(host));
        run_scp(host, "to", &[local.as_str(), &target])
    }

    fn transfer_in(&self, host: &str, remote: &str, local: &Utf8Path) -> Result<()> {
        let source = format!("{}:{remote}", self.login(host));
        run_scp(host, "from", &[&source, local.as_str()])
    }
}

/// Run scp with the given endpoints, mapping failure to
/// [`FerryError::TransferFailed`].
fn run_scp(host: &str, direction: &'static str, endpoints: &[&str]) -> Result<()> {
    let output = Command::new("scp")
        .args(["-o", "BatchMode=yes", "-q"])
        .args(endpoints)
        .output()?;
    if !output.status.success() {
        return Err(FerryError::TransferFailed {
            host: host.to_owned(),
            direction,
            message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(())
}

/// Production probe using a single ICMP echo with a one-second bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct PingProbe;

impl LivenessProbe for PingProbe {
    fn is_up(&self, host: &str) -> bool {
        Command::new("ping")
            .args(["-c", "1", "-W", "1", host])
            .output()
            .is_ok_and(|output| output.status.success())
    }
}
