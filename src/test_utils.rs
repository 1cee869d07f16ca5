//! Shared test doubles for the phase modules.
//!
//! `StubExecutor` scripts remote behaviour per host and records every
//! call, so tests can assert both what ran where and how per-host
//! failures are contained. `StubProbe` marks hosts down by name.

use crate::error::{FerryError, Result};
use crate::remote::{LivenessProbe, RemoteExecutor};
use camino::Utf8Path;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;

/// A scripted [`RemoteExecutor`] that writes canned signature content
/// on `transfer_in` and records every invocation.
#[derive(Debug, Default)]
pub struct StubExecutor {
    /// Content written locally when `transfer_in` targets this host.
    pub sig_content: HashMap<String, String>,
    /// Hosts whose `execute` calls fail.
    pub fail_execute: HashSet<String>,
    /// Hosts whose transfers fail.
    pub fail_transfer: HashSet<String>,
    /// Formatted log of every call, in order.
    pub calls: RefCell<Vec<String>>,
}

impl StubExecutor {
    /// The recorded calls, cloned out for assertions.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn log(&self, line: String) {
        self.calls.borrow_mut().push(line);
    }
}

impl RemoteExecutor for StubExecutor {
    fn execute(&self, host: &str, command: &str) -> Result<String> {
        self.log(format!("execute {host}: {command}"));
        if self.fail_execute.contains(host) {
            return Err(FerryError::RemoteCommandFailed {
                host: host.to_owned(),
                message: "scripted failure".to_owned(),
            });
        }
        Ok(String::new())
    }

    fn transfer_out(&self, host: &str, local: &Utf8Path, remote: &str) -> Result<()> {
        self.log(format!("transfer_out {host}: {local} -> {remote}"));
        if self.fail_transfer.contains(host) {
            return Err(FerryError::TransferFailed {
                host: host.to_owned(),
                direction: "to",
                message: "scripted failure".to_owned(),
            });
        }
        Ok(())
    }

    fn transfer_in(&self, host: &str, remote: &str, local: &Utf8Path) -> Result<()> {
        self.log(format!("transfer_in {host}: {remote} -> {local}"));
        if self.fail_transfer.contains(host) {
            return Err(FerryError::TransferFailed {
                host: host.to_owned(),
                direction: "from",
                message: "scripted failure".to_owned(),
            });
        }
        let content = self.sig_content.get(host).cloned().unwrap_or_default();
        fs::write(local, content)?;
        Ok(())
    }
}

/// A probe that reports every host up except the listed ones.
#[derive(Debug, Default)]
pub struct StubProbe {
    /// Hosts the probe reports as down.
    pub down: HashSet<String>,
}

impl StubProbe {
    /// Probe with the given hosts marked down.
    pub fn with_down(hosts: &[&str]) -> Self {
        Self {
            down: hosts.iter().map(|h| (*h).to_owned()).collect(),
        }
    }
}

impl LivenessProbe for StubProbe {
    fn is_up(&self, host: &str) -> bool {
        !self.down.contains(host)
    }
}

/// Build a [`crate::config::Config`] rooted in a temp directory.
pub fn test_config(temp: &Utf8Path, hosts: &[&str]) -> crate::config::Config {
    crate::config::Config {
        hosts: hosts.iter().map(|h| (*h).to_owned()).collect(),
        workers: Vec::new(),
        remote_user: "sync".to_owned(),
        scratch_root: temp.join("scratch"),
        output_dir: temp.join("handoff"),
    }
}
