//! apt-ferry library.
//!
//! Synchronizes APT state between an internet-connected staging machine
//! and air-gapped Debian hosts. Two routines (metadata refresh and
//! package upgrade) share a three-phase pipeline: FIND collects per-host
//! resource manifests over ssh, GET downloads and verifies the listed
//! resources, INSTALL transfers and applies them. Transport archives
//! cross the air gap by operator hand-off between the phases.
//!
//! # Modules
//!
//! - [`archive`] - Transport archive packing and unpacking
//! - [`cli`] - Command-line argument definitions
//! - [`collect`] - FIND phase: signature collection
//! - [`config`] - Topology and directory configuration
//! - [`digest`] - Content digests and file hashing
//! - [`download`] - HTTP resource download abstraction
//! - [`error`] - Semantic error types
//! - [`fetch`] - GET phase: download, verify, repack
//! - [`install`] - INSTALL phase: transfer and remote apply
//! - [`remote`] - Remote execution and liveness probing
//! - [`report`] - Per-host outcomes and operator text
//! - [`routine`] - Routine/phase selection and archive naming
//! - [`signature`] - Signature file parsing

pub mod archive;
pub mod cli;
pub mod collect;
pub mod config;
pub mod digest;
pub mod download;
pub mod error;
pub mod fetch;
pub mod install;
pub mod remote;
pub mod report;
pub mod routine;
pub mod signature;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use error::{FerryError, Result};
pub use report::{HostOutcome, HostStatus, RunSummary};
pub use routine::{Phase, Routine};
