//! Error types for the apt-ferry CLI.
//!
//! This module defines semantic error variants for the three pipeline
//! phases. Per-host errors (failed remote command, failed transfer) are
//! contained to that host's unit of work by the phase loops; archive
//! errors abort the whole invocation because no usable transport
//! artifact can be produced or consumed.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while running a pipeline phase.
#[derive(Debug, Error)]
pub enum FerryError {
    /// A remote command exited with a non-zero status.
    #[error("remote command failed on {host}: {message}")]
    RemoteCommandFailed {
        /// Host the command ran on.
        host: String,
        /// Trimmed stderr from the remote command.
        message: String,
    },

    /// Copying a file to or from a host failed.
    #[error("transfer {direction} {host} failed: {message}")]
    TransferFailed {
        /// Host involved in the transfer.
        host: String,
        /// Either "to" or "from".
        direction: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// Downloading a resource failed.
    #[error("download failed for {url}: {reason}")]
    Download {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// Creating a transport archive failed. Fatal for the phase.
    #[error("failed to pack archive {path}: {reason}")]
    ArchivePack {
        /// Path of the archive being written.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Unpacking a transport archive failed. Fatal for the phase.
    #[error("failed to unpack archive {path}: {reason}")]
    ArchiveUnpack {
        /// Path of the archive being read.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// An archive entry attempts to escape the destination directory.
    #[error("path traversal detected in archive entry: {entry}")]
    PathTraversal {
        /// The offending entry path.
        entry: String,
    },

    /// A signature record or archive name could not be parsed.
    #[error("malformed {what}: {reason}")]
    Malformed {
        /// What was being parsed (record, digest, archive name).
        what: &'static str,
        /// Description of the parse failure.
        reason: String,
    },

    /// The configuration file was missing or invalid.
    #[error("invalid configuration at {path}: {reason}")]
    InvalidConfig {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`FerryError`].
pub type Result<T> = std::result::Result<T, FerryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_command_failure_names_host() {
        let err = FerryError::RemoteCommandFailed {
            host: "builder3".to_owned(),
            message: "apt-get: not found".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("builder3"));
        assert!(msg.contains("apt-get: not found"));
    }

    #[test]
    fn transfer_failure_includes_direction() {
        let err = FerryError::TransferFailed {
            host: "node1".to_owned(),
            direction: "to",
            message: "connection refused".to_owned(),
        };
        assert!(err.to_string().contains("transfer to node1"));
    }

    #[test]
    fn archive_errors_include_path() {
        let err = FerryError::ArchiveUnpack {
            path: Utf8PathBuf::from("/tmp/bundle.tar"),
            reason: "unexpected EOF".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/bundle.tar"));
        assert!(msg.contains("unexpected EOF"));
    }
}
