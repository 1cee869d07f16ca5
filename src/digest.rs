//! Content digests for downloaded resources.
//!
//! Signature records carry digests as `algorithm:hexvalue` (apt emits
//! `SHA256:...`; older releases used `MD5Sum:...`). Comparison is
//! format-normalized: the algorithm prefix is stripped and the hex is
//! lowercased on both sides. Local hashing is always SHA-256, so a
//! record with a non-SHA-256 digest reports a mismatch rather than an
//! error.

use crate::error::Result;
use camino::Utf8Path;
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::fs;
use std::io::Read;

/// A normalized content digest: lowercase hex with any algorithm
/// prefix removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Normalize a raw digest field from a signature record.
    ///
    /// ```
    /// use apt_ferry::digest::ContentDigest;
    ///
    /// let digest = ContentDigest::parse("SHA256:ABCD12");
    /// assert_eq!(digest.as_hex(), "abcd12");
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let hex = raw.rsplit_once(':').map_or(raw, |(_, hex)| hex);
        Self(hex.trim().to_ascii_lowercase())
    }

    /// The normalized hex value.
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the SHA-256 digest of a file, streamed in chunks.
///
/// # Errors
///
/// Returns [`crate::error::FerryError::Io`] if the file cannot be read.
pub fn sha256_file(path: &Utf8Path) -> Result<ContentDigest> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(ContentDigest(format!("{:x}", hasher.finalize())))
}
