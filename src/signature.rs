//! Signature file parsing.
//!
//! A signature file is the per-host manifest produced by FIND: one
//! resource per line, whitespace-separated fields
//! `URI FILENAME [EXTRA...] [DIGEST]`. The URI may be wrapped in single
//! quotes (apt's `--print-uris` output is quoted); the digest, when
//! present, is the last field and has the form `algorithm:hexvalue`.

use crate::digest::ContentDigest;
use crate::error::Result;
use camino::Utf8Path;
use log::warn;
use std::fs;

/// One resource listed in a signature file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Source URI to download.
    pub uri: String,
    /// Filename the resource is saved under, unique within the file.
    pub filename: String,
    /// Optional integrity digest; `None` means no verification.
    pub digest: Option<ContentDigest>,
}

/// A parsed per-host signature file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureFile {
    /// Filename stem (`<routine>-<hostname>`) the file was stored under.
    pub stem: String,
    /// Records in file order.
    pub records: Vec<ResourceRecord>,
}

impl SignatureFile {
    /// Parse signature text retrieved from a host.
    ///
    /// Lines with fewer than two fields are skipped. Duplicate target
    /// filenames keep the first occurrence; later ones are dropped with
    /// a warning, since the filename doubles as the download path.
    #[must_use]
    pub fn parse(stem: &str, text: &str) -> Self {
        let mut records: Vec<ResourceRecord> = Vec::new();
        for line in text.lines() {
            let Some(record) = parse_record(line) else {
                continue;
            };
            if records.iter().any(|seen| seen.filename == record.filename) {
                warn!(
                    "{stem}: duplicate target filename {}, keeping first occurrence",
                    record.filename
                );
                continue;
            }
            records.push(record);
        }
        Self {
            stem: stem.to_owned(),
            records,
        }
    }

    /// Read and parse a signature file from disk.
    ///
    /// The stem is taken from the filename, so host identity is
    /// preserved from whatever name the archive member carried.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FerryError::Io`] if the file cannot be
    /// read.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let stem = path.file_stem().unwrap_or(path.as_str());
        Ok(Self::parse(stem, &text))
    }
}

/// Parse a single signature line into a record, or `None` for blank or
/// underfilled lines.
fn parse_record(line: &str) -> Option<ResourceRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (uri, filename) = match fields.as_slice() {
        [uri, filename, ..] => (*uri, *filename),
        _ => return None,
    };
    let digest = fields
        .get(2..)
        .and_then(<[&str]>::last)
        .filter(|field| field.contains(':'))
        .map(|field| ContentDigest::parse(field));
    Some(ResourceRecord {
        uri: uri.trim_matches('\'').to_owned(),
        filename: filename.to_owned(),
        digest,
    })
}
