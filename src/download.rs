//! Resource download for the GET phase.
//!
//! Provides a trait-based abstraction over HTTP fetching so the fetch
//! pipeline can be tested without network access.

use crate::error::{FerryError, Result};
use camino::Utf8Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout for resource downloads.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for fetching a URI to a local file.
#[cfg_attr(test, mockall::automock)]
pub trait Downloader {
    /// Download `url` and write the body to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Download`] if the request fails or returns
    /// a non-success status, and [`FerryError::Io`] if the file cannot
    /// be written.
    fn fetch(&self, url: &str, dest: &Utf8Path) -> Result<()>;
}

/// HTTP downloader using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str, dest: &Utf8Path) -> Result<()> {
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file)?;
        Ok(())
    }
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`FerryError::Download`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> FerryError {
    let reason = match err {
        ureq::Error::StatusCode(code) => format!("HTTP status {code}"),
        other => other.to_string(),
    };
    FerryError::Download {
        url: url.to_owned(),
        reason,
    }
}
