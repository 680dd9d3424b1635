//! Artifact retrieval: network fetcher capability and inline `data:` URLs.
use anyhow::{Context as _, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use std::fmt::Debug;
use std::io::{self, Write};
use std::path::Path;

use crate::error::FetchError;

/// Streams the body of a URL into a writer.
pub trait Fetcher: Send + Sync + Debug {
    /// Retrieve `url` and copy its body into `sink`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Request`] on transport failure or a non-success
    /// status, and an I/O error if `sink` cannot be written.
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64>;
}

/// [`Fetcher`] backed by a blocking `ureq` agent.
///
/// No timeouts are configured: retrieval blocks until the server finishes or
/// the connection fails.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh agent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher").finish_non_exhaustive()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        let response = self.agent.get(url).call().map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let mut reader = response.into_body().into_reader();
        let copied = io::copy(&mut reader, sink).map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(copied)
    }
}

/// Where a `file` entry's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Bytes decoded from a `data:` URL.
    Inline(Vec<u8>),
    /// A URL to retrieve through a [`Fetcher`].
    Remote(String),
}

impl Payload {
    /// Classify `url`, decoding it immediately when it is a `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidDataUrl`] if the inline payload is malformed.
    pub fn from_url(url: &str) -> Result<Self, FetchError> {
        url.strip_prefix("data:").map_or_else(
            || Ok(Self::Remote(url.to_string())),
            |rest| decode_data_url(rest).map(Self::Inline),
        )
    }
}

/// Decode the part of a `data:` URL after the scheme.
///
/// `<meta>;base64,<data>` is base64, `<meta>,<data>` is percent-encoded, and a
/// bare `<data>` without a comma is treated as base64.
fn decode_data_url(rest: &str) -> Result<Vec<u8>, FetchError> {
    match rest.split_once(',') {
        Some((meta, data)) if meta.ends_with(";base64") => decode_base64(data),
        Some((_, data)) => percent_decode(data),
        None => decode_base64(rest),
    }
}

fn decode_base64(data: &str) -> Result<Vec<u8>, FetchError> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| FetchError::InvalidDataUrl(format!("bad base64 payload: {e}")))
}

fn percent_decode(data: &str) -> Result<Vec<u8>, FetchError> {
    let escapes_valid = data.split('%').skip(1).all(|chunk| {
        chunk
            .get(..2)
            .is_some_and(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
    });
    if !escapes_valid {
        return Err(FetchError::InvalidDataUrl(
            "truncated or invalid percent escape".to_string(),
        ));
    }
    Ok(percent_decode_str(data).collect())
}

/// Compute the lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(64);
    for b in &digest {
        // write! to a String is infallible; unwrap_or(()) makes that explicit.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    hex
}

/// Compute the lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading {} for checksum", path.display()))?;
    Ok(sha256_hex(&bytes))
}
