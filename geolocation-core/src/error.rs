use std::{error::Error as _, io, path::PathBuf};

use thiserror::Error;

/// Everything that can go wrong while locating an address and writing the result out.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The request never produced a response (no connection, timeout, broken body).
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The remote service answered with a non-success status.
    #[error("{status} {} for url {url}: {body}", reason_phrase(*status))]
    Http { url: String, status: u16, body: String },

    /// The response arrived but did not contain what we asked for.
    #[error("unexpected response from {url}: {reason}")]
    ResponseFormat { url: String, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A capability this build was compiled without.
    #[error("{0}")]
    DependencyMissing(String),
}

impl TrackerError {
    pub(crate) fn network(url: &str, err: &reqwest::Error) -> Self {
        TrackerError::Network { url: url.to_string(), reason: describe(err) }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TrackerError::Io { path: path.into(), source }
    }

    /// One-line message for network and HTTP failures, which are reported to the
    /// user. `None` for everything else, which is fatal.
    pub fn classified_message(&self) -> Option<String> {
        match self {
            TrackerError::Network { .. } => Some(format!("Network error: {self}")),
            TrackerError::Http { .. } => Some(format!("HTTP error: {self}")),
            _ => None,
        }
    }
}

/// reqwest hides the interesting part ("operation timed out", "connection refused")
/// in the source chain, so flatten it.
fn describe(err: &reqwest::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Error")
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
