//! Failure taxonomy for an ingestion run. Plumbing errors elsewhere stay `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Network/protocol failure reaching the search endpoint. Triggers an alert.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error {status} from {url}")]
    Http { status: u16, url: String },
    #[error("connection error reaching {url}: {message}")]
    Connection { url: String, message: String },
    #[error("timed out waiting for {url}: {message}")]
    Timeout { url: String, message: String },
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl FetchError {
    /// Short label used in log lines ("HTTP", "Connection", ...).
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Http { .. } => "HTTP",
            FetchError::Connection { .. } => "Connection",
            FetchError::Timeout { .. } => "Timeout",
            FetchError::Decode { .. } => "Decode",
            FetchError::Request { .. } => "General Request",
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Valid response with zero posts. Logged as a warning, never alerted.
    #[error("no posts returned for r/{subreddit}")]
    EmptyResult { subreddit: String },
    #[error("could not write batch file {}: {cause:#}", path.display())]
    WriteBatch { path: PathBuf, cause: anyhow::Error },
    #[error("could not normalize post: {0:#}")]
    Normalize(anyhow::Error),
}

impl IngestError {
    pub fn should_alert(&self) -> bool {
        matches!(self, IngestError::Fetch(_))
    }
}

/// Storage failure for one date key; sibling keys still upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read remote size of {key}: {cause:#}")]
    SizeCheck { key: String, cause: anyhow::Error },
    #[error("could not read local size of {}: {source}", path.display())]
    LocalSize { path: PathBuf, source: std::io::Error },
    #[error("upload of {key} failed: {cause:#}")]
    Put { key: String, cause: anyhow::Error },
}

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("corpus has no documents")]
    EmptyCorpus,
    #[error("after pruning, no terms remain; try a lower min_df or a higher max_df")]
    NoTermsRemain,
    #[error("max_df ({max_df}) admits fewer documents than min_df ({min_df})")]
    InvalidBounds { min_df: usize, max_df: f64 },
    #[error("{docs} documents cannot form {k} clusters")]
    TooFewDocuments { docs: usize, k: usize },
}
