//! Per-date batch files and the non-destructive upload guard.
//!
//! A fetch window that straddles midnight only sees part of the earlier day. If that
//! day was already stored from a fuller window, uploading the partial batch would
//! throw data away, so a batch is only uploaded when it is at least as large as the
//! object it replaces. Each date key is handled independently.

use crate::error::UploadError;
use crate::models::DateBatch;
use crate::store::ObjectStore;
use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// What happened to one date key.
#[derive(Debug)]
pub enum UploadOutcome {
    Uploaded { key: String, bytes: u64 },
    /// Local batch smaller than the stored object; nothing was written remotely.
    Skipped { key: String, local_kb: f64, remote_kb: f64 },
    Failed(UploadError),
}

impl UploadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, UploadOutcome::Failed(_))
    }
    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

/// Object sizes are compared in KB, as the storage console reports them.
#[inline]
pub fn bytes_to_kb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

/// True when a local batch of `local_bytes` may replace a remote object of
/// `remote_bytes` (0 when absent).
#[inline]
pub fn should_upload(local_bytes: u64, remote_bytes: u64) -> bool {
    bytes_to_kb(local_bytes) >= bytes_to_kb(remote_bytes)
}

/// Serialize a batch as a compact JSON array at `path` (temp file, then replace).
/// Returns the file size in bytes.
pub fn write_batch_file(batch: &DateBatch, path: &Path) -> Result<u64> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = staging_path(path);
    let file = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer(&mut w, &batch.posts).context("serialize batch")?;
    w.flush().with_context(|| format!("flush {}", tmp.display()))?;
    drop(w);
    replace_file_atomic_backoff(&tmp, path)?;
    Ok(fs::metadata(path)?.len())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".inprogress");
    path.with_file_name(name)
}

/// Upload `path` to `key` unless the stored object is larger. Never returns an
/// error: failures come back as `UploadOutcome::Failed` so sibling keys proceed.
pub fn upload_if_not_smaller(store: &dyn ObjectStore, path: &Path, key: &str) -> UploadOutcome {
    let local_bytes = match fs::metadata(path) {
        Ok(m) => m.len(),
        Err(source) => {
            let err = UploadError::LocalSize { path: path.to_path_buf(), source };
            tracing::error!("{}", err);
            return UploadOutcome::Failed(err);
        }
    };
    // Unknown remote size means we can't prove the upload is safe.
    let remote_bytes = match store.object_size(key) {
        Ok(n) => n,
        Err(cause) => {
            let err = UploadError::SizeCheck { key: key.to_string(), cause };
            tracing::error!("{}", err);
            return UploadOutcome::Failed(err);
        }
    };

    let (local_kb, remote_kb) = (bytes_to_kb(local_bytes), bytes_to_kb(remote_bytes));
    if !should_upload(local_bytes, remote_bytes) {
        tracing::warn!(
            "The local file is smaller than the stored file ({:.2} KB < {:.2} KB). \
             Aborting upload for: {}/{} since it would delete data.",
            local_kb, remote_kb, store.location(), key
        );
        return UploadOutcome::Skipped { key: key.to_string(), local_kb, remote_kb };
    }

    match store.put_file(path, key) {
        Ok(()) => {
            tracing::info!("File successfully uploaded to: {}/{} ({:.2} KB)", store.location(), key, local_kb);
            UploadOutcome::Uploaded { key: key.to_string(), bytes: local_bytes }
        }
        Err(cause) => {
            let err = UploadError::Put { key: key.to_string(), cause };
            tracing::error!("{}", err);
            UploadOutcome::Failed(err)
        }
    }
}
