//! Object storage seam: list/get/put by key. The batch uploader and corpus loader
//! only see `ObjectStore`, so tests run against `MemoryStore`.

use crate::util::{create_with_backoff, open_with_backoff, replace_file_atomic_backoff};
use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Listing entry. `size` is in bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
}

pub trait ObjectStore {
    /// Human-readable location, e.g. `s3://bucket`.
    fn location(&self) -> String;

    /// Objects whose key starts with `prefix` (all objects when None), in store order.
    fn list_objects(&self, prefix: Option<&str>) -> Result<Vec<ObjectInfo>>;

    fn get_object(&self, key: &str) -> Result<Vec<u8>>;

    /// Upload a local file under `key`, replacing any existing object.
    fn put_file(&self, path: &Path, key: &str) -> Result<()>;

    /// Size in bytes of the object stored exactly at `key`; 0 when absent.
    fn object_size(&self, key: &str) -> Result<u64> {
        Ok(self
            .list_objects(Some(key))?
            .into_iter()
            .find(|o| o.key == key)
            .map(|o| o.size)
            .unwrap_or(0))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut f = open_with_backoff(path, 16, 50).with_context(|| format!("open {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).with_context(|| format!("read {}", path.display()))?;
    Ok(buf)
}

// ----------------------------- In-memory ------------------------------------

/// Keys are kept sorted, matching S3's lexicographic listing.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects.lock().insert(key.into(), bytes.into());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }
}

impl ObjectStore for MemoryStore {
    fn location(&self) -> String {
        "memory://".to_string()
    }

    fn list_objects(&self, prefix: Option<&str>) -> Result<Vec<ObjectInfo>> {
        let prefix = prefix.unwrap_or("");
        Ok(self
            .objects
            .lock()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| ObjectInfo { key: k.clone(), size: v.len() as u64 })
            .collect())
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        self.get(key).ok_or_else(|| anyhow!("no such key: {}", key))
    }

    fn put_file(&self, path: &Path, key: &str) -> Result<()> {
        let bytes = read_file(path)?;
        self.insert(key, bytes);
        Ok(())
    }
}

// ----------------------------- Local directory ------------------------------

/// A flat directory standing in for a bucket: one file per key.
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).with_context(|| format!("create {}", root.display()))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key == "." || key == ".." {
            return Err(anyhow!("invalid object key: {:?}", key));
        }
        Ok(self.root.join(key))
    }
}

impl ObjectStore for LocalDirStore {
    fn location(&self) -> String {
        format!("file://{}", self.root.display())
    }

    fn list_objects(&self, prefix: Option<&str>) -> Result<Vec<ObjectInfo>> {
        let prefix = prefix.unwrap_or("");
        let mut out = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1).sort_by_file_name() {
            let ent = entry.with_context(|| format!("list {}", self.root.display()))?;
            if !ent.file_type().is_file() {
                continue;
            }
            let Some(name) = ent.file_name().to_str() else { continue };
            // staging files from an interrupted put
            if name.ends_with(".inprogress") || !name.starts_with(prefix) {
                continue;
            }
            let size = ent.metadata().map(|m| m.len()).unwrap_or(0);
            out.push(ObjectInfo { key: name.to_string(), size });
        }
        Ok(out)
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        read_file(&self.path_for(key)?)
    }

    fn put_file(&self, path: &Path, key: &str) -> Result<()> {
        let dest = self.path_for(key)?;
        let tmp = self.root.join(format!("{}.inprogress", key));
        let bytes = read_file(path)?;
        let mut f = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
        f.write_all(&bytes)?;
        f.flush()?;
        drop(f);
        replace_file_atomic_backoff(&tmp, &dest)
    }
}

// ----------------------------- S3 -------------------------------------------

/// AWS S3 bucket. Credentials come from the usual AWS environment/profile chain.
pub struct S3Store {
    bucket: Box<s3::Bucket>,
}

impl S3Store {
    pub fn new(bucket: &str, region: &str) -> Result<Self> {
        let region: s3::Region = region.parse().with_context(|| format!("parse region {}", region))?;
        let creds = s3::creds::Credentials::default().context("load AWS credentials")?;
        let bucket = s3::Bucket::new(bucket, region, creds).with_context(|| format!("open bucket {}", bucket))?;
        Ok(Self { bucket })
    }
}

impl ObjectStore for S3Store {
    fn location(&self) -> String {
        format!("s3://{}", self.bucket.name())
    }

    fn list_objects(&self, prefix: Option<&str>) -> Result<Vec<ObjectInfo>> {
        let pages = self
            .bucket
            .list(prefix.unwrap_or("").to_string(), None)
            .with_context(|| format!("list {}", self.location()))?;
        Ok(pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|o| ObjectInfo { key: o.key, size: o.size })
            .collect())
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .bucket
            .get_object(key)
            .with_context(|| format!("get {}/{}", self.location(), key))?;
        Ok(resp.bytes().to_vec())
    }

    fn put_file(&self, path: &Path, key: &str) -> Result<()> {
        let bytes = read_file(path)?;
        let resp = self
            .bucket
            .put_object(key, &bytes)
            .with_context(|| format!("put {}/{}", self.location(), key))?;
        tracing::debug!(key, status = resp.status_code(), "put_object response");
        Ok(())
    }
}

/// The configured bucket, or a local directory when `store_dir` is set.
pub fn open_store(opts: &crate::config::CollectorOptions) -> Result<Box<dyn ObjectStore>> {
    match &opts.store_dir {
        Some(dir) => Ok(Box::new(LocalDirStore::new(dir)?)),
        None => Ok(Box::new(S3Store::new(&opts.bucket, &opts.region)?)),
    }
}
