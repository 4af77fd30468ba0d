#![allow(dead_code)]

use rs_content::{
    AlertSink, FetchError, MemoryStore, NormalizedPost, ObjectInfo, ObjectStore, PostSource, RawPost, SearchQuery,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// 2021-03-01 00:00:00 UTC. Fixture timestamps are offsets from here so dates are
/// easy to read in assertions.
pub const MAR_1_2021: i64 = 1_614_556_800;
pub const DAY: i64 = 86_400;
pub const HOUR: i64 = 3_600;

/// Minimal submission as the search endpoint would return it.
pub fn raw_post(title: &str, selftext: &str, created_utc: i64) -> RawPost {
    RawPost {
        title: title.to_string(),
        selftext: selftext.to_string(),
        subreddit: "2007scape".to_string(),
        permalink: format!("/r/2007scape/comments/{}/", created_utc),
        url: format!("https://www.reddit.com/r/2007scape/comments/{}/", created_utc),
        created_utc,
    }
}

/// Stored post with only the text fields that matter for corpus tests.
pub fn stored_post(title: &str, content: &str) -> NormalizedPost {
    NormalizedPost {
        title: title.to_string(),
        content: content.to_string(),
        subreddit: "2007scape".to_string(),
        permalink: String::new(),
        url: String::new(),
        created_at_timestamp: "2021-03-01 01:00 PM".to_string(),
        created_at_date: "2021-03-01".to_string(),
    }
}

/// Canned search source. Records every query it is asked.
pub struct FakeSource {
    reply: RefCell<Option<Result<Vec<RawPost>, FetchError>>>,
    pub queries: RefCell<Vec<SearchQuery>>,
}

impl FakeSource {
    pub fn returning(posts: Vec<RawPost>) -> Self {
        Self { reply: RefCell::new(Some(Ok(posts))), queries: RefCell::new(Vec::new()) }
    }

    pub fn failing(err: FetchError) -> Self {
        Self { reply: RefCell::new(Some(Err(err))), queries: RefCell::new(Vec::new()) }
    }
}

impl PostSource for FakeSource {
    fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPost>, FetchError> {
        self.queries.borrow_mut().push(query.clone());
        self.reply.borrow_mut().take().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Alert sink that keeps (subject, body) pairs instead of sending mail.
#[derive(Default)]
pub struct RecordingAlerts {
    pub sent: RefCell<Vec<(String, String)>>,
    pub fail: bool,
}

impl AlertSink for RecordingAlerts {
    fn send_alert(&self, subject: &str, body: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("smtp unavailable");
        }
        self.sent.borrow_mut().push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Memory-backed store that fails puts for keys containing `fail_put_for`,
/// and every size lookup when `fail_size` is set.
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_put_for: Option<String>,
    pub fail_size: bool,
}

impl ObjectStore for FailingStore {
    fn location(&self) -> String {
        "failing://".to_string()
    }

    fn list_objects(&self, prefix: Option<&str>) -> anyhow::Result<Vec<ObjectInfo>> {
        self.inner.list_objects(prefix)
    }

    fn get_object(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self.inner.get_object(key)
    }

    fn put_file(&self, path: &Path, key: &str) -> anyhow::Result<()> {
        if let Some(pat) = &self.fail_put_for {
            if key.contains(pat.as_str()) {
                anyhow::bail!("connection reset while putting {}", key);
            }
        }
        self.inner.put_file(path, key)
    }

    fn object_size(&self, key: &str) -> anyhow::Result<u64> {
        if self.fail_size {
            anyhow::bail!("HEAD {} timed out", key);
        }
        self.inner.object_size(key)
    }
}

/// Fresh temp directory that outlives the test (cleaned by the OS).
pub fn scratch_dir() -> PathBuf {
    tempfile::tempdir().unwrap().into_path()
}

/// Decode a stored batch back into posts.
pub fn decode_batch(bytes: &[u8]) -> Vec<NormalizedPost> {
    serde_json::from_slice(bytes).unwrap()
}
