use std::path::{Path, PathBuf};
use time::UtcOffset;

pub const DEFAULT_ENDPOINT: &str = "https://api.pushshift.io/reddit/search/submission";
pub const DEFAULT_BUCKET: &str = "runescape-content-prod";
pub const DEFAULT_MAIL_ADDRESS: &str = "test@mailtrap.io";

/// Ingestion options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct CollectorOptions {
    pub subreddit: String,            // normalized lowercase, no "r/"
    pub endpoint: String,
    pub page_size: u32,
    pub window_secs: i64,             // length of the "last day" fetch window
    pub data_dir: PathBuf,            // one JSON file per date key
    pub log_dir: PathBuf,             // one log file per calendar day
    pub bucket: String,
    pub region: String,
    pub key_prefix: String,           // object key = <prefix><date>.json
    pub utc_offset: UtcOffset,        // offset used for timestamps and date keys
    pub store_dir: Option<PathBuf>,   // Some(dir) replaces the bucket with a local directory
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            subreddit: "2007scape".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: 500,
            // Slightly under 24h, so back-to-back daily runs don't overlap.
            window_secs: 86_200,
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            bucket: DEFAULT_BUCKET.to_string(),
            region: "us-east-1".to_string(),
            key_prefix: "osrs_reddit_".to_string(),
            utc_offset: UtcOffset::UTC,
            store_dir: None,
        }
    }
}

impl CollectorOptions {
    /// Defaults overlaid with `RS_CONTENT_*` / `AWS_REGION` environment variables.
    pub fn from_env() -> Self {
        let mut o = Self::default();
        if let Some(s) = env_nonempty("RS_CONTENT_SUBREDDIT") {
            o = o.with_subreddit(s);
        }
        if let Some(b) = env_nonempty("RS_CONTENT_BUCKET") {
            o.bucket = b;
        }
        if let Some(r) = env_nonempty("AWS_REGION") {
            o.region = r;
        }
        if let Some(d) = env_nonempty("RS_CONTENT_DATA_DIR") {
            o.data_dir = PathBuf::from(d);
        }
        if let Some(d) = env_nonempty("RS_CONTENT_LOG_DIR") {
            o.log_dir = PathBuf::from(d);
        }
        if let Some(d) = env_nonempty("RS_CONTENT_STORE_DIR") {
            o.store_dir = Some(PathBuf::from(d));
        }
        o
    }

    pub fn with_subreddit(mut self, sub: impl AsRef<str>) -> Self {
        let mut s = sub.as_ref().trim().to_lowercase();
        if let Some(rest) = s.strip_prefix("r/") {
            s = rest.to_string();
        }
        self.subreddit = s;
        self
    }
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }
    pub fn with_page_size(mut self, n: u32) -> Self {
        self.page_size = n.max(1);
        self
    }
    pub fn with_window_secs(mut self, secs: i64) -> Self {
        self.window_secs = secs.max(1);
        self
    }
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_log_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
    pub fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }
    pub fn with_store_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.store_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Object key for a date key, e.g. `osrs_reddit_2023-01-05.json`.
    pub fn object_key(&self, date_key: &str) -> String {
        format!("{}{}.json", self.key_prefix, date_key)
    }

    /// Local batch path for a date key.
    pub fn batch_path(&self, date_key: &str) -> PathBuf {
        self.data_dir.join(self.object_key(date_key))
    }

    /// Daily log file the alert path reads back.
    pub fn log_path(&self, date_key: &str) -> PathBuf {
        self.log_dir.join(format!("osrs_log_{}.log", date_key))
    }
}

/// SMTP settings for failure alerts.
#[derive(Clone, Debug)]
pub struct AlertConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub receiver: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.mailtrap.io".to_string(),
            smtp_port: 25,
            sender: DEFAULT_MAIL_ADDRESS.to_string(),
            receiver: DEFAULT_MAIL_ADDRESS.to_string(),
            username: None,
            password: None,
        }
    }
}

impl AlertConfig {
    /// Defaults overlaid with the mail environment variables.
    /// Credentials are only used when both are present.
    pub fn from_env() -> Self {
        let mut c = Self::default();
        if let Some(s) = env_nonempty("LOGGING_EMAIL_SENDER") {
            c.sender = s;
        }
        if let Some(r) = env_nonempty("LOGGING_EMAIL_RECEIVER") {
            c.receiver = r;
        }
        if let Some(h) = env_nonempty("SMTP_HOST") {
            c.smtp_host = h;
        }
        if let Some(p) = env_nonempty("SMTP_PORT") {
            match p.parse() {
                Ok(port) => c.smtp_port = port,
                Err(_) => tracing::warn!("SMTP_PORT is set but not a valid port: {}", p),
            }
        }
        c.username = env_nonempty("EMAIL_USERNAME");
        c.password = env_nonempty("EMAIL_PASSWORD");
        c
    }

    pub fn with_sender(mut self, addr: impl Into<String>) -> Self {
        self.sender = addr.into();
        self
    }
    pub fn with_receiver(mut self, addr: impl Into<String>) -> Self {
        self.receiver = addr.into();
        self
    }
    pub fn with_smtp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.smtp_host = host.into();
        self.smtp_port = port;
        self
    }
    pub fn with_credentials(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.username = Some(user.into());
        self.password = Some(pass.into());
        self
    }
}

/// Corpus reconstruction options.
#[derive(Clone, Debug)]
pub struct CorpusOptions {
    /// Post content equal to any of these is left out of the corpus (titles are kept).
    pub omitted_content: Vec<String>,
    pub prefix: Option<String>,
    pub progress: bool,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            omitted_content: vec!["[removed]".to_string(), "[deleted]".to_string()],
            prefix: None,
            progress: true,
        }
    }
}

impl CorpusOptions {
    pub fn with_omitted_content<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omitted_content = markers.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
}

/// TF-IDF + KMeans options.
#[derive(Clone, Debug)]
pub struct TopicOptions {
    pub clusters: usize,
    pub seeds: u64,                   // seeds 0..seeds are each fitted independently
    pub max_iter: usize,
    pub n_init: usize,                // restarts per fit; lowest inertia wins
    pub tolerance: f64,
    pub timing_runs: usize,           // repeated fits per seed for mean/std fit time
    pub max_df: f64,                  // proportion of documents
    pub min_df: usize,                // absolute document count
    pub extra_stop_words: Vec<String>,
    pub top_terms: usize,
    pub top_clusters: usize,
    pub progress: bool,
}

impl Default for TopicOptions {
    fn default() -> Self {
        Self {
            clusters: 8,
            seeds: 5,
            max_iter: 100,
            n_init: 5,
            tolerance: 1e-4,
            timing_runs: 5,
            max_df: 0.5,
            min_df: 5,
            extra_stop_words: Vec::new(),
            top_terms: 10,
            top_clusters: 5,
            progress: true,
        }
    }
}

impl TopicOptions {
    pub fn with_clusters(mut self, k: usize) -> Self {
        self.clusters = k.max(1);
        self
    }
    pub fn with_seeds(mut self, n: u64) -> Self {
        self.seeds = n.max(1);
        self
    }
    pub fn with_max_iter(mut self, n: usize) -> Self {
        self.max_iter = n.max(1);
        self
    }
    pub fn with_n_init(mut self, n: usize) -> Self {
        self.n_init = n.max(1);
        self
    }
    pub fn with_timing_runs(mut self, n: usize) -> Self {
        self.timing_runs = n.max(1);
        self
    }
    pub fn with_df_bounds(mut self, min_df: usize, max_df: f64) -> Self {
        self.min_df = min_df;
        self.max_df = max_df;
        self
    }
    pub fn with_extra_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_stop_words = words.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_top_terms(mut self, n: usize) -> Self {
        self.top_terms = n;
        self
    }
    pub fn with_top_clusters(mut self, n: usize) -> Self {
        self.top_clusters = n;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
