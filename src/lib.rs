mod config;
mod date;
mod error;
mod models;
mod util;
mod progress;

mod ingest;
mod store;
mod upload;
mod alert;
mod pipeline;

mod corpus;
mod normalize;
mod stopwords;
mod tfidf;
mod kmeans;
mod topics;

pub use crate::config::{AlertConfig, CollectorOptions, CorpusOptions, TopicOptions};
pub use crate::date::{format_timestamp, local_offset_or_utc, DateKey, FetchWindow, ResolvedOffset};
pub use crate::error::{ClusterError, FetchError, IngestError, UploadError};
pub use crate::models::{DateBatch, NormalizedPost, RawPost, SearchResponse};
pub use crate::pipeline::{exit_code, BatchReport, Collector, RunReport};

// Post ingestion and the search-source seam.
pub use crate::ingest::{group_by_date, normalize_post, PostSource, PushshiftClient, SearchQuery};

// Object storage seam and implementations.
pub use crate::store::{open_store, LocalDirStore, MemoryStore, ObjectInfo, ObjectStore, S3Store};

// Batch files and the non-destructive upload guard.
pub use crate::upload::{bytes_to_kb, should_upload, upload_if_not_smaller, write_batch_file, UploadOutcome};

// Failure alerts.
pub use crate::alert::{compose_alert_body, send_failure_alert, AlertSink, SmtpAlerter, ALERT_SUBJECT};

// Corpus reconstruction, cleaning and topic clustering.
pub use crate::corpus::{corpus_from_posts, load_corpus};
pub use crate::normalize::{TextNormalizer, BROKEN_IMAGE_MARKER};
pub use crate::tfidf::{SparseRow, TfidfMatrix, TfidfVectorizer, Vocabulary};
pub use crate::kmeans::{KMeans, KMeansFit};
pub use crate::topics::{cluster_topics, describe_clusters, ClusterResult, ClusterTerms, FitTiming, TopicReport};

// Logging setup for binaries.
pub use crate::util::{init_tracing_once, init_tracing_with_file};
