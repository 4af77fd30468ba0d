use crate::alert::{send_failure_alert, AlertSink};
use crate::config::CollectorOptions;
use crate::date::{format_local, DateKey, FetchWindow};
use crate::error::IngestError;
use crate::ingest::{group_by_date, PostSource, SearchQuery};
use crate::models::DateBatch;
use crate::store::ObjectStore;
use crate::upload::{upload_if_not_smaller, write_batch_file, UploadOutcome};
use crate::util::init_tracing_once;
use std::path::PathBuf;
use time::{OffsetDateTime, UtcOffset};

/// One ingestion cycle: fetch, group by day, write batch files, guarded upload.
#[derive(Clone)]
pub struct Collector {
    pub(crate) opts: CollectorOptions,
    window: FetchWindow,
}

/// What a successful run produced. Individual uploads may still have failed.
#[derive(Debug)]
pub struct RunReport {
    pub fetched: usize,
    pub batches: Vec<BatchReport>,
}

#[derive(Debug)]
pub struct BatchReport {
    pub date: DateKey,
    pub posts: usize,
    pub path: PathBuf,
    pub outcome: UploadOutcome,
}

impl RunReport {
    pub fn failed_uploads(&self) -> usize {
        self.batches.iter().filter(|b| b.outcome.is_failure()).count()
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        Self { opts: CollectorOptions::default(), window: FetchWindow::LastDay }
    }

    pub fn with_options(opts: CollectorOptions) -> Self {
        Self { opts, window: FetchWindow::LastDay }
    }

    // -------- Builder methods --------
    pub fn subreddit(mut self, sub: impl AsRef<str>) -> Self { self.opts = self.opts.with_subreddit(sub); self }
    pub fn page_size(mut self, n: u32) -> Self { self.opts = self.opts.with_page_size(n); self }
    pub fn data_dir(mut self, dir: impl AsRef<std::path::Path>) -> Self { self.opts = self.opts.with_data_dir(dir); self }
    pub fn log_dir(mut self, dir: impl AsRef<std::path::Path>) -> Self { self.opts = self.opts.with_log_dir(dir); self }
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self { self.opts = self.opts.with_key_prefix(prefix); self }
    pub fn utc_offset(mut self, offset: UtcOffset) -> Self { self.opts = self.opts.with_utc_offset(offset); self }
    pub fn window(mut self, window: FetchWindow) -> Self { self.window = window; self }

    pub fn options(&self) -> &CollectorOptions {
        &self.opts
    }

    /// The request for this run, with bounds resolved against `now_utc`.
    pub fn search_query(&self, now_utc: i64) -> SearchQuery {
        let bounds = self.window.bounds(now_utc, self.opts.window_secs);
        SearchQuery {
            subreddit: self.opts.subreddit.clone(),
            size: self.opts.page_size,
            before: bounds.map(|(b, _)| b),
            after: bounds.map(|(_, a)| a),
        }
    }

    pub fn run_once(
        &self,
        source: &dyn PostSource,
        store: &dyn ObjectStore,
        alerts: &dyn AlertSink,
    ) -> Result<RunReport, IngestError> {
        self.run_once_at(OffsetDateTime::now_utc(), source, store, alerts)
    }

    /// Same as `run_once`, with an explicit clock.
    pub fn run_once_at(
        &self,
        now: OffsetDateTime,
        source: &dyn PostSource,
        store: &dyn ObjectStore,
        alerts: &dyn AlertSink,
    ) -> Result<RunReport, IngestError> {
        init_tracing_once();
        let local_now = now.to_offset(self.opts.utc_offset);
        let today = DateKey::from_date(local_now.date()).to_string();
        tracing::info!("---------------------- {} ----------------------------", today);
        if let Ok(at) = format_local(local_now) {
            tracing::info!("Running job at: {}", at);
        }
        tracing::info!("Attempting to fetch Reddit posts from {}", self.opts.endpoint);

        let query = self.search_query(now.unix_timestamp());
        let raw = match source.fetch(&query) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(
                    "{} Error occurred while fetching Reddit posts from {}. Error = {}",
                    e.kind(), self.opts.endpoint, e
                );
                let err = IngestError::from(e);
                if err.should_alert() {
                    let log_file = self.opts.log_path(&today);
                    tracing::info!("Sending alert email for {}", today);
                    // A failed alert must not hide the fetch failure.
                    if let Err(ae) = send_failure_alert(alerts, &log_file, &today) {
                        tracing::error!("Failed to send alert email: {:#}", ae);
                    }
                }
                return Err(err);
            }
        };

        if raw.is_empty() {
            tracing::warn!(
                "No reddit posts were found for r/{}. Nothing to process.",
                self.opts.subreddit
            );
            return Err(IngestError::EmptyResult { subreddit: self.opts.subreddit.clone() });
        }

        tracing::info!("Cleaning, sorting and grouping {} Reddit posts by created date.", raw.len());
        let batches = group_by_date(&raw, self.opts.utc_offset).map_err(IngestError::Normalize)?;
        let keys: Vec<String> = batches.iter().map(|b| self.opts.object_key(&b.date.to_string())).collect();
        tracing::info!("Writing posts to file(s): {:?}", keys);

        let mut reports = Vec::with_capacity(batches.len());
        for batch in batches {
            reports.push(self.write_and_upload(batch, store)?);
        }

        let report = RunReport { fetched: raw.len(), batches: reports };
        if report.failed_uploads() > 0 {
            tracing::warn!("{} of {} uploads failed", report.failed_uploads(), report.batches.len());
        }
        tracing::info!("Done.");
        Ok(report)
    }

    fn write_and_upload(&self, batch: DateBatch, store: &dyn ObjectStore) -> Result<BatchReport, IngestError> {
        let date_key = batch.date.to_string();
        let path = self.opts.batch_path(&date_key);
        let bytes = write_batch_file(&batch, &path)
            .map_err(|cause| IngestError::WriteBatch { path: path.clone(), cause })?;
        tracing::debug!(path = %path.display(), bytes, posts = batch.len(), "Batch written");

        let outcome = upload_if_not_smaller(store, &path, &self.opts.object_key(&date_key));
        Ok(BatchReport { date: batch.date, posts: batch.len(), path, outcome })
    }
}

/// Process status for a run: 0 on success, 1 on fetch failure or empty result.
/// Upload failures are reported per batch in `RunReport` and do not change the status.
pub fn exit_code(result: &Result<RunReport, IngestError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
