//! Post ingestion: one bounded search request, then mapping raw submissions into
//! normalized records grouped by local calendar day.

use crate::date::{format_timestamp, DateKey};
use crate::error::FetchError;
use crate::models::{DateBatch, NormalizedPost, RawPost, SearchResponse};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use time::UtcOffset;

/// One search request: a subreddit, a fixed page size and optional epoch bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub subreddit: String,
    pub size: u32,
    pub before: Option<i64>,
    pub after: Option<i64>,
}

/// Read-only submission search. No retries; a failed request fails the run.
pub trait PostSource {
    fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPost>, FetchError>;
}

/// Blocking client for a Pushshift-style `/reddit/search/submission` endpoint.
pub struct PushshiftClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl PushshiftClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("rs-content/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("build HTTP client")?;
        Ok(Self { client, endpoint: endpoint.into() })
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        let url = self.endpoint.clone();
        let message = e.to_string();
        if e.is_timeout() {
            FetchError::Timeout { url, message }
        } else if e.is_connect() {
            FetchError::Connection { url, message }
        } else if let Some(status) = e.status() {
            FetchError::Http { status: status.as_u16(), url }
        } else if e.is_decode() {
            FetchError::Decode { url, message }
        } else {
            FetchError::Request { url, message }
        }
    }
}

impl PostSource for PushshiftClient {
    fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPost>, FetchError> {
        let mut params: Vec<(&str, String)> = vec![
            ("size", query.size.to_string()),
            ("subreddit", query.subreddit.clone()),
        ];
        if let Some(before) = query.before {
            params.push(("before", before.to_string()));
        }
        if let Some(after) = query.after {
            params.push(("after", after.to_string()));
        }

        let start = Instant::now();
        tracing::debug!(endpoint = %self.endpoint, ?params, "Search request");
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.classify(e))?;
        let body: SearchResponse = resp.json().map_err(|e| self.classify(e))?;

        tracing::info!(
            "Search completed - posts={}, duration={:.2}s",
            body.data.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(body.data)
    }
}

/// Map a raw submission to the stored record, rendering times at `offset`.
pub fn normalize_post(raw: &RawPost, offset: UtcOffset) -> Result<NormalizedPost> {
    Ok(NormalizedPost {
        title: raw.title.clone(),
        content: raw.selftext.clone(),
        subreddit: raw.subreddit.clone(),
        permalink: raw.permalink.clone(),
        url: raw.url.clone(),
        created_at_timestamp: format_timestamp(raw.created_utc, offset)?,
        created_at_date: DateKey::from_epoch(raw.created_utc, offset)?.to_string(),
    })
}

/// Normalize and group by local creation date. Batches come back in ascending date
/// order; posts inside a batch ascend by `created_utc` (ties keep fetch order).
pub fn group_by_date(raw: &[RawPost], offset: UtcOffset) -> Result<Vec<DateBatch>> {
    let mut keyed: Vec<(i64, DateKey, NormalizedPost)> = raw
        .iter()
        .map(|p| {
            let key = DateKey::from_epoch(p.created_utc, offset)?;
            let post = normalize_post(p, offset)
                .with_context(|| format!("normalize post {:?}", p.permalink))?;
            Ok((p.created_utc, key, post))
        })
        .collect::<Result<_>>()?;
    keyed.sort_by_key(|(ts, _, _)| *ts);

    let mut groups: BTreeMap<DateKey, Vec<NormalizedPost>> = BTreeMap::new();
    for (_, key, post) in keyed {
        groups.entry(key).or_default().push(post);
    }
    Ok(groups
        .into_iter()
        .map(|(date, posts)| DateBatch { date, posts })
        .collect())
}
