use crate::date::DateKey;
use serde::{Deserialize, Deserializer, Serialize};

/// Search endpoint envelope: `{"data": [...]}`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<RawPost>,
}

/// Submission as returned by the search endpoint. Extra fields are ignored by serde.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawPost {
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub subreddit: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub url: String,
    #[serde(deserialize_with = "epoch_seconds")]
    pub created_utc: i64,
}

/// One stored post. Field order is the on-disk JSON order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPost {
    pub title: String,
    pub content: String,
    pub subreddit: String,
    pub permalink: String,
    pub url: String,
    pub created_at_timestamp: String,
    pub created_at_date: String,
}

/// Posts sharing one local calendar day, ascending by creation time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateBatch {
    pub date: DateKey,
    pub posts: Vec<NormalizedPost>,
}

impl DateBatch {
    pub fn len(&self) -> usize {
        self.posts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

// Some dumps carry `created_utc` as a float.
fn epoch_seconds<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let n = serde_json::Number::deserialize(d)?;
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    n.as_f64()
        .map(|f| f as i64)
        .ok_or_else(|| serde::de::Error::custom("created_utc is not a number"))
}
