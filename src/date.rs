use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, UtcOffset};

/// Simple "YYYY-MM-DD" calendar day used to group and name batches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    pub year: i32,
    pub month: u8, // 1..=12
    pub day: u8,   // 1..=31
}

impl DateKey {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        assert!((1..=12).contains(&month), "Month must be 1..=12");
        assert!((1..=31).contains(&day), "Day must be 1..=31");
        Self { year, month, day }
    }

    pub fn from_date(d: Date) -> Self {
        Self { year: d.year(), month: d.month() as u8, day: d.day() }
    }

    /// Calendar day of `ts` (UTC epoch seconds) as seen at `offset`.
    pub fn from_epoch(ts: i64, offset: UtcOffset) -> Result<Self> {
        Ok(Self::from_date(local_datetime(ts, offset)?.date()))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for DateKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.split('-').collect();
        if parts.len() != 3 {
            return Err("expected YYYY-MM-DD".into());
        }
        let year: i32 = parts[0].parse().map_err(|_| "invalid year")?;
        let month: u8 = parts[1].parse().map_err(|_| "invalid month")?;
        let day: u8 = parts[2].parse().map_err(|_| "invalid day")?;
        let m = Month::try_from(month).map_err(|_| "month must be 01..12")?;
        Date::from_calendar_date(year, m, day).map_err(|_| "day out of range for month")?;
        Ok(Self { year, month, day })
    }
}

/// Time window for one search request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchWindow {
    /// `before = now`, `after = now - window_secs`.
    LastDay,
    /// Explicit UTC epoch-second bounds.
    Between { before: i64, after: i64 },
    /// No bounds; the source returns its latest page.
    Unbounded,
}

impl FetchWindow {
    /// Resolve to `(before, after)` epoch seconds, or None when unbounded.
    pub fn bounds(self, now_utc: i64, window_secs: i64) -> Option<(i64, i64)> {
        match self {
            FetchWindow::LastDay => Some((now_utc, now_utc - window_secs)),
            FetchWindow::Between { before, after } => Some((before, after)),
            FetchWindow::Unbounded => None,
        }
    }
}

pub fn local_datetime(ts: i64, offset: UtcOffset) -> Result<OffsetDateTime> {
    let dt = OffsetDateTime::from_unix_timestamp(ts)
        .with_context(|| format!("epoch seconds out of range: {}", ts))?;
    Ok(dt.to_offset(offset))
}

/// `YYYY-MM-DD hh:MM AM/PM` at `offset`.
pub fn format_timestamp(ts: i64, offset: UtcOffset) -> Result<String> {
    format_local(local_datetime(ts, offset)?)
}

pub fn format_local(dt: OffsetDateTime) -> Result<String> {
    dt.format(format_description!("[year]-[month]-[day] [hour repr:12]:[minute] [period]"))
        .context("format timestamp")
}

/// Local UTC offset as looked up at startup. `fallback` carries the lookup
/// error when UTC was substituted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedOffset {
    pub offset: UtcOffset,
    pub fallback: Option<String>,
}

impl ResolvedOffset {
    pub fn from_lookup<E: fmt::Display>(lookup: Result<UtcOffset, E>) -> Self {
        match lookup {
            Ok(offset) => Self { offset, fallback: None },
            Err(e) => Self { offset: UtcOffset::UTC, fallback: Some(e.to_string()) },
        }
    }

    /// Report a UTC fallback. Call once the tracing subscriber is installed.
    pub fn log_fallback(&self) {
        if let Some(reason) = &self.fallback {
            tracing::warn!("Could not determine local UTC offset ({}); using UTC.", reason);
        }
    }
}

/// Process-local UTC offset. Must be resolved before any threads are spawned;
/// falls back to UTC when the platform can't tell.
pub fn local_offset_or_utc() -> ResolvedOffset {
    ResolvedOffset::from_lookup(UtcOffset::current_local_offset())
}
