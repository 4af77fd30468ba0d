#[path = "common/mod.rs"]
mod common;

use common::*;
use rs_content::{format_timestamp, CollectorOptions, DateKey, ResolvedOffset};
use time::UtcOffset;

#[test]
fn date_key_parses_and_validates() {
    let d: DateKey = "2021-03-01".parse().unwrap();
    assert_eq!(d, DateKey::new(2021, 3, 1));
    assert_eq!(d.to_string(), "2021-03-01");
    assert!("2021-02-30".parse::<DateKey>().is_err());
    assert!("2021-13-01".parse::<DateKey>().is_err());
    assert!("20210301".parse::<DateKey>().is_err());
}

#[test]
fn timestamps_follow_the_offset() {
    let ts = MAR_1_2021 + 2 * HOUR + 30 * 60;
    assert_eq!(format_timestamp(ts, UtcOffset::UTC).unwrap(), "2021-03-01 02:30 AM");

    // five hours west of UTC the post belongs to the previous evening
    let est = UtcOffset::from_hms(-5, 0, 0).unwrap();
    assert_eq!(format_timestamp(ts, est).unwrap(), "2021-02-28 09:30 PM");
    assert_eq!(DateKey::from_epoch(ts, est).unwrap().to_string(), "2021-02-28");
}

#[test]
fn object_keys_and_paths() {
    let opts = CollectorOptions::default().with_data_dir("out").with_log_dir("logs").with_subreddit("r/2007Scape");
    assert_eq!(opts.subreddit, "2007scape");
    assert_eq!(opts.object_key("2021-03-01"), "osrs_reddit_2021-03-01.json");
    assert_eq!(opts.log_path("2021-03-01"), std::path::Path::new("logs").join("osrs_log_2021-03-01.log"));
    assert_eq!(
        opts.batch_path("2021-03-01").file_name().unwrap().to_str().unwrap(),
        "osrs_reddit_2021-03-01.json"
    );
}

#[test]
fn offset_lookup_failure_falls_back_to_utc() {
    let ok = ResolvedOffset::from_lookup::<String>(Ok(UtcOffset::from_hms(-5, 0, 0).unwrap()));
    assert_eq!(ok.offset.whole_hours(), -5);
    assert_eq!(ok.fallback, None);

    let failed = ResolvedOffset::from_lookup(Err("indeterminate"));
    assert_eq!(failed.offset, UtcOffset::UTC);
    assert_eq!(failed.fallback.as_deref(), Some("indeterminate"));
}
