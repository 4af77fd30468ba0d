#[path = "common/mod.rs"]
mod common;

use common::*;
use rs_content::{
    should_upload, upload_if_not_smaller, write_batch_file, DateBatch, DateKey, LocalDirStore, MemoryStore,
    ObjectStore, UploadError, UploadOutcome,
};
use std::fs;

#[test]
fn compares_sizes_in_kb() {
    assert!(should_upload(0, 0));
    assert!(should_upload(2048, 0));
    assert!(should_upload(2048, 2048));
    assert!(!should_upload(1024, 2048));
}

/// A partial batch must never replace a larger stored object.
#[test]
fn smaller_local_batch_is_skipped() {
    let dir = scratch_dir();
    let path = dir.join("small.json");
    fs::write(&path, vec![b'x'; 1024]).unwrap();

    let store = MemoryStore::new();
    store.insert("osrs_reddit_2021-03-01.json", vec![b'y'; 4096]);

    match upload_if_not_smaller(&store, &path, "osrs_reddit_2021-03-01.json") {
        UploadOutcome::Skipped { local_kb, remote_kb, .. } => {
            assert_eq!(local_kb, 1.0);
            assert_eq!(remote_kb, 4.0);
        }
        other => panic!("expected skip, got {:?}", other),
    }
    // stored object untouched
    assert_eq!(store.get("osrs_reddit_2021-03-01.json").unwrap().len(), 4096);
}

#[test]
fn larger_or_new_batch_is_uploaded() {
    let dir = scratch_dir();
    let path = dir.join("big.json");
    fs::write(&path, vec![b'x'; 3000]).unwrap();

    let store = MemoryStore::new();
    store.insert("day-a.json", vec![b'y'; 1000]);

    assert!(upload_if_not_smaller(&store, &path, "day-a.json").is_uploaded());
    assert!(upload_if_not_smaller(&store, &path, "day-b.json").is_uploaded());
    assert_eq!(store.get("day-a.json").unwrap().len(), 3000);
    assert_eq!(store.get("day-b.json").unwrap().len(), 3000);
}

/// The size lookup matches the key exactly, not every key sharing its prefix.
#[test]
fn size_lookup_is_exact_key() {
    let store = MemoryStore::new();
    store.insert("osrs_reddit_2021-03-01.json.bak", vec![0u8; 9000]);
    assert_eq!(store.object_size("osrs_reddit_2021-03-01.json").unwrap(), 0);
}

#[test]
fn missing_local_file_is_a_failure() {
    let store = MemoryStore::new();
    let outcome = upload_if_not_smaller(&store, &scratch_dir().join("nope.json"), "k.json");
    assert!(outcome.is_failure());
    assert!(store.is_empty());
}

/// An unknown remote size is never treated as "absent".
#[test]
fn failed_size_lookup_leaves_stored_object_alone() {
    let dir = scratch_dir();
    let path = dir.join("big.json");
    fs::write(&path, vec![b'x'; 8192]).unwrap();

    let store = FailingStore { fail_size: true, ..Default::default() };
    store.inner.insert("osrs_reddit_2021-03-01.json", vec![b'y'; 4096]);

    match upload_if_not_smaller(&store, &path, "osrs_reddit_2021-03-01.json") {
        UploadOutcome::Failed(UploadError::SizeCheck { key, .. }) => assert_eq!(key, "osrs_reddit_2021-03-01.json"),
        other => panic!("expected size check failure, got {:?}", other),
    }
    assert_eq!(store.inner.get("osrs_reddit_2021-03-01.json").unwrap(), vec![b'y'; 4096]);
}

#[test]
fn batch_file_round_trips_through_local_store() {
    let dir = scratch_dir();
    let batch = DateBatch {
        date: DateKey::new(2021, 3, 1),
        posts: vec![stored_post("Zulrah", "drops"), stored_post("Vorkath", "")],
    };
    let path = dir.join("data").join("osrs_reddit_2021-03-01.json");
    let bytes = write_batch_file(&batch, &path).unwrap();
    assert_eq!(bytes, fs::metadata(&path).unwrap().len());
    assert!(!dir.join("data").join("osrs_reddit_2021-03-01.json.inprogress").exists());

    let store = LocalDirStore::new(dir.join("bucket")).unwrap();
    assert!(upload_if_not_smaller(&store, &path, "osrs_reddit_2021-03-01.json").is_uploaded());

    let listed = store.list_objects(Some("osrs_reddit_")).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].size, bytes);
    assert_eq!(decode_batch(&store.get_object("osrs_reddit_2021-03-01.json").unwrap()), batch.posts);
}
