#[path = "common/mod.rs"]
mod common;

use common::*;
use rs_content::{corpus_from_posts, load_corpus, CorpusOptions, MemoryStore};

fn batch_json(posts: &[rs_content::NormalizedPost]) -> Vec<u8> {
    serde_json::to_vec(posts).unwrap()
}

/// Removed/deleted content is left out, but the title still makes it in.
#[test]
fn omitted_content_keeps_title() {
    let posts = vec![
        stored_post("Removed post", "[removed]"),
        stored_post("Deleted post", "[deleted]"),
        stored_post("Link post", ""),
        stored_post("Text post", "some body"),
    ];
    let opts = CorpusOptions::default();
    let text = corpus_from_posts(&posts, &opts.omitted_content);
    assert_eq!(text, "Removed post\nDeleted post\nLink post\nText post\nsome body\n");
}

#[test]
fn loads_objects_in_listing_order_and_skips_bad_ones() {
    let store = MemoryStore::new();
    store.insert("osrs_reddit_2021-03-02.json", batch_json(&[stored_post("second", "")]));
    store.insert("osrs_reddit_2021-03-01.json", batch_json(&[stored_post("first", "body")]));
    store.insert("osrs_reddit_2021-03-03.json", b"not json".to_vec());
    store.insert("other_2021-03-01.json", batch_json(&[stored_post("elsewhere", "")]));

    let opts = CorpusOptions::default().with_prefix("osrs_reddit_").with_progress(false);
    let text = load_corpus(&store, &opts).unwrap();
    assert_eq!(text, "first\nbody\nsecond\n");
}

#[test]
fn custom_markers_replace_defaults() {
    let store = MemoryStore::new();
    store.insert("a.json", batch_json(&[stored_post("t", "[removed]"), stored_post("u", "n/a")]));
    let opts = CorpusOptions::default().with_omitted_content(["n/a"]).with_progress(false);
    assert_eq!(load_corpus(&store, &opts).unwrap(), "t\n[removed]\nu\n");
}
