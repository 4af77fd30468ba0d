//! Corpus reconstruction: every stored batch, flattened into newline-delimited text.

use crate::config::CorpusOptions;
use crate::models::NormalizedPost;
use crate::progress::make_count_progress;
use crate::store::ObjectStore;
use anyhow::{Context, Result};

/// Append one post: its title always, its content only when non-empty and not an
/// omitted-content marker.
pub fn append_post(out: &mut String, post: &NormalizedPost, omitted: &[String]) {
    out.push_str(&post.title);
    out.push('\n');
    if !post.content.is_empty() && !omitted.iter().any(|m| m == &post.content) {
        out.push_str(&post.content);
        out.push('\n');
    }
}

/// Flatten posts into corpus text (titles and kept content, one per line group).
pub fn corpus_from_posts<'a>(posts: impl IntoIterator<Item = &'a NormalizedPost>, omitted: &[String]) -> String {
    let mut out = String::new();
    for p in posts {
        append_post(&mut out, p, omitted);
    }
    out
}

/// List the store (in listing order), decode each object as a JSON array of posts,
/// and concatenate their text. Objects that fail to fetch or decode are skipped
/// with a warning; a failed listing is an error.
pub fn load_corpus(store: &dyn ObjectStore, opts: &CorpusOptions) -> Result<String> {
    let objects = store
        .list_objects(opts.prefix.as_deref())
        .with_context(|| format!("list {}", store.location()))?;
    tracing::info!("Loading corpus from {} objects in {}", objects.len(), store.location());

    let pb = if opts.progress {
        Some(make_count_progress(objects.len() as u64, "Corpus: load objects"))
    } else {
        None
    };

    let mut data = String::new();
    let mut posts_seen = 0usize;
    for obj in &objects {
        let decoded = store
            .get_object(&obj.key)
            .and_then(|bytes| serde_json::from_slice::<Vec<NormalizedPost>>(&bytes).context("decode JSON batch"));
        match decoded {
            Ok(posts) => {
                posts_seen += posts.len();
                for p in &posts {
                    append_post(&mut data, p, &opts.omitted_content);
                }
            }
            Err(e) => tracing::warn!(key = %obj.key, "Skipping object: {:#}", e),
        }
        if let Some(pb) = &pb { pb.inc(1); }
    }

    if let Some(pb) = pb { pb.finish_with_message("Corpus: loaded"); }
    tracing::info!("Corpus built from {} posts ({} bytes)", posts_seen, data.len());
    Ok(data)
}
