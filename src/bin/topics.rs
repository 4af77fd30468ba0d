use anyhow::{Context, Result};
use rs_content::{
    cluster_topics, init_tracing_with_file, load_corpus, local_offset_or_utc, open_store, CollectorOptions,
    CorpusOptions, DateKey, TextNormalizer, TopicOptions,
};
use time::OffsetDateTime;

/// Usage: rs-topics [clusters]
fn main() -> Result<()> {
    let resolved = local_offset_or_utc();
    let offset = resolved.offset;
    let opts = CollectorOptions::from_env().with_utc_offset(offset);
    let today = DateKey::from_date(OffsetDateTime::now_utc().to_offset(offset).date()).to_string();
    init_tracing_with_file(&opts.log_path(&today))?;
    resolved.log_fallback();

    let mut topic_opts = TopicOptions::default();
    if let Some(arg) = std::env::args().nth(1) {
        let k: usize = arg.parse().with_context(|| format!("cluster count must be a number, got {:?}", arg))?;
        topic_opts = topic_opts.with_clusters(k);
    }

    let store = open_store(&opts)?;
    let corpus = load_corpus(store.as_ref(), &CorpusOptions::default().with_prefix(opts.key_prefix.clone()))?;
    let cleaned = TextNormalizer::new()?.clean(&corpus);
    let report = cluster_topics(&cleaned, &topic_opts)?;

    tracing::info!("Topic report:\n{}", report);
    println!("{}", report);
    Ok(())
}
