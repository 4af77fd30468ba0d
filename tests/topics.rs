#[path = "common/mod.rs"]
mod common;

use rs_content::{cluster_topics, ClusterError, KMeans, TfidfVectorizer, TopicOptions};

/// Two clearly separated themes, repeated so both survive min_df pruning.
fn two_topic_corpus() -> String {
    let mut lines = Vec::new();
    for i in 0..12 {
        lines.push(format!("zulrah venom scales rotation kill {}", i));
        lines.push(format!("farming herb patch seeds compost {}", i));
    }
    lines.join("\n")
}

#[test]
fn tfidf_rows_are_normalized_and_vocabulary_sorted() {
    let v = TfidfVectorizer::new(2, 0.9, &["kill".to_string()]).unwrap();
    let corpus = two_topic_corpus();
    let docs: Vec<&str> = corpus.lines().collect();
    let (x, vocab) = v.fit_transform(&docs).unwrap();

    assert_eq!(x.n_samples(), 24);
    assert!(vocab.terms.windows(2).all(|w| w[0] < w[1]));
    // built-in and extra stop words are both pruned
    assert!(vocab.index_of("the").is_none());
    assert!(vocab.index_of("kill").is_none());
    assert!(vocab.index_of("zulrah").is_some());
    for row in &x.rows {
        assert!((row.squared_norm() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn tfidf_rejects_bad_input() {
    let v = TfidfVectorizer::new(5, 0.5, &[]).unwrap();
    let err = v.fit_transform(&[]).unwrap_err();
    assert!(matches!(err.downcast_ref::<ClusterError>(), Some(ClusterError::EmptyCorpus)));

    let err = v.fit_transform(&["only one doc here"]).unwrap_err();
    assert!(matches!(err.downcast_ref::<ClusterError>(), Some(ClusterError::InvalidBounds { .. })));

    let v = TfidfVectorizer::new(1, 1.0, &[]).unwrap();
    let err = v.fit_transform(&["the and of", "a an the"]).unwrap_err();
    assert!(matches!(err.downcast_ref::<ClusterError>(), Some(ClusterError::NoTermsRemain)));
}

#[test]
fn kmeans_separates_two_themes() {
    let corpus = two_topic_corpus();
    let docs: Vec<&str> = corpus.lines().collect();
    let (x, _) = TfidfVectorizer::new(2, 0.9, &[]).unwrap().fit_transform(&docs).unwrap();

    let fit = KMeans::new(2, 0).fit(&x).unwrap();
    let mut sizes = fit.cluster_sizes();
    sizes.sort();
    assert_eq!(sizes, vec![12, 12]);
    // alternating lines belong to alternating themes
    for pair in fit.labels.chunks(2) {
        assert_ne!(pair[0], pair[1]);
    }

    // same seed, same answer
    let again = KMeans::new(2, 0).fit(&x).unwrap();
    assert_eq!(fit.labels, again.labels);
}

#[test]
fn kmeans_needs_enough_documents() {
    let (x, _) = TfidfVectorizer::new(1, 1.0, &[]).unwrap().fit_transform(&["zulrah scales", "herb seeds"]).unwrap();
    let err = KMeans::new(3, 0).fit(&x).unwrap_err();
    assert!(matches!(err.downcast_ref::<ClusterError>(), Some(ClusterError::TooFewDocuments { docs: 2, k: 3 })));
}

#[test]
fn topic_report_covers_every_seed() {
    let opts = TopicOptions::default()
        .with_clusters(2)
        .with_seeds(3)
        .with_timing_runs(2)
        .with_df_bounds(2, 0.9)
        .with_top_clusters(2)
        .with_top_terms(3)
        .with_progress(false);
    let report = cluster_topics(&two_topic_corpus(), &opts).unwrap();

    assert_eq!(report.n_samples, 24);
    assert_eq!(report.runs.len(), 3);
    for (seed, run) in report.runs.iter().enumerate() {
        assert_eq!(run.seed, seed as u64);
        assert_eq!(run.timing.runs, 2);
        assert_eq!(run.labels.len(), 24);
        assert_eq!(run.top_terms.len(), 2);
        assert!(run.top_terms.iter().all(|c| c.size == 12 && c.terms.len() == 3));
    }
    assert!(report.to_string().contains("Cluster"));
}
