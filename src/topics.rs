//! Exploratory topic report: vectorize cleaned corpus lines, fit KMeans for each
//! seed, time repeated fits, and list the heaviest terms of the largest clusters.
//! Results are returned to the caller; nothing is kept between calls.

use crate::config::TopicOptions;
use crate::kmeans::{KMeans, KMeansFit};
use crate::progress::make_count_progress;
use crate::tfidf::{TfidfMatrix, TfidfVectorizer, Vocabulary};
use anyhow::Result;
use std::fmt;
use std::time::Instant;

/// Fit time over repeated fits (population std, as numpy computes it).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitTiming {
    pub mean_secs: f64,
    pub std_secs: f64,
    pub runs: usize,
}

impl FitTiming {
    pub fn from_samples(samples: &[f64]) -> Self {
        let runs = samples.len();
        if runs == 0 {
            return Self { mean_secs: 0.0, std_secs: 0.0, runs };
        }
        let mean = samples.iter().sum::<f64>() / runs as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / runs as f64;
        Self { mean_secs: mean, std_secs: var.sqrt(), runs }
    }
}

#[derive(Clone, Debug)]
pub struct ClusterTerms {
    pub cluster: usize,
    pub size: usize,
    pub terms: Vec<String>,
}

/// One seed's fit.
#[derive(Clone, Debug)]
pub struct ClusterResult {
    pub k: usize,
    pub seed: u64,
    pub labels: Vec<usize>,
    pub sizes: Vec<usize>,
    pub inertia: f64,
    pub n_iter: usize,
    pub top_terms: Vec<ClusterTerms>,
    pub timing: FitTiming,
}

#[derive(Clone, Debug)]
pub struct TopicReport {
    pub n_samples: usize,
    pub n_features: usize,
    pub sparsity: f64,
    pub vectorize_secs: f64,
    pub runs: Vec<ClusterResult>,
}

/// Heaviest `n` terms of a centroid, descending; zero weights are skipped.
pub fn top_terms_for_centroid(centroid: &[f64], vocab: &Vocabulary, n: usize) -> Vec<String> {
    let mut order: Vec<usize> = (0..centroid.len()).filter(|&i| centroid[i] > 0.0).collect();
    order.sort_by(|&a, &b| centroid[b].total_cmp(&centroid[a]).then(a.cmp(&b)));
    order.into_iter().take(n).map(|i| vocab.terms[i].clone()).collect()
}

/// Top terms for the `top_clusters` largest clusters (ties by cluster id).
pub fn describe_clusters(fit: &KMeansFit, vocab: &Vocabulary, top_clusters: usize, top_terms: usize) -> Vec<ClusterTerms> {
    let sizes = fit.cluster_sizes();
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| sizes[b].cmp(&sizes[a]).then(a.cmp(&b)));
    order
        .into_iter()
        .take(top_clusters)
        .map(|c| ClusterTerms {
            cluster: c,
            size: sizes[c],
            terms: top_terms_for_centroid(&fit.centroids[c], vocab, top_terms),
        })
        .collect()
}

/// Fit `opts.timing_runs` times with one seed; the last fit is kept.
fn fit_seed(x: &TfidfMatrix, vocab: &Vocabulary, seed: u64, opts: &TopicOptions) -> Result<ClusterResult> {
    let km = KMeans {
        k: opts.clusters,
        max_iter: opts.max_iter,
        n_init: opts.n_init,
        tol: opts.tolerance,
        seed,
    };
    let mut samples = Vec::with_capacity(opts.timing_runs);
    let mut last = None;
    for _ in 0..opts.timing_runs.max(1) {
        let t0 = Instant::now();
        let fit = km.fit(x)?;
        samples.push(t0.elapsed().as_secs_f64());
        last = Some(fit);
    }
    let fit = last.ok_or_else(|| anyhow::anyhow!("no fit produced for seed {}", seed))?;
    let timing = FitTiming::from_samples(&samples);
    let sizes = fit.cluster_sizes();
    tracing::info!(
        "seed {}: clustering done in {:.2} ± {:.2} s - elements per cluster: {:?}",
        seed, timing.mean_secs, timing.std_secs, sizes
    );
    Ok(ClusterResult {
        k: opts.clusters,
        seed,
        top_terms: describe_clusters(&fit, vocab, opts.top_clusters, opts.top_terms),
        sizes,
        inertia: fit.inertia,
        n_iter: fit.n_iter,
        labels: fit.labels,
        timing,
    })
}

/// Cleaned corpus in, report out. Each non-empty line is one document.
pub fn cluster_topics(cleaned: &str, opts: &TopicOptions) -> Result<TopicReport> {
    let docs: Vec<&str> = cleaned.lines().filter(|l| !l.trim().is_empty()).collect();
    let vectorizer = TfidfVectorizer::new(opts.min_df, opts.max_df, &opts.extra_stop_words)?;
    let t0 = Instant::now();
    let (x, vocab) = vectorizer.fit_transform(&docs)?;
    let vectorize_secs = t0.elapsed().as_secs_f64();

    let pb = if opts.progress {
        Some(make_count_progress(opts.seeds, "KMeans seeds"))
    } else {
        None
    };
    let mut runs = Vec::with_capacity(opts.seeds as usize);
    for seed in 0..opts.seeds {
        runs.push(fit_seed(&x, &vocab, seed, opts)?);
        if let Some(pb) = &pb { pb.inc(1); }
    }
    if let Some(pb) = pb { pb.finish_with_message("KMeans done"); }

    Ok(TopicReport {
        n_samples: x.n_samples(),
        n_features: x.n_features,
        sparsity: x.sparsity(),
        vectorize_secs,
        runs,
    })
}

impl fmt::Display for TopicReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "n_samples: {}, n_features: {}, sparsity: {:.3}, vectorized in {:.3} s",
            self.n_samples, self.n_features, self.sparsity, self.vectorize_secs
        )?;
        for run in &self.runs {
            writeln!(
                f,
                "seed {} (k={}): {:.2} ± {:.2} s over {} fits, inertia {:.3}, sizes {:?}",
                run.seed, run.k, run.timing.mean_secs, run.timing.std_secs, run.timing.runs, run.inertia, run.sizes
            )?;
            for c in &run.top_terms {
                writeln!(f, "  Cluster {} ({} docs): {}", c.cluster, c.size, c.terms.join(" "))?;
            }
        }
        Ok(())
    }
}
