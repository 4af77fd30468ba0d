//! KMeans over sparse TF-IDF rows: greedy k-means++ seeding, Lloyd iterations,
//! several restarts per fit keeping the lowest inertia.

use crate::error::ClusterError;
use crate::tfidf::{SparseRow, TfidfMatrix};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Clone, Debug)]
pub struct KMeans {
    pub k: usize,
    pub max_iter: usize,
    pub n_init: usize,
    pub tol: f64,
    pub seed: u64,
}

#[derive(Clone, Debug)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
    pub n_iter: usize,
}

impl KMeansFit {
    /// Points per cluster, indexed by cluster id.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.centroids.len()];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }
}

impl KMeans {
    pub fn new(k: usize, seed: u64) -> Self {
        Self { k, max_iter: 100, n_init: 5, tol: 1e-4, seed }
    }

    pub fn fit(&self, x: &TfidfMatrix) -> Result<KMeansFit> {
        let n = x.n_samples();
        if n == 0 {
            return Err(ClusterError::EmptyCorpus.into());
        }
        if n < self.k || self.k == 0 {
            return Err(ClusterError::TooFewDocuments { docs: n, k: self.k }.into());
        }

        let tol = self.tol * mean_feature_variance(x);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;
        for _ in 0..self.n_init.max(1) {
            let init = kmeans_plus_plus(x, self.k, &mut rng);
            let fit = self.lloyd(x, init, tol);
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }
        best.ok_or_else(|| ClusterError::EmptyCorpus.into())
    }

    fn lloyd(&self, x: &TfidfMatrix, mut centroids: Vec<Vec<f64>>, tol: f64) -> KMeansFit {
        let mut labels: Vec<usize> = Vec::new();
        let mut n_iter = 0;
        for it in 0..self.max_iter {
            n_iter = it + 1;
            let (new_labels, dists) = assign(x, &centroids);
            let unchanged = new_labels == labels;
            labels = new_labels;
            if unchanged {
                break;
            }
            let next = update_centroids(x, &labels, &dists, self.k);
            let shift: f64 = centroids.iter().zip(&next).map(|(a, b)| squared_distance(a, b)).sum();
            centroids = next;
            if shift <= tol {
                break;
            }
        }
        let (labels, dists) = assign(x, &centroids);
        KMeansFit { labels, centroids, inertia: dists.iter().sum(), n_iter }
    }
}

/// Mean per-feature variance; scales the convergence tolerance to the data.
fn mean_feature_variance(x: &TfidfMatrix) -> f64 {
    let (n, m) = (x.n_samples() as f64, x.n_features);
    if m == 0 || n == 0.0 {
        return 0.0;
    }
    let mut sum = vec![0.0; m];
    let mut sum_sq = vec![0.0; m];
    for row in &x.rows {
        for (&i, &v) in row.indices.iter().zip(&row.values) {
            sum[i] += v;
            sum_sq[i] += v * v;
        }
    }
    let total: f64 = sum.iter().zip(&sum_sq).map(|(s, sq)| sq / n - (s / n).powi(2)).sum();
    total / m as f64
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn to_dense(row: &SparseRow, n_features: usize) -> Vec<f64> {
    let mut d = vec![0.0; n_features];
    for (&i, &v) in row.indices.iter().zip(&row.values) {
        d[i] = v;
    }
    d
}

#[inline]
fn row_distance(row: &SparseRow, row_norm: f64, centroid: &[f64], centroid_norm: f64) -> f64 {
    (row_norm - 2.0 * row.dot_dense(centroid) + centroid_norm).max(0.0)
}

/// Nearest centroid and squared distance for every row.
fn assign(x: &TfidfMatrix, centroids: &[Vec<f64>]) -> (Vec<usize>, Vec<f64>) {
    let c_norms: Vec<f64> = centroids.iter().map(|c| c.iter().map(|v| v * v).sum()).collect();
    x.rows
        .par_iter()
        .map(|row| {
            let xn = row.squared_norm();
            let mut best = (0usize, f64::INFINITY);
            for (j, c) in centroids.iter().enumerate() {
                let d = row_distance(row, xn, c, c_norms[j]);
                if d < best.1 {
                    best = (j, d);
                }
            }
            best
        })
        .unzip()
}

/// Cluster means. An empty cluster is re-seeded with the point farthest from its
/// current centroid (each point used at most once).
fn update_centroids(x: &TfidfMatrix, labels: &[usize], dists: &[f64], k: usize) -> Vec<Vec<f64>> {
    let m = x.n_features;
    let mut sums = vec![vec![0.0; m]; k];
    let mut counts = vec![0usize; k];
    for (row, &l) in x.rows.iter().zip(labels) {
        counts[l] += 1;
        for (&i, &v) in row.indices.iter().zip(&row.values) {
            sums[l][i] += v;
        }
    }

    let mut far: Vec<usize> = (0..x.n_samples()).collect();
    far.sort_by(|&a, &b| dists[b].total_cmp(&dists[a]));
    let mut far = far.into_iter();

    for (c, sum) in sums.iter_mut().enumerate() {
        if counts[c] == 0 {
            if let Some(p) = far.next() {
                *sum = to_dense(&x.rows[p], m);
            }
        } else {
            let inv = 1.0 / counts[c] as f64;
            sum.iter_mut().for_each(|v| *v *= inv);
        }
    }
    sums
}

/// Greedy k-means++: each new center is the best of `2 + ln k` candidates sampled
/// proportionally to squared distance from the chosen centers.
fn kmeans_plus_plus(x: &TfidfMatrix, k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = x.n_samples();
    let m = x.n_features;
    let norms: Vec<f64> = x.rows.iter().map(SparseRow::squared_norm).collect();
    let trials = 2 + (k as f64).ln().floor() as usize;

    let first = to_dense(&x.rows[rng.random_range(0..n)], m);
    let first_norm: f64 = first.iter().map(|v| v * v).sum();
    let mut closest: Vec<f64> = x
        .rows
        .iter()
        .zip(&norms)
        .map(|(r, &rn)| row_distance(r, rn, &first, first_norm))
        .collect();
    let mut centers = vec![first];

    while centers.len() < k {
        let pot: f64 = closest.iter().sum();
        let mut best: Option<(f64, Vec<f64>, Vec<f64>)> = None;
        for _ in 0..trials {
            let idx = if pot > 0.0 {
                sample_weighted(&closest, rng.random::<f64>() * pot)
            } else {
                rng.random_range(0..n)
            };
            let cand = to_dense(&x.rows[idx], m);
            let cand_norm: f64 = cand.iter().map(|v| v * v).sum();
            let next: Vec<f64> = x
                .rows
                .iter()
                .zip(&norms)
                .zip(&closest)
                .map(|((r, &rn), &cur)| cur.min(row_distance(r, rn, &cand, cand_norm)))
                .collect();
            let next_pot: f64 = next.iter().sum();
            if best.as_ref().map_or(true, |(p, _, _)| next_pot < *p) {
                best = Some((next_pot, cand, next));
            }
        }
        match best {
            Some((_, cand, next)) => {
                centers.push(cand);
                closest = next;
            }
            None => break,
        }
    }
    centers
}

/// Index whose cumulative weight first reaches `target`.
fn sample_weighted(weights: &[f64], target: f64) -> usize {
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w;
        if acc >= target && *w > 0.0 {
            return i;
        }
    }
    weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
}
