//! TF-IDF vectorization of corpus lines into L2-normalized sparse rows.

use crate::error::ClusterError;
use crate::stopwords::{ENGLISH_STOP_WORDS, REDDIT_NOISE_WORDS};
use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use regex::Regex;
use std::time::Instant;

/// Sparse row, `indices` strictly ascending.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseRow {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseRow {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.indices.iter().zip(&self.values).map(|(&i, &v)| v * dense[i]).sum()
    }

    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }
}

#[derive(Clone, Debug)]
pub struct TfidfMatrix {
    pub rows: Vec<SparseRow>,
    pub n_features: usize,
}

impl TfidfMatrix {
    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(SparseRow::nnz).sum()
    }
    /// Fraction of non-zero cells.
    pub fn sparsity(&self) -> f64 {
        let cells = self.n_samples() * self.n_features;
        if cells == 0 { 0.0 } else { self.nnz() as f64 / cells as f64 }
    }
}

/// Sorted vocabulary and matching idf weights.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    pub terms: Vec<String>,
    pub idf: Vec<f64>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).ok()
    }
}

pub struct TfidfVectorizer {
    min_df: usize,     // absolute document count
    max_df: f64,       // proportion of documents
    stop_words: AHashSet<String>,
    token_re: Regex,
}

impl TfidfVectorizer {
    /// English + Reddit-noise stop words, plus `extra`.
    pub fn new(min_df: usize, max_df: f64, extra: &[String]) -> Result<Self> {
        let mut stop_words: AHashSet<String> = ENGLISH_STOP_WORDS
            .iter()
            .chain(REDDIT_NOISE_WORDS)
            .map(|s| s.to_string())
            .collect();
        stop_words.extend(extra.iter().map(|s| s.trim().to_lowercase()));
        let token_re = Regex::new(r"\b\w\w+\b").context("compile token pattern")?;
        Ok(Self { min_df, max_df, stop_words, token_re })
    }

    pub fn tokenize(&self, doc: &str) -> Vec<String> {
        let lower = doc.to_lowercase();
        self.token_re
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }

    /// Learn the vocabulary and idf from `docs`, then weight them.
    /// Smoothed idf: `ln((1 + n) / (1 + df)) + 1`.
    pub fn fit_transform(&self, docs: &[&str]) -> Result<(TfidfMatrix, Vocabulary)> {
        let n_docs = docs.len();
        if n_docs == 0 {
            return Err(ClusterError::EmptyCorpus.into());
        }
        let max_doc_count = self.max_df * n_docs as f64;
        if max_doc_count < self.min_df as f64 {
            return Err(ClusterError::InvalidBounds { min_df: self.min_df, max_df: self.max_df }.into());
        }

        let t0 = Instant::now();
        let tokenized: Vec<Vec<String>> = docs.iter().map(|d| self.tokenize(d)).collect();

        let mut df: AHashMap<&str, usize> = AHashMap::new();
        for toks in &tokenized {
            let uniq: AHashSet<&str> = toks.iter().map(String::as_str).collect();
            for t in uniq {
                *df.entry(t).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<String> = df
            .iter()
            .filter(|&(_, &n)| n >= self.min_df && n as f64 <= max_doc_count)
            .map(|(t, _)| t.to_string())
            .collect();
        if terms.is_empty() {
            return Err(ClusterError::NoTermsRemain.into());
        }
        terms.sort();
        let idf: Vec<f64> = terms
            .iter()
            .map(|t| {
                let d = df.get(t.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs as f64) / (1.0 + d)).ln() + 1.0
            })
            .collect();
        let index: AHashMap<&str, usize> = terms.iter().enumerate().map(|(i, t)| (t.as_str(), i)).collect();

        let rows = tokenized
            .iter()
            .map(|toks| {
                let mut counts: AHashMap<usize, f64> = AHashMap::new();
                for t in toks {
                    if let Some(&i) = index.get(t.as_str()) {
                        *counts.entry(i).or_insert(0.0) += 1.0;
                    }
                }
                let mut cells: Vec<(usize, f64)> = counts.into_iter().map(|(i, c)| (i, c * idf[i])).collect();
                cells.sort_by_key(|(i, _)| *i);
                let norm = cells.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
                let (indices, values): (Vec<usize>, Vec<f64>) = cells
                    .into_iter()
                    .map(|(i, v)| (i, if norm > 0.0 { v / norm } else { v }))
                    .unzip();
                SparseRow { indices, values }
            })
            .collect();

        let matrix = TfidfMatrix { rows, n_features: terms.len() };
        tracing::info!(
            "vectorization done in {:.3} s - n_samples: {}, n_features: {}, sparsity: {:.3}",
            t0.elapsed().as_secs_f64(),
            matrix.n_samples(),
            matrix.n_features,
            matrix.sparsity()
        );
        Ok((matrix, Vocabulary { terms, idf }))
    }
}
