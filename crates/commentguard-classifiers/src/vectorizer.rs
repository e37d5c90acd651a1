//! TF-IDF vectorization over word n-grams
//!
//! Fitting learns an n-gram vocabulary and smoothed inverse document
//! frequencies from a training corpus. The fitted [`VectorizerState`] is
//! immutable afterwards; transforming is a pure function of (text, state)
//! and always yields a vector of vocabulary dimension.

use commentguard_core::{Error, FeatureVector, NormalizedText, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Tokens shorter than this never become features
const MIN_TOKEN_LEN: usize = 2;

/// Fit-time parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Smallest n-gram length
    #[serde(default = "default_ngram_min")]
    pub ngram_min: usize,

    /// Largest n-gram length
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,

    /// Vocabulary cap; the most frequent n-grams are kept
    #[serde(default = "default_max_features")]
    pub max_features: Option<usize>,

    /// Minimum number of documents an n-gram must appear in
    #[serde(default = "default_min_df")]
    pub min_df: usize,

    /// Maximum fraction of documents an n-gram may appear in
    #[serde(default = "default_max_df")]
    pub max_df: f64,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            ngram_min: default_ngram_min(),
            ngram_max: default_ngram_max(),
            max_features: default_max_features(),
            min_df: default_min_df(),
            max_df: default_max_df(),
        }
    }
}

impl VectorizerParams {
    fn validate(&self) -> Result<()> {
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            return Err(Error::config(format!(
                "invalid n-gram range ({}, {})",
                self.ngram_min, self.ngram_max
            )));
        }
        if !(0.0..=1.0).contains(&self.max_df) || self.max_df == 0.0 {
            return Err(Error::config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == Some(0) {
            return Err(Error::config("max_features must be positive"));
        }
        Ok(())
    }
}

/// Learned vocabulary and IDF weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerState {
    pub params: VectorizerParams,

    /// n-gram -> feature index, indices follow sorted n-gram order
    pub vocabulary: BTreeMap<String, usize>,

    /// Inverse document frequency per feature index
    pub idf: Vec<f64>,

    /// Number of documents seen at fit time
    pub n_documents: usize,
}

impl VectorizerState {
    /// Learn vocabulary and IDF weights from a corpus
    pub fn fit(corpus: &[NormalizedText], params: VectorizerParams) -> Result<Self> {
        params.validate()?;

        if corpus.is_empty() {
            return Err(Error::vectorization("cannot fit on an empty corpus"));
        }

        let n_documents = corpus.len();
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in corpus {
            let counts = ngram_counts(doc, &params);
            for (term, count) in counts {
                *term_freq.entry(term.clone()).or_insert(0) += count;
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = params.max_df * n_documents as f64;
        if max_doc_count < params.min_df as f64 {
            return Err(Error::config(format!(
                "max_df corresponds to {max_doc_count:.1} documents, fewer than min_df {}",
                params.min_df
            )));
        }

        let mut kept: Vec<(String, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| {
                let df = doc_freq[term];
                df >= params.min_df && (df as f64) <= max_doc_count
            })
            .collect();

        if kept.is_empty() {
            return Err(Error::vectorization(
                "no n-grams remain after document-frequency pruning",
            ));
        }

        if let Some(max_features) = params.max_features {
            // Highest corpus frequency first, alphabetical among ties
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(max_features);
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let idf = terms
            .iter()
            .map(|term| smoothed_idf(n_documents, doc_freq[term]))
            .collect();

        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        info!(
            documents = n_documents,
            vocabulary = vocabulary.len(),
            "Fitted TF-IDF vectorizer"
        );

        Ok(Self {
            params,
            vocabulary,
            idf,
            n_documents,
        })
    }

    /// Map normalized text to an L2-normalized TF-IDF vector
    pub fn transform(&self, text: &NormalizedText) -> Result<FeatureVector> {
        let dim = self.dimension();

        let mut entries: Vec<(usize, f64)> = Vec::new();
        for (term, count) in ngram_counts(text, &self.params) {
            let Some(&idx) = self.vocabulary.get(&term) else {
                continue;
            };
            let idf = self.idf.get(idx).ok_or_else(|| {
                Error::vectorization(format!(
                    "term {term:?} maps to index {idx} but only {} idf weights exist",
                    self.idf.len()
                ))
            })?;
            entries.push((idx, count as f64 * idf));
        }

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        let entries = if norm > 0.0 {
            entries.into_iter().map(|(idx, w)| (idx, w / norm)).collect()
        } else {
            entries
        };

        let vector = FeatureVector::from_entries(dim, entries)?;
        debug!(dimension = dim, non_zero = vector.nnz(), "Vectorized text");
        Ok(vector)
    }

    /// Vocabulary size, equal to every output vector's dimension
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    /// Check internal consistency of a deserialized state
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;

        if self.idf.len() != self.vocabulary.len() {
            return Err(Error::model_load(format!(
                "vectorizer has {} idf weights for {} terms",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.vocabulary.len());
        for (term, &idx) in &self.vocabulary {
            if idx >= self.vocabulary.len() || !seen.insert(idx) {
                return Err(Error::model_load(format!(
                    "vectorizer term '{term}' has invalid index {idx}"
                )));
            }
        }

        if let Some(bad) = self.idf.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(Error::model_load(format!("vectorizer has invalid idf weight {bad}")));
        }

        Ok(())
    }
}

/// Vectorizer handle that may or may not hold a fitted state
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    params: VectorizerParams,
    state: Option<VectorizerState>,
}

impl TfidfVectorizer {
    /// Unfitted vectorizer
    pub fn new(params: VectorizerParams) -> Self {
        Self {
            params,
            state: None,
        }
    }

    /// Vectorizer around a previously fitted state
    pub fn from_state(state: VectorizerState) -> Self {
        Self {
            params: state.params.clone(),
            state: Some(state),
        }
    }

    /// Fit on a corpus, replacing any previous state
    pub fn fit(&mut self, corpus: &[NormalizedText]) -> Result<&VectorizerState> {
        let state = VectorizerState::fit(corpus, self.params.clone())?;
        Ok(self.state.insert(state))
    }

    pub fn transform(&self, text: &NormalizedText) -> Result<FeatureVector> {
        self.state()?.transform(text)
    }

    /// Transform a string that claims to be normalized
    pub fn transform_str(&self, text: &str) -> Result<FeatureVector> {
        let text = NormalizedText::new(text)?;
        self.transform(&text)
    }

    pub fn state(&self) -> Result<&VectorizerState> {
        self.state
            .as_ref()
            .ok_or_else(|| Error::not_fitted("vectorizer has no fitted state"))
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    pub fn dimension(&self) -> Result<usize> {
        Ok(self.state()?.dimension())
    }

    pub fn params(&self) -> &VectorizerParams {
        &self.params
    }
}

/// Count every n-gram of the configured lengths in one document
fn ngram_counts(text: &NormalizedText, params: &VectorizerParams) -> HashMap<String, usize> {
    let tokens: Vec<&str> = text
        .tokens()
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .collect();

    let mut counts = HashMap::new();
    for n in params.ngram_min..=params.ngram_max {
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}

/// `ln((1 + n) / (1 + df)) + 1`
fn smoothed_idf(n_documents: usize, df: usize) -> f64 {
    ((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0
}

fn default_ngram_min() -> usize {
    1
}

fn default_ngram_max() -> usize {
    3
}

fn default_max_features() -> Option<usize> {
    Some(15_000)
}

fn default_min_df() -> usize {
    2
}

fn default_max_df() -> f64 {
    0.9
}
