//! Offline training and model selection
//!
//! Normalizes a labeled corpus, fits the vectorizer on a stratified training
//! split, trains every candidate linear model with mini-batch gradient
//! descent, and keeps whichever scores the highest held-out accuracy.

use crate::dataset::LabeledComment;
use crate::model_loader::{save_model, save_vectorizer, ArtifactPaths};
use crate::normalizer::Normalizer;
use crate::scorer::{sigmoid, LinearModel, ModelArtifact, ScorerKind};
use crate::vectorizer::{VectorizerParams, VectorizerState};
use commentguard_core::{Error, FeatureVector, NormalizedText, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Model families tried during selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Candidate {
    /// Class-balanced logistic regression
    LogisticRegression,
    /// Class-balanced linear SVM (hinge loss)
    LinearSvm,
    /// Perceptron, label output only
    Perceptron,
}

impl Candidate {
    pub const ALL: [Candidate; 3] = [
        Candidate::LogisticRegression,
        Candidate::LinearSvm,
        Candidate::Perceptron,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LogisticRegression => "logistic_regression",
            Self::LinearSvm => "linear_svm",
            Self::Perceptron => "perceptron",
        }
    }

    /// How the persisted model turns its decision value into a score
    pub fn scorer_kind(&self) -> ScorerKind {
        match self {
            Self::LogisticRegression => ScorerKind::Probabilistic,
            Self::LinearSvm => ScorerKind::Margin,
            Self::Perceptron => ScorerKind::Label,
        }
    }

    fn class_balanced(&self) -> bool {
        !matches!(self, Self::Perceptron)
    }

    /// d(loss)/d(decision) for one example
    fn loss_gradient(&self, decision: f64, label: u8) -> f64 {
        let sign = if label == 1 { 1.0 } else { -1.0 };
        match self {
            Self::LogisticRegression => sigmoid(decision) - f64::from(label),
            Self::LinearSvm if sign * decision < 1.0 => -sign,
            Self::Perceptron if sign * decision <= 0.0 => -sign,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub vectorizer: VectorizerParams,

    /// Fraction of each class held out for evaluation
    pub test_fraction: f64,

    /// Seed for the split and epoch shuffles
    pub seed: u64,

    /// Passes over the training set; raised when needed to reach `min_updates`
    pub epochs: usize,

    /// Lower bound on gradient steps, so small corpora with few batches per
    /// epoch still train to convergence
    pub min_updates: usize,

    /// Initial step size, decayed as `learning_rate / (1 + lr_decay * step)`
    pub learning_rate: f64,
    pub lr_decay: f64,

    /// L2 penalty, not applied to the perceptron
    pub l2: f64,

    pub batch_size: usize,
    pub candidates: Vec<Candidate>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vectorizer: VectorizerParams::default(),
            test_fraction: 0.2,
            seed: 42,
            epochs: 20,
            min_updates: 5000,
            learning_rate: 1.0,
            lr_decay: 1e-3,
            l2: 1e-4,
            batch_size: 32,
            candidates: Candidate::ALL.to_vec(),
        }
    }
}

impl TrainingConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(Error::config(format!(
                "test_fraction must be in [0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(Error::config("epochs and batch_size must be positive"));
        }
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 || self.l2.is_nan() || self.l2 < 0.0 {
            return Err(Error::config("learning_rate must be positive and l2 non-negative"));
        }
        if self.lr_decay.is_nan() || self.lr_decay < 0.0 {
            return Err(Error::config("lr_decay must be non-negative"));
        }
        if self.candidates.is_empty() {
            return Err(Error::config("at least one candidate model is required"));
        }
        Ok(())
    }
}

/// Binary classification metrics, positive class = cyberbullying
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Metrics {
    pub fn compute(predicted: &[u8], actual: &[u8]) -> Self {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut correct = 0usize;

        for (&p, &a) in predicted.iter().zip(actual) {
            match (p, a) {
                (1, 1) => tp += 1,
                (1, _) => fp += 1,
                (_, 1) => fn_ += 1,
                _ => {}
            }
            if p == a {
                correct += 1;
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy: ratio(correct, actual.len()),
            precision,
            recall,
            f1,
        }
    }
}

/// Result for one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReport {
    pub candidate: Candidate,
    pub metrics: Metrics,
}

/// Summary of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_size: usize,
    pub test_size: usize,
    pub vocabulary_size: usize,
    pub candidates: Vec<CandidateReport>,
    pub selected: Candidate,
}

impl TrainingReport {
    pub fn selected_metrics(&self) -> Option<&Metrics> {
        self.candidates
            .iter()
            .find(|c| c.candidate == self.selected)
            .map(|c| &c.metrics)
    }
}

/// Artifacts of the winning candidate
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub vectorizer: VectorizerState,
    pub artifact: ModelArtifact,
    pub report: TrainingReport,
}

impl TrainedModel {
    pub fn save(&self, paths: &ArtifactPaths) -> Result<()> {
        save_vectorizer(&self.vectorizer, &paths.vectorizer)?;
        save_model(&self.artifact, &paths.model)
    }
}

/// Split indices into (train, test), preserving class proportions
pub fn stratified_split(labels: &[u8], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in [0u8, 1] {
        let mut indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect();
        indices.shuffle(&mut rng);

        // Every class keeps at least one training example
        let n_test = ((indices.len() as f64 * test_fraction).round() as usize)
            .min(indices.len().saturating_sub(1));
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Train every candidate and keep the most accurate
pub fn train_and_select(
    records: &[LabeledComment],
    normalizer: &Normalizer,
    config: &TrainingConfig,
) -> Result<TrainedModel> {
    config.validate()?;

    let mut texts = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());
    for record in records {
        let text = normalizer.normalize(&record.text)?;
        if text.is_empty() {
            continue;
        }
        texts.push(text);
        labels.push(record.label);
    }

    let positives = labels.iter().filter(|&&l| l == 1).count();
    if positives == 0 || positives == labels.len() {
        return Err(Error::config(
            "training data must contain both cyberbullying and safe examples",
        ));
    }

    let (train_idx, test_idx) = stratified_split(&labels, config.test_fraction, config.seed);

    let train_texts: Vec<NormalizedText> = train_idx.iter().map(|&i| texts[i].clone()).collect();
    let vectorizer = VectorizerState::fit(&train_texts, config.vectorizer.clone())?;

    let vectorize = |indices: &[usize]| -> Result<(Vec<FeatureVector>, Vec<u8>)> {
        let xs = indices
            .iter()
            .map(|&i| vectorizer.transform(&texts[i]))
            .collect::<Result<Vec<_>>>()?;
        let ys = indices.iter().map(|&i| labels[i]).collect();
        Ok((xs, ys))
    };

    let (train_x, train_y) = vectorize(&train_idx)?;
    let (mut test_x, mut test_y) = vectorize(&test_idx)?;
    if test_x.is_empty() {
        warn!("No held-out examples; evaluating candidates on the training split");
        test_x = train_x.clone();
        test_y = train_y.clone();
    }

    info!(
        train = train_x.len(),
        test = test_idx.len(),
        vocabulary = vectorizer.dimension(),
        "Training candidates"
    );

    let mut reports = Vec::with_capacity(config.candidates.len());
    let mut best: Option<(Candidate, ModelArtifact, Metrics)> = None;

    for &candidate in &config.candidates {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let model = fit_linear(
            candidate,
            &train_x,
            &train_y,
            vectorizer.dimension(),
            config,
            &mut rng,
        )?;
        let artifact = ModelArtifact::new(candidate.scorer_kind(), model);

        let scorer = artifact.clone().into_scorer();
        let predicted = test_x
            .iter()
            .map(|x| scorer.predict(x))
            .collect::<Result<Vec<_>>>()?;
        let metrics = Metrics::compute(&predicted, &test_y);

        info!(
            candidate = %candidate,
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1,
            "Evaluated candidate"
        );

        reports.push(CandidateReport { candidate, metrics });
        if best
            .as_ref()
            .map_or(true, |(_, _, m)| metrics.accuracy > m.accuracy)
        {
            best = Some((candidate, artifact, metrics));
        }
    }

    let (selected, artifact, metrics) =
        best.ok_or_else(|| Error::internal("no candidate model was trained"))?;

    info!(selected = %selected, accuracy = metrics.accuracy, "Selected model");

    Ok(TrainedModel {
        report: TrainingReport {
            train_size: train_x.len(),
            test_size: test_idx.len(),
            vocabulary_size: vectorizer.dimension(),
            candidates: reports,
            selected,
        },
        vectorizer,
        artifact,
    })
}

/// Mini-batch gradient descent over sparse features
fn fit_linear(
    candidate: Candidate,
    xs: &[FeatureVector],
    ys: &[u8],
    dim: usize,
    config: &TrainingConfig,
    rng: &mut StdRng,
) -> Result<LinearModel> {
    let mut model = LinearModel::zeros(dim);
    let class_weights = if candidate.class_balanced() {
        balanced_class_weights(ys)
    } else {
        [1.0, 1.0]
    };
    let l2 = if candidate.class_balanced() { config.l2 } else { 0.0 };

    let mut order: Vec<usize> = (0..xs.len()).collect();
    let mut grad = vec![0.0; dim];
    let epochs = effective_epochs(xs.len(), config);
    let mut step_count = 0usize;

    for _ in 0..epochs {
        order.shuffle(rng);

        for batch in order.chunks(config.batch_size) {
            let lr = config.learning_rate / (1.0 + config.lr_decay * step_count as f64);
            step_count += 1;
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_bias = 0.0;

            for &i in batch {
                let label = ys[i];
                let coef = candidate.loss_gradient(model.decision(&xs[i])?, label)
                    * class_weights[usize::from(label)];
                if coef == 0.0 {
                    continue;
                }
                for (j, value) in xs[i].iter() {
                    grad[j] += coef * value;
                }
                grad_bias += coef;
            }

            let step = lr / batch.len() as f64;
            let decay = 1.0 - lr * l2;
            for (w, g) in model.weights.iter_mut().zip(&grad) {
                *w = *w * decay - step * g;
            }
            model.bias -= step * grad_bias;
        }
    }

    debug!(candidate = %candidate, epochs, steps = step_count, "Finished gradient descent");
    model.validate()?;
    Ok(model)
}

/// Configured epochs, raised until the run performs at least `min_updates` steps
fn effective_epochs(n_samples: usize, config: &TrainingConfig) -> usize {
    let batches_per_epoch = n_samples.div_ceil(config.batch_size).max(1);
    config.epochs.max(config.min_updates.div_ceil(batches_per_epoch))
}

/// `n / (2 * n_class)` for each class
fn balanced_class_weights(ys: &[u8]) -> [f64; 2] {
    let n = ys.len() as f64;
    let positives = ys.iter().filter(|&&y| y == 1).count() as f64;
    let negatives = n - positives;
    let weight = |count: f64| if count == 0.0 { 1.0 } else { n / (2.0 * count) };
    [weight(negatives), weight(positives)]
}
