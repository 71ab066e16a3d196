//! Single-output feed-forward regressor trained with minibatch Adam.
//!
//! Training follows the usual squared-error recipe: the loss is
//! `0.5 * mean((prediction - target)^2)` plus an L2 penalty
//! `0.5 * alpha * sum(W^2) / batch`, weights and biases are drawn from a
//! Glorot-uniform distribution, and training stops once the epoch loss has
//! failed to improve by `tol` for more than `n_iter_no_change` epochs.

use fes_core::errors::{ErrorInfo, FesError};
use fes_core::rng::RngHandle;
use nalgebra::{DMatrix, DVector};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::metrics::r2_score;

const INIT_SUBSTREAM: u64 = 0;
const SHUFFLE_SUBSTREAM: u64 = 1;

/// Hidden-layer nonlinearity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Hyperbolic tangent.
    #[default]
    Tanh,
    /// Logistic sigmoid.
    Logistic,
    /// Rectified linear unit.
    Relu,
    /// No-op.
    Identity,
}

impl Activation {
    fn apply(self, value: f64) -> f64 {
        match self {
            Activation::Tanh => value.tanh(),
            Activation::Logistic => 1.0 / (1.0 + (-value).exp()),
            Activation::Relu => value.max(0.0),
            Activation::Identity => value,
        }
    }

    /// Derivative expressed through the activation output.
    fn derivative(self, output: f64) -> f64 {
        match self {
            Activation::Tanh => 1.0 - output * output,
            Activation::Logistic => output * (1.0 - output),
            Activation::Relu => {
                if output > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Identity => 1.0,
        }
    }

    fn init_factor(self) -> f64 {
        match self {
            Activation::Logistic => 2.0,
            _ => 6.0,
        }
    }
}

fn default_hidden_layers() -> Vec<usize> {
    vec![12]
}

fn default_alpha() -> f64 {
    1e-5
}

fn default_learning_rate() -> f64 {
    1e-3
}

fn default_beta_1() -> f64 {
    0.9
}

fn default_beta_2() -> f64 {
    0.999
}

fn default_epsilon() -> f64 {
    1e-8
}

fn default_max_iter() -> usize {
    10_000
}

fn default_tol() -> f64 {
    1e-9
}

fn default_n_iter_no_change() -> usize {
    10
}

fn default_shuffle() -> bool {
    true
}

fn default_seed() -> u64 {
    57451
}

/// Network architecture and optimiser settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpOpts {
    /// Width of each hidden layer.
    #[serde(default = "default_hidden_layers")]
    pub hidden_layers: Vec<usize>,
    /// Hidden-layer activation.
    #[serde(default)]
    pub activation: Activation,
    /// L2 penalty strength.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Adam step size.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Adam first-moment decay.
    #[serde(default = "default_beta_1")]
    pub beta_1: f64,
    /// Adam second-moment decay.
    #[serde(default = "default_beta_2")]
    pub beta_2: f64,
    /// Adam denominator guard.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Maximum number of epochs.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Minimum loss improvement counted as progress.
    #[serde(default = "default_tol")]
    pub tol: f64,
    /// Epochs without progress tolerated before stopping.
    #[serde(default = "default_n_iter_no_change")]
    pub n_iter_no_change: usize,
    /// Minibatch size; `None` means `min(200, n_samples)`.
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Reshuffle the training set every epoch.
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    /// Seed for initialisation and shuffling.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for MlpOpts {
    fn default() -> Self {
        Self {
            hidden_layers: default_hidden_layers(),
            activation: Activation::default(),
            alpha: default_alpha(),
            learning_rate: default_learning_rate(),
            beta_1: default_beta_1(),
            beta_2: default_beta_2(),
            epsilon: default_epsilon(),
            max_iter: default_max_iter(),
            tol: default_tol(),
            n_iter_no_change: default_n_iter_no_change(),
            batch_size: None,
            shuffle: default_shuffle(),
            seed: default_seed(),
        }
    }
}

/// Fully connected layer mapping `fan_in` inputs to `fan_out` outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Weight matrix of shape `fan_in x fan_out`.
    pub weights: DMatrix<f64>,
    /// Bias vector of length `fan_out`.
    pub biases: DVector<f64>,
}

impl DenseLayer {
    fn glorot<R: Rng>(fan_in: usize, fan_out: usize, factor: f64, rng: &mut R) -> Self {
        let bound = (factor / (fan_in + fan_out) as f64).sqrt();
        let weights = DMatrix::from_fn(fan_in, fan_out, |_, _| rng.gen_range(-bound..bound));
        let biases = DVector::from_fn(fan_out, |_, _| rng.gen_range(-bound..bound));
        Self { weights, biases }
    }

    fn forward(&self, input: &DMatrix<f64>) -> DMatrix<f64> {
        let mut out = input * &self.weights;
        for (j, mut column) in out.column_iter_mut().enumerate() {
            column.add_scalar_mut(self.biases[j]);
        }
        out
    }

    /// Weights as row-major nested vectors.
    pub fn weight_rows(&self) -> Vec<Vec<f64>> {
        self.weights
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

/// Outcome of the optimisation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Epochs executed.
    pub n_iter: usize,
    /// Loss of the last epoch.
    pub final_loss: f64,
    /// Lowest epoch loss observed.
    pub best_loss: f64,
    /// Whether training stopped on the tolerance criterion.
    pub converged: bool,
    /// Loss of every epoch.
    pub loss_curve: Vec<f64>,
}

/// Trained regressor.
#[derive(Debug, Clone, PartialEq)]
pub struct MlpModel {
    activation: Activation,
    layers: Vec<DenseLayer>,
    summary: TrainingSummary,
}

struct Gradients {
    weights: Vec<DMatrix<f64>>,
    biases: Vec<DVector<f64>>,
}

struct Adam {
    beta_1: f64,
    beta_2: f64,
    epsilon: f64,
    learning_rate: f64,
    t: i32,
    m_w: Vec<DMatrix<f64>>,
    v_w: Vec<DMatrix<f64>>,
    m_b: Vec<DVector<f64>>,
    v_b: Vec<DVector<f64>>,
}

impl Adam {
    fn new(layers: &[DenseLayer], opts: &MlpOpts) -> Self {
        let zeros_w = || {
            layers
                .iter()
                .map(|l| DMatrix::zeros(l.weights.nrows(), l.weights.ncols()))
                .collect::<Vec<_>>()
        };
        let zeros_b = || {
            layers
                .iter()
                .map(|l| DVector::zeros(l.biases.len()))
                .collect::<Vec<_>>()
        };
        Self {
            beta_1: opts.beta_1,
            beta_2: opts.beta_2,
            epsilon: opts.epsilon,
            learning_rate: opts.learning_rate,
            t: 0,
            m_w: zeros_w(),
            v_w: zeros_w(),
            m_b: zeros_b(),
            v_b: zeros_b(),
        }
    }

    fn step(&mut self, layers: &mut [DenseLayer], grads: &Gradients) {
        self.t += 1;
        let lr_t = self.learning_rate * (1.0 - self.beta_2.powi(self.t)).sqrt()
            / (1.0 - self.beta_1.powi(self.t));
        let (b1, b2, eps) = (self.beta_1, self.beta_2, self.epsilon);
        for (idx, layer) in layers.iter_mut().enumerate() {
            adam_update(
                layer.weights.as_mut_slice(),
                grads.weights[idx].as_slice(),
                self.m_w[idx].as_mut_slice(),
                self.v_w[idx].as_mut_slice(),
                (b1, b2, eps, lr_t),
            );
            adam_update(
                layer.biases.as_mut_slice(),
                grads.biases[idx].as_slice(),
                self.m_b[idx].as_mut_slice(),
                self.v_b[idx].as_mut_slice(),
                (b1, b2, eps, lr_t),
            );
        }
    }
}

fn adam_update(
    params: &mut [f64],
    grads: &[f64],
    m: &mut [f64],
    v: &mut [f64],
    (b1, b2, eps, lr_t): (f64, f64, f64, f64),
) {
    for (((p, &g), m), v) in params.iter_mut().zip(grads).zip(m.iter_mut()).zip(v.iter_mut()) {
        *m = b1 * *m + (1.0 - b1) * g;
        *v = b2 * *v + (1.0 - b2) * g * g;
        *p -= lr_t * *m / (v.sqrt() + eps);
    }
}

fn config_error(code: &str, message: &str) -> FesError {
    FesError::Config(ErrorInfo::new(code, message))
}

impl MlpOpts {
    /// Checks option ranges before training.
    pub fn validate(&self) -> Result<(), FesError> {
        if self.hidden_layers.is_empty() || self.hidden_layers.iter().any(|&w| w == 0) {
            return Err(config_error(
                "mlp_hidden",
                "hidden layers must be non-empty with positive widths",
            ));
        }
        if !(self.learning_rate > 0.0) {
            return Err(config_error("mlp_learning_rate", "learning rate must be positive"));
        }
        if !(0.0..1.0).contains(&self.beta_1) || !(0.0..1.0).contains(&self.beta_2) {
            return Err(config_error("mlp_beta", "Adam betas must lie in [0, 1)"));
        }
        if self.alpha < 0.0 || self.tol < 0.0 {
            return Err(config_error("mlp_penalty", "alpha and tol must be non-negative"));
        }
        if self.max_iter == 0 {
            return Err(config_error("mlp_max_iter", "max_iter must be positive"));
        }
        if self.batch_size == Some(0) {
            return Err(config_error("mlp_batch", "batch size must be positive"));
        }
        Ok(())
    }

    /// Trains a network on scalar inputs `x` and targets `y`.
    pub fn fit(&self, x: &[f64], y: &[f64]) -> Result<MlpModel, FesError> {
        self.validate()?;
        if x.len() != y.len() {
            return Err(FesError::shape("mlp_len", "target", x.len(), y.len()));
        }
        if x.is_empty() {
            return Err(FesError::Fit(ErrorInfo::new(
                "mlp_empty",
                "network training needs at least one sample",
            )));
        }
        let n = x.len();
        let batch_size = self.batch_size.unwrap_or(200).clamp(1, n);

        let mut sizes = vec![1];
        sizes.extend(self.hidden_layers.iter().copied());
        sizes.push(1);
        let mut init_rng = RngHandle::substream(self.seed, INIT_SUBSTREAM);
        let factor = self.activation.init_factor();
        let mut layers: Vec<DenseLayer> = sizes
            .windows(2)
            .map(|pair| DenseLayer::glorot(pair[0], pair[1], factor, &mut init_rng))
            .collect();

        let mut adam = Adam::new(&layers, self);
        let mut shuffle_rng = RngHandle::substream(self.seed, SHUFFLE_SUBSTREAM);
        let mut order: Vec<usize> = (0..n).collect();
        let mut loss_curve = Vec::new();
        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0usize;
        let mut converged = false;

        for epoch in 0..self.max_iter {
            if self.shuffle {
                order.shuffle(&mut shuffle_rng);
            }
            let mut accumulated = 0.0;
            for batch in order.chunks(batch_size) {
                let xb = DMatrix::from_fn(batch.len(), 1, |r, _| x[batch[r]]);
                let yb = DMatrix::from_fn(batch.len(), 1, |r, _| y[batch[r]]);
                let (loss, grads) = backprop(&layers, self.activation, self.alpha, &xb, &yb);
                adam.step(&mut layers, &grads);
                accumulated += loss * batch.len() as f64;
            }
            let loss = accumulated / n as f64;
            if !loss.is_finite() {
                return Err(FesError::Fit(
                    ErrorInfo::new("mlp_diverged", "training loss became non-finite")
                        .with_context("epoch", (epoch + 1).to_string())
                        .with_hint("lower the learning rate"),
                ));
            }
            loss_curve.push(loss);

            if loss > best_loss - self.tol {
                no_improvement += 1;
            } else {
                no_improvement = 0;
            }
            if loss < best_loss {
                best_loss = loss;
            }
            if no_improvement > self.n_iter_no_change {
                converged = true;
                break;
            }
        }

        let n_iter = loss_curve.len();
        let final_loss = loss_curve.last().copied().unwrap_or(f64::NAN);
        if converged {
            debug!(epochs = n_iter, loss = final_loss, "network converged");
        } else {
            warn!(
                max_iter = self.max_iter,
                loss = final_loss,
                "network reached max_iter without converging"
            );
        }
        Ok(MlpModel {
            activation: self.activation,
            layers,
            summary: TrainingSummary {
                n_iter,
                final_loss,
                best_loss,
                converged,
                loss_curve,
            },
        })
    }
}

fn forward_pass(layers: &[DenseLayer], activation: Activation, input: DMatrix<f64>) -> Vec<DMatrix<f64>> {
    let mut activations = Vec::with_capacity(layers.len() + 1);
    activations.push(input);
    let last = layers.len() - 1;
    for (idx, layer) in layers.iter().enumerate() {
        let mut out = layer.forward(&activations[idx]);
        if idx != last {
            out.apply(|v| *v = activation.apply(*v));
        }
        activations.push(out);
    }
    activations
}

fn backprop(
    layers: &[DenseLayer],
    activation: Activation,
    alpha: f64,
    xb: &DMatrix<f64>,
    yb: &DMatrix<f64>,
) -> (f64, Gradients) {
    let batch = xb.nrows() as f64;
    let activations = forward_pass(layers, activation, xb.clone());
    let output = &activations[layers.len()];

    let mut delta = output - yb;
    let penalty: f64 = layers.iter().map(|l| l.weights.norm_squared()).sum();
    let loss = delta.norm_squared() / (2.0 * batch) + 0.5 * alpha * penalty / batch;

    let mut weight_grads = vec![DMatrix::<f64>::zeros(0, 0); layers.len()];
    let mut bias_grads = vec![DVector::<f64>::zeros(0); layers.len()];
    for idx in (0..layers.len()).rev() {
        let a_prev = &activations[idx];
        weight_grads[idx] = (a_prev.transpose() * &delta + &layers[idx].weights * alpha) / batch;
        bias_grads[idx] = DVector::from_iterator(
            delta.ncols(),
            delta.column_iter().map(|c| c.sum() / batch),
        );
        if idx > 0 {
            let mut next = &delta * layers[idx].weights.transpose();
            next.zip_apply(a_prev, |d, a| *d *= activation.derivative(a));
            delta = next;
        }
    }
    (
        loss,
        Gradients {
            weights: weight_grads,
            biases: bias_grads,
        },
    )
}

impl MlpModel {
    /// Evaluates the network at every input.
    pub fn predict(&self, x: &[f64]) -> Vec<f64> {
        if x.is_empty() {
            return Vec::new();
        }
        let input = DMatrix::from_column_slice(x.len(), 1, x);
        let mut activations = forward_pass(&self.layers, self.activation, input);
        activations
            .pop()
            .map(|out| out.iter().copied().collect())
            .unwrap_or_default()
    }

    /// R² of the predictions on `(x, y)`.
    pub fn score(&self, x: &[f64], y: &[f64]) -> Result<f64, FesError> {
        r2_score(y, &self.predict(x))
    }

    /// Layers from input to output.
    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Optimisation record.
    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    /// Hidden-layer activation.
    pub fn activation(&self) -> Activation {
        self.activation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_shapes_follow_architecture() {
        let opts = MlpOpts {
            max_iter: 2,
            ..MlpOpts::default()
        };
        let model = opts.fit(&[0.0, 0.5, 1.0], &[0.0, 0.25, 1.0]).expect("fit");
        let layers = model.layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].weights.shape(), (1, 12));
        assert_eq!(layers[0].biases.len(), 12);
        assert_eq!(layers[1].weights.shape(), (12, 1));
        assert_eq!(layers[1].biases.len(), 1);
        assert!(!model.summary().converged);
        assert_eq!(model.summary().n_iter, 2);
    }

    #[test]
    fn glorot_bounds_hold() {
        let mut rng = RngHandle::from_seed(1);
        let layer = DenseLayer::glorot(1, 12, 6.0, &mut rng);
        let bound = (6.0f64 / 13.0).sqrt();
        assert!(layer.weights.iter().all(|w| w.abs() <= bound));
        assert!(layer.biases.iter().all(|b| b.abs() <= bound));
    }

    #[test]
    fn zero_hidden_width_is_rejected() {
        let opts = MlpOpts {
            hidden_layers: vec![0],
            ..MlpOpts::default()
        };
        assert!(matches!(opts.validate(), Err(FesError::Config(_))));
    }
}
