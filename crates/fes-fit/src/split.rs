use fes_core::errors::{ErrorInfo, FesError};
use fes_core::rng::RngHandle;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

fn default_test_fraction() -> f64 {
    0.1
}

fn default_seed() -> u64 {
    9531
}

fn default_shuffle() -> bool {
    true
}

/// Train/test partition settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitOpts {
    /// Fraction of samples held out for scoring.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed of the permutation.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// When false the last samples form the test set.
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
}

impl Default for SplitOpts {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            shuffle: default_shuffle(),
        }
    }
}

/// Paired samples partitioned into training and held-out sets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainTestSplit {
    /// Training inputs.
    pub x_train: Vec<f64>,
    /// Held-out inputs.
    pub x_test: Vec<f64>,
    /// Training targets.
    pub y_train: Vec<f64>,
    /// Held-out targets.
    pub y_test: Vec<f64>,
}

/// Splits `(x, y)` into `ceil(n * test_fraction)` test and the remaining train samples.
pub fn train_test_split(x: &[f64], y: &[f64], opts: &SplitOpts) -> Result<TrainTestSplit, FesError> {
    if x.len() != y.len() {
        return Err(FesError::shape("split_len", "target", x.len(), y.len()));
    }
    if !(opts.test_fraction > 0.0 && opts.test_fraction < 1.0) {
        return Err(FesError::Config(
            ErrorInfo::new("split_fraction", "test fraction must lie in (0, 1)")
                .with_context("test_fraction", opts.test_fraction.to_string()),
        ));
    }
    let n = x.len();
    let n_test = (opts.test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(FesError::Shape(
            ErrorInfo::new("split_size", "split leaves an empty partition")
                .with_context("samples", n.to_string())
                .with_context("test", n_test.to_string()),
        ));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let (test_idx, train_idx) = if opts.shuffle {
        let mut rng = RngHandle::from_seed(opts.seed);
        order.shuffle(&mut rng);
        let (test, train) = order.split_at(n_test);
        (test.to_vec(), train.to_vec())
    } else {
        let (train, test) = order.split_at(n - n_test);
        (test.to_vec(), train.to_vec())
    };

    let pick = |idx: &[usize], src: &[f64]| idx.iter().map(|&i| src[i]).collect::<Vec<_>>();
    Ok(TrainTestSplit {
        x_train: pick(&train_idx, x),
        x_test: pick(&test_idx, x),
        y_train: pick(&train_idx, y),
        y_test: pick(&test_idx, y),
    })
}
