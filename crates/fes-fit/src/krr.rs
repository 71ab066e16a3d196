use fes_core::errors::{ErrorInfo, FesError};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::colvar::ColvarSamples;
use crate::grid::Grid;

fn default_alpha() -> f64 {
    0.1
}

/// Kernel ridge regression settings with a radial basis function kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelRidge {
    /// Ridge regularisation strength added to the kernel diagonal.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// RBF bandwidth `gamma`; `None` means `1 / n_features`.
    #[serde(default)]
    pub gamma: Option<f64>,
}

impl Default for KernelRidge {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            gamma: None,
        }
    }
}

/// Dual coefficients of a fitted kernel ridge model.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelRidgeFit {
    gamma: f64,
    support: Vec<f64>,
    dual_coef: DVector<f64>,
}

fn rbf(gamma: f64, a: f64, b: f64) -> f64 {
    let d = a - b;
    (-gamma * d * d).exp()
}

/// Minimum-norm solution, truncating singular values below the
/// `eps * n * s_max` cutoff.
fn least_squares(system: DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, FesError> {
    let n = system.nrows();
    let svd = system.svd(true, true);
    let cutoff = f64::EPSILON * n as f64 * svd.singular_values.max();
    svd.solve(rhs, cutoff).map_err(|reason| {
        FesError::Fit(
            ErrorInfo::new("krr_singular", reason)
                .with_context("samples", n.to_string())
                .with_hint("increase the ridge alpha"),
        )
    })
}

impl KernelRidge {
    /// Effective bandwidth for one-dimensional inputs.
    pub fn effective_gamma(&self) -> f64 {
        self.gamma.unwrap_or(1.0)
    }

    /// Solves `(K + alpha I) c = y` for the dual coefficients.
    ///
    /// Cholesky is tried first, then LU, then a least-squares solve for
    /// singular systems.
    pub fn fit(&self, samples: &ColvarSamples) -> Result<KernelRidgeFit, FesError> {
        if samples.x.len() != samples.y.len() {
            return Err(FesError::shape(
                "krr_samples",
                "observable",
                samples.x.len(),
                samples.y.len(),
            ));
        }
        if samples.is_empty() {
            return Err(FesError::Fit(ErrorInfo::new(
                "krr_empty",
                "kernel ridge needs at least one sample",
            )));
        }
        let gamma = self.effective_gamma();
        let n = samples.len();
        let x = &samples.x;
        let mut system = DMatrix::from_fn(n, n, |i, j| rbf(gamma, x[i], x[j]));
        for i in 0..n {
            system[(i, i)] += self.alpha;
        }
        let rhs = DVector::from_column_slice(&samples.y);

        let dual_coef = match system.clone().cholesky() {
            Some(chol) => chol.solve(&rhs),
            None => {
                warn!(samples = n, "kernel system not positive definite, using LU");
                match system.clone().lu().solve(&rhs) {
                    Some(coef) => coef,
                    None => {
                        warn!(samples = n, "kernel system singular, using least squares");
                        least_squares(system, &rhs)?
                    }
                }
            }
        };
        if dual_coef.iter().any(|value| !value.is_finite()) {
            return Err(FesError::Fit(ErrorInfo::new(
                "krr_non_finite",
                "kernel ridge produced non-finite coefficients",
            )));
        }
        Ok(KernelRidgeFit {
            gamma,
            support: x.clone(),
            dual_coef,
        })
    }
}

impl KernelRidgeFit {
    /// Evaluates the fitted model at a single point.
    pub fn predict_one(&self, at: f64) -> f64 {
        self.support
            .iter()
            .zip(self.dual_coef.iter())
            .map(|(&xj, &cj)| rbf(self.gamma, at, xj) * cj)
            .sum()
    }

    /// Evaluates the fitted model on every grid point.
    pub fn predict(&self, grid: &Grid) -> Vec<f64> {
        grid.points().iter().map(|&g| self.predict_one(g)).collect()
    }
}

/// Fits one replica and returns its curve on `grid`; the fit itself is dropped.
pub fn smooth_replica(
    samples: &ColvarSamples,
    grid: &Grid,
    opts: &KernelRidge,
) -> Result<Vec<f64>, FesError> {
    Ok(opts.fit(samples)?.predict(grid))
}
