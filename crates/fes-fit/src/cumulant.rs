use fes_core::errors::{ErrorInfo, FesError};
use nalgebra::DMatrix;

/// Smoothed replica curves stacked row-wise (replicas x grid points).
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaStack {
    curves: DMatrix<f64>,
}

impl ReplicaStack {
    /// Stacks equally sized curves, one row per replica.
    pub fn from_curves(curves: &[Vec<f64>]) -> Result<Self, FesError> {
        let Some(first) = curves.first() else {
            return Err(FesError::Shape(ErrorInfo::new(
                "stack_empty",
                "at least one replica curve is required",
            )));
        };
        let width = first.len();
        for (idx, curve) in curves.iter().enumerate() {
            if curve.len() != width {
                return Err(FesError::Shape(
                    ErrorInfo::new("stack_len", "replica curve length mismatch")
                        .with_context("replica", idx.to_string())
                        .with_context("expected", width.to_string())
                        .with_context("found", curve.len().to_string()),
                ));
            }
        }
        let curves = DMatrix::from_fn(curves.len(), width, |r, c| curves[r][c]);
        Ok(Self { curves })
    }

    /// Number of stacked replicas.
    pub fn replicas(&self) -> usize {
        self.curves.nrows()
    }

    /// Number of grid points per replica.
    pub fn points(&self) -> usize {
        self.curves.ncols()
    }

    /// Underlying matrix.
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.curves
    }
}

/// Per-point ensemble statistics across replicas.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMoments {
    /// Ensemble mean.
    pub mean: Vec<f64>,
    /// Population variance (divisor = replica count).
    pub variance: Vec<f64>,
}

/// Mean and population variance of every column of the stack.
pub fn column_moments(stack: &ReplicaStack) -> ColumnMoments {
    let replicas = stack.replicas() as f64;
    let mut mean = Vec::with_capacity(stack.points());
    let mut variance = Vec::with_capacity(stack.points());
    for column in stack.as_matrix().column_iter() {
        let mu = column.iter().sum::<f64>() / replicas;
        let var = column.iter().map(|v| (v - mu) * (v - mu)).sum::<f64>() / replicas;
        mean.push(mu);
        variance.push(var);
    }
    ColumnMoments { mean, variance }
}

/// Second-order cumulant estimate `mean - var / (2 kT)` at every grid point.
pub fn cumulant_fes(stack: &ReplicaStack, kt: f64) -> Result<Vec<f64>, FesError> {
    if !(kt.is_finite() && kt > 0.0) {
        return Err(FesError::Config(
            ErrorInfo::new("kt_non_positive", "kT must be positive and finite")
                .with_context("kt", kt.to_string()),
        ));
    }
    let moments = column_moments(stack);
    Ok(moments
        .mean
        .iter()
        .zip(moments.variance.iter())
        .map(|(mu, var)| mu - var / (2.0 * kt))
        .collect())
}
