use fes_core::errors::{ErrorInfo, FesError};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of points a grid may hold.
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Half-open range description used to regenerate evaluation grids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// First grid point.
    pub start: f64,
    /// Exclusive upper bound.
    pub stop: f64,
    /// Spacing between consecutive points.
    pub step: f64,
}

impl GridSpec {
    /// Grid on which each replica is smoothed.
    pub const SMOOTHING: GridSpec = GridSpec {
        start: -1.5,
        stop: 1.5,
        step: 0.001,
    };

    /// Grid on which the fitted network is re-evaluated for output.
    pub const OUTPUT: GridSpec = GridSpec {
        start: -1.5,
        stop: 1.51,
        step: 0.01,
    };

    /// Materialises the grid.
    pub fn build(&self) -> Result<Grid, FesError> {
        Grid::arange(self.start, self.stop, self.step)
    }

    /// Number of points [`GridSpec::build`] would produce, without allocating them.
    pub fn point_count(&self) -> Result<usize, FesError> {
        arange_len(self.start, self.stop, self.step)
    }
}

fn arange_len(start: f64, stop: f64, step: f64) -> Result<usize, FesError> {
    if !start.is_finite() || !stop.is_finite() || !step.is_finite() {
        return Err(FesError::Config(
            ErrorInfo::new("grid_non_finite", "grid bounds must be finite")
                .with_context("start", start.to_string())
                .with_context("stop", stop.to_string())
                .with_context("step", step.to_string()),
        ));
    }
    if step <= 0.0 {
        return Err(FesError::Config(
            ErrorInfo::new("grid_step", "grid step must be positive")
                .with_context("step", step.to_string()),
        ));
    }
    let span = ((stop - start) / step).ceil();
    if !span.is_finite() || span > MAX_GRID_POINTS as f64 {
        return Err(FesError::Config(
            ErrorInfo::new("grid_size", "grid has too many points")
                .with_context("points", span.to_string())
                .with_context("limit", MAX_GRID_POINTS.to_string())
                .with_hint("increase the grid step"),
        ));
    }
    Ok(if span > 0.0 { span as usize } else { 0 })
}

/// Ordered sequence of scalar evaluation points.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    points: Vec<f64>,
}

impl Grid {
    /// Builds `start, start + step, ...` up to but excluding `stop`.
    ///
    /// The point count is `ceil((stop - start) / step)` and each point is
    /// computed as `start + i * step` rather than by accumulation, so rounding
    /// error does not drift along the grid.
    /// Grids longer than [`MAX_GRID_POINTS`] are rejected.
    pub fn arange(start: f64, stop: f64, step: f64) -> Result<Self, FesError> {
        let len = arange_len(start, stop, step)?;
        let points = (0..len).map(|idx| start + idx as f64 * step).collect();
        Ok(Self { points })
    }

    /// Wraps an explicit list of points.
    pub fn from_points(points: Vec<f64>) -> Self {
        Self { points }
    }

    /// Grid points in order.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the grid has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_grid_has_three_thousand_points() {
        let grid = GridSpec::SMOOTHING.build().expect("grid");
        assert_eq!(grid.len(), 3000);
        assert_eq!(grid.points()[0], -1.5);
        assert!((grid.points()[2999] - 1.499).abs() < 1e-12);
    }

    #[test]
    fn output_grid_includes_upper_edge() {
        let grid = GridSpec::OUTPUT.build().expect("grid");
        assert_eq!(grid.len(), 301);
        assert!((grid.points()[300] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn empty_when_stop_precedes_start() {
        let grid = Grid::arange(1.0, 0.0, 0.1).expect("grid");
        assert!(grid.is_empty());
    }

    #[test]
    fn oversized_grid_is_a_config_error() {
        let spec = GridSpec {
            start: -1.5,
            stop: 1.51,
            step: 1e-300,
        };
        match spec.build() {
            Err(FesError::Config(info)) => assert_eq!(info.code, "grid_size"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(spec.point_count().is_err());
    }

    #[test]
    fn rejects_non_positive_step() {
        assert!(matches!(
            Grid::arange(0.0, 1.0, 0.0),
            Err(FesError::Config(_))
        ));
    }
}
