use fes_core::errors::{ErrorInfo, FesError};

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// A constant target gives `1.0` for a perfect prediction and `0.0` otherwise,
/// so the score never exceeds one and is always finite.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64, FesError> {
    if y_true.len() != y_pred.len() {
        return Err(FesError::shape("r2_len", "prediction", y_true.len(), y_pred.len()));
    }
    if y_true.is_empty() {
        return Err(FesError::Shape(ErrorInfo::new(
            "r2_empty",
            "r2 requires at least one sample",
        )));
    }
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean) * (y - mean)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p) * (y - p))
        .sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_scores_one() {
        let y = [1.0, 2.0, 4.0];
        assert_eq!(r2_score(&y, &y).expect("r2"), 1.0);
    }

    #[test]
    fn mean_prediction_scores_zero() {
        let y = [1.0, 2.0, 3.0];
        assert!(r2_score(&y, &[2.0, 2.0, 2.0]).expect("r2").abs() < 1e-15);
    }

    #[test]
    fn constant_target_is_finite() {
        assert_eq!(r2_score(&[5.0, 5.0], &[5.0, 4.0]).expect("r2"), 0.0);
    }
}
