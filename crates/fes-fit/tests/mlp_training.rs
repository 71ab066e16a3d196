use fes_fit::metrics::r2_score;
use fes_fit::mlp::{Activation, MlpOpts};
use proptest::prelude::*;

fn quadratic(n: usize) -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..n).map(|i| -1.5 + 3.0 * i as f64 / (n - 1) as f64).collect();
    let y = x.iter().map(|v| 2.0 * v * v - 1.0).collect();
    (x, y)
}

fn quick_opts() -> MlpOpts {
    MlpOpts {
        learning_rate: 0.01,
        max_iter: 1500,
        ..MlpOpts::default()
    }
}

#[test]
fn network_learns_a_smooth_curve() {
    let (x, y) = quadratic(80);
    let model = quick_opts().fit(&x, &y).expect("fit");
    let score = model.score(&x, &y).expect("score");
    assert!(score > 0.9, "r2 = {score}");
    assert!(score <= 1.0);
    assert!(model.summary().final_loss.is_finite());
    assert_eq!(model.summary().loss_curve.len(), model.summary().n_iter);
}

#[test]
fn training_is_deterministic_for_fixed_seed() {
    let (x, y) = quadratic(40);
    let opts = MlpOpts {
        max_iter: 200,
        ..quick_opts()
    };
    let a = opts.fit(&x, &y).expect("fit");
    let b = opts.fit(&x, &y).expect("fit");
    assert_eq!(a, b);
    assert_eq!(a.predict(&x), b.predict(&x));

    let other = MlpOpts { seed: 1, ..opts }.fit(&x, &y).expect("fit");
    assert_ne!(a.layers(), other.layers());
}

#[test]
fn loose_tolerance_stops_early() {
    let (x, y) = quadratic(40);
    let opts = MlpOpts {
        tol: 1e3,
        n_iter_no_change: 2,
        ..quick_opts()
    };
    let model = opts.fit(&x, &y).expect("fit");
    assert!(model.summary().converged);
    assert_eq!(model.summary().n_iter, 4);
}

#[test]
fn identity_network_fits_a_line() {
    let x: Vec<f64> = (0..30).map(|i| i as f64 / 10.0).collect();
    let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 0.5).collect();
    let opts = MlpOpts {
        hidden_layers: vec![4],
        activation: Activation::Identity,
        learning_rate: 0.01,
        max_iter: 3000,
        ..MlpOpts::default()
    };
    let model = opts.fit(&x, &y).expect("fit");
    assert!(model.score(&x, &y).expect("score") > 0.98);
}

#[test]
fn mismatched_lengths_are_rejected() {
    assert!(MlpOpts::default().fit(&[0.0, 1.0], &[0.0]).is_err());
    assert!(MlpOpts::default().fit(&[], &[]).is_err());
}

proptest! {
    #[test]
    fn r2_is_bounded_above_by_one(
        pairs in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 1..40),
    ) {
        let (truth, pred): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let score = r2_score(&truth, &pred).unwrap();
        prop_assert!(score <= 1.0);
        prop_assert!(!score.is_nan());
    }
}
