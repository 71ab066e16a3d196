use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use fes_core::errors::FesError;
use fes_core::provenance::RunProvenance;
use tracing::{debug, info};

use crate::colvar::read_colvar;
use crate::config::PipelineConfig;
use crate::cumulant::{cumulant_fes, ReplicaStack};
use crate::grid::Grid;
use crate::hash::sha256_hex;
use crate::krr::smooth_replica;
use crate::mlp::MlpModel;
use crate::output::write_fes;
use crate::report::{tool_versions, write_report, LayerReport, RunReport, REPORT_SCHEMA};
use crate::split::train_test_split;

/// Replica curves on the smoothing grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedReplicas {
    /// Smoothing grid.
    pub grid: Grid,
    /// One curve per input, in input order.
    pub curves: Vec<Vec<f64>>,
    /// SHA256 of each input keyed by its configured path.
    pub input_hashes: BTreeMap<String, String>,
}

/// Network fitted to the aggregated curve.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkFit {
    /// Trained model.
    pub model: MlpModel,
    /// R² on the held-out set.
    pub r2_test: f64,
    /// Training set size.
    pub n_train: usize,
    /// Held-out set size.
    pub n_test: usize,
}

/// Everything produced by [`run_pipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// Stage one output.
    pub replicas: SmoothedReplicas,
    /// Cumulant estimate on the smoothing grid.
    pub fes: Vec<f64>,
    /// Stage three output.
    pub network: NetworkFit,
    /// Output grid.
    pub output_grid: Grid,
    /// Network predictions on the output grid.
    pub predictions: Vec<f64>,
    /// Report written alongside the curve.
    pub report: RunReport,
}

/// Stage one: kernel ridge smoothing of every replica on the shared grid.
pub fn smooth_replicas(config: &PipelineConfig, base_dir: &Path) -> Result<SmoothedReplicas, FesError> {
    let grid = config.smoothing_grid.build()?;
    let mut curves = Vec::with_capacity(config.inputs.len());
    let mut input_hashes = BTreeMap::new();
    for input in &config.inputs {
        let (samples, digest) = read_colvar(base_dir.join(input), &config.columns)?;
        debug!(input = %input.display(), samples = samples.len(), "smoothing replica");
        curves.push(smooth_replica(&samples, &grid, &config.kernel)?);
        input_hashes.insert(input.display().to_string(), digest);
    }
    info!(replicas = curves.len(), points = grid.len(), "replicas smoothed");
    Ok(SmoothedReplicas {
        grid,
        curves,
        input_hashes,
    })
}

/// Stage two: cumulant aggregation of the smoothed replicas.
pub fn aggregate(curves: &[Vec<f64>], kt: f64) -> Result<Vec<f64>, FesError> {
    let stack = ReplicaStack::from_curves(curves)?;
    let fes = cumulant_fes(&stack, kt)?;
    info!(replicas = stack.replicas(), kt, "cumulant estimate assembled");
    Ok(fes)
}

/// Stage three: split, train the network and score it on the held-out points.
pub fn fit_network(config: &PipelineConfig, grid: &Grid, fes: &[f64]) -> Result<NetworkFit, FesError> {
    let split = train_test_split(grid.points(), fes, &config.split)?;
    info!(
        train = split.x_train.len(),
        test = split.x_test.len(),
        "training network"
    );
    let model = config.network.fit(&split.x_train, &split.y_train)?;
    let r2_test = model.score(&split.x_test, &split.y_test)?;
    info!(
        epochs = model.summary().n_iter,
        loss = model.summary().final_loss,
        r2 = r2_test,
        "network trained"
    );
    Ok(NetworkFit {
        model,
        r2_test,
        n_train: split.x_train.len(),
        n_test: split.x_test.len(),
    })
}

/// Runs all stages against inputs under `base_dir` and writes the outputs there.
pub fn run_pipeline(config: &PipelineConfig, base_dir: &Path) -> Result<PipelineOutcome, FesError> {
    config.validate()?;
    let replicas = smooth_replicas(config, base_dir)?;
    let fes = aggregate(&replicas.curves, config.kt)?;
    let network = fit_network(config, &replicas.grid, &fes)?;

    let output_grid = config.output_grid.build()?;
    let predictions = network.model.predict(output_grid.points());
    let fes_path = base_dir.join(&config.output.fes);
    let fes_bytes = write_fes(&fes_path, &output_grid, &predictions)?;
    info!(path = %fes_path.display(), points = output_grid.len(), "free-energy curve written");

    let report = RunReport {
        schema_version: REPORT_SCHEMA,
        provenance: RunProvenance {
            config_hash: config.config_hash()?,
            input_hashes: replicas.input_hashes.clone(),
            split_seed: config.split.seed,
            network_seed: config.network.seed,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tool_versions: tool_versions(),
        },
        replicas: replicas.curves.len(),
        smoothing_points: replicas.grid.len(),
        n_train: network.n_train,
        n_test: network.n_test,
        r2_test: network.r2_test,
        training: network.model.summary().clone(),
        layers: network.model.layers().iter().map(LayerReport::from).collect(),
        output_points: output_grid.len(),
        fes_hash: sha256_hex(&fes_bytes),
    };
    if let Some(report_path) = &config.output.report {
        write_report(base_dir.join(report_path), &report)?;
    }

    Ok(PipelineOutcome {
        replicas,
        fes,
        network,
        output_grid,
        predictions,
        report,
    })
}
