use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use fes_core::errors::FesError;
use fes_core::provenance::{RunProvenance, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::mlp::{DenseLayer, TrainingSummary};
use crate::output::io_error;
use crate::serde::to_canonical_json_bytes;

/// Schema of [`RunReport`].
pub const REPORT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Network parameters of one layer in plain nested vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerReport {
    /// Row-major `fan_in x fan_out` weights.
    pub weights: Vec<Vec<f64>>,
    /// Biases, one per output unit.
    pub biases: Vec<f64>,
}

impl From<&DenseLayer> for LayerReport {
    fn from(layer: &DenseLayer) -> Self {
        Self {
            weights: layer.weight_rows(),
            biases: layer.biases.iter().copied().collect(),
        }
    }
}

/// Machine readable record of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version of this payload.
    pub schema_version: SchemaVersion,
    /// Inputs, seeds and tool versions.
    pub provenance: RunProvenance,
    /// Number of replicas aggregated.
    pub replicas: usize,
    /// Smoothing grid size.
    pub smoothing_points: usize,
    /// Training set size.
    pub n_train: usize,
    /// Held-out set size.
    pub n_test: usize,
    /// R² of the network on the held-out set.
    pub r2_test: f64,
    /// Optimiser record.
    pub training: TrainingSummary,
    /// Network parameters from input to output.
    pub layers: Vec<LayerReport>,
    /// Output grid size.
    pub output_points: usize,
    /// SHA256 of the written curve file.
    pub fes_hash: String,
}

/// Tool versions stamped into provenance.
pub fn tool_versions() -> BTreeMap<String, String> {
    [
        ("fes-core".to_string(), fes_core::VERSION.to_string()),
        ("fes-fit".to_string(), env!("CARGO_PKG_VERSION").to_string()),
    ]
    .into_iter()
    .collect()
}

/// Writes the report as canonical JSON.
pub fn write_report<P: AsRef<Path>>(path: P, report: &RunReport) -> Result<(), FesError> {
    let path = path.as_ref();
    let bytes = to_canonical_json_bytes(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| io_error("report_dir", err, path))?;
    }
    fs::write(path, bytes).map_err(|err| io_error("report_write", err, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_versions_track_crate_versions() {
        let versions = tool_versions();
        assert_eq!(versions.get("fes-core").map(String::as_str), Some(fes_core::VERSION));
        assert_eq!(
            versions.get("fes-fit").map(String::as_str),
            Some(env!("CARGO_PKG_VERSION"))
        );
    }
}
