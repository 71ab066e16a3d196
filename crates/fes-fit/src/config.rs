use std::fs;
use std::path::{Path, PathBuf};

use fes_core::errors::{ErrorInfo, FesError};
use fes_core::DEFAULT_KT;
use serde::{Deserialize, Serialize};

use crate::colvar::ColumnSpec;
use crate::grid::GridSpec;
use crate::hash::stable_hash_string;
use crate::krr::KernelRidge;
use crate::mlp::MlpOpts;
use crate::serde::{from_yaml_slice, to_yaml_string};
use crate::split::SplitOpts;

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "fes.yaml";

fn default_inputs() -> Vec<PathBuf> {
    (1..=5)
        .map(|idx| PathBuf::from(format!("smd{idx}/colvar")))
        .collect()
}

fn default_kt() -> f64 {
    DEFAULT_KT
}

fn default_smoothing_grid() -> GridSpec {
    GridSpec::SMOOTHING
}

fn default_output_grid() -> GridSpec {
    GridSpec::OUTPUT
}

/// Output file locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPaths {
    /// Fitted curve text file.
    #[serde(default = "OutputPaths::default_fes")]
    pub fes: PathBuf,
    /// JSON run report; omitted when `None`.
    #[serde(default = "OutputPaths::default_report")]
    pub report: Option<PathBuf>,
}

impl OutputPaths {
    fn default_fes() -> PathBuf {
        PathBuf::from("fes.txt")
    }

    fn default_report() -> Option<PathBuf> {
        Some(PathBuf::from("fes_report.json"))
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            fes: Self::default_fes(),
            report: Self::default_report(),
        }
    }
}

/// Full description of one pipeline run.
///
/// Every field defaults to the reference protocol: five replicas under
/// `smdN/colvar`, kernel ridge with `alpha = 0.1`, kT = 2.4943389 kJ/mol, a
/// 90/10 split seeded with 9531 and a 12-unit tanh network seeded with 57451.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Replica trajectory files, relative to the run directory.
    #[serde(default = "default_inputs")]
    pub inputs: Vec<PathBuf>,
    /// Column layout shared by all replicas.
    #[serde(default)]
    pub columns: ColumnSpec,
    /// Grid on which replicas are smoothed and aggregated.
    #[serde(default = "default_smoothing_grid")]
    pub smoothing_grid: GridSpec,
    /// Kernel ridge settings.
    #[serde(default)]
    pub kernel: KernelRidge,
    /// Thermal energy used by the cumulant correction.
    #[serde(default = "default_kt")]
    pub kt: f64,
    /// Train/test partition of the aggregated curve.
    #[serde(default)]
    pub split: SplitOpts,
    /// Network settings.
    #[serde(default)]
    pub network: MlpOpts,
    /// Grid on which the network is evaluated for output.
    #[serde(default = "default_output_grid")]
    pub output_grid: GridSpec,
    /// Output files.
    #[serde(default)]
    pub output: OutputPaths,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inputs: default_inputs(),
            columns: ColumnSpec::default(),
            smoothing_grid: default_smoothing_grid(),
            kernel: KernelRidge::default(),
            kt: default_kt(),
            split: SplitOpts::default(),
            network: MlpOpts::default(),
            output_grid: default_output_grid(),
            output: OutputPaths::default(),
        }
    }
}

fn invalid(code: &str, message: &str, key: &str, value: impl ToString) -> FesError {
    FesError::Config(ErrorInfo::new(code, message).with_context(key, value.to_string()))
}

impl PipelineConfig {
    /// Rejects configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<(), FesError> {
        if self.inputs.is_empty() {
            return Err(FesError::Config(ErrorInfo::new(
                "inputs_empty",
                "at least one replica input is required",
            )));
        }
        if !(self.kt.is_finite() && self.kt > 0.0) {
            return Err(invalid("kt_non_positive", "kT must be positive", "kt", self.kt));
        }
        if !(self.kernel.alpha.is_finite() && self.kernel.alpha >= 0.0) {
            return Err(invalid(
                "kernel_alpha",
                "kernel alpha must be non-negative",
                "alpha",
                self.kernel.alpha,
            ));
        }
        if let Some(gamma) = self.kernel.gamma {
            if !(gamma.is_finite() && gamma > 0.0) {
                return Err(invalid("kernel_gamma", "kernel gamma must be positive", "gamma", gamma));
            }
        }
        for (name, grid) in [("smoothing_grid", &self.smoothing_grid), ("output_grid", &self.output_grid)] {
            if !(grid.step.is_finite() && grid.step > 0.0) || !(grid.stop > grid.start) {
                return Err(FesError::Config(
                    ErrorInfo::new("grid_range", "grid must have positive step and stop > start")
                        .with_context("grid", name),
                ));
            }
            grid.point_count().map_err(|err| {
                FesError::Config(err.info().clone().with_context("grid", name))
            })?;
        }
        if !(self.split.test_fraction > 0.0 && self.split.test_fraction < 1.0) {
            return Err(invalid(
                "split_fraction",
                "test fraction must lie in (0, 1)",
                "test_fraction",
                self.split.test_fraction,
            ));
        }
        self.network.validate()
    }

    /// Canonical hash recorded in run provenance.
    pub fn config_hash(&self) -> Result<String, FesError> {
        stable_hash_string(self)
    }

    /// YAML rendering of the configuration.
    pub fn to_yaml_string(&self) -> Result<String, FesError> {
        to_yaml_string(self)
    }
}

/// Loads and validates a YAML configuration.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, FesError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        FesError::Io(
            ErrorInfo::new("config_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let config: PipelineConfig = from_yaml_slice(&bytes)?;
    config.validate()?;
    Ok(config)
}

/// Loads `fes.yaml` from `dir` when present, otherwise the defaults.
pub fn load_config_or_default<P: AsRef<Path>>(dir: P) -> Result<PipelineConfig, FesError> {
    let candidate = dir.as_ref().join(CONFIG_FILE);
    if candidate.is_file() {
        load_config(candidate)
    } else {
        Ok(PipelineConfig::default())
    }
}
