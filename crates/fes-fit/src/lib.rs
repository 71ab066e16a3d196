#![deny(missing_docs)]
#![doc = "Free-energy surface estimation from steered MD replicas: kernel ridge smoothing, cumulant aggregation and a neural refit."]

/// Trajectory file loading.
pub mod colvar;
/// Pipeline configuration.
pub mod config;
/// Second-order cumulant aggregation.
pub mod cumulant;
/// Evaluation grids.
pub mod grid;
/// Canonical hashing helpers.
pub mod hash;
/// Kernel ridge smoother.
pub mod krr;
/// Regression metrics.
pub mod metrics;
/// Feed-forward network regressor.
pub mod mlp;
/// Curve file writer.
pub mod output;
/// Stage orchestration.
pub mod pipeline;
/// Run report assembly.
pub mod report;
/// Canonical JSON and YAML helpers.
pub mod serde;
/// Train/test partitioning.
pub mod split;

pub use colvar::{load_colvar, parse_colvar, ColumnSpec, ColvarSamples};
pub use config::{load_config, load_config_or_default, PipelineConfig, CONFIG_FILE};
pub use cumulant::{column_moments, cumulant_fes, ColumnMoments, ReplicaStack};
pub use grid::{Grid, GridSpec};
pub use krr::{smooth_replica, KernelRidge, KernelRidgeFit};
pub use metrics::r2_score;
pub use mlp::{Activation, DenseLayer, MlpModel, MlpOpts, TrainingSummary};
pub use output::{format_fes, write_fes};
pub use pipeline::{aggregate, fit_network, run_pipeline, NetworkFit, PipelineOutcome, SmoothedReplicas};
pub use report::{LayerReport, RunReport};
pub use split::{train_test_split, SplitOpts, TrainTestSplit};
