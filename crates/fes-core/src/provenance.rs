//! Provenance and schema descriptors attached to run reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the run report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Bumped when a report field is removed or changes meaning.
    pub major: u32,
    /// Bumped when report fields are added.
    pub minor: u32,
    /// Bumped for fixes that keep the layout.
    pub patch: u32,
}

impl SchemaVersion {
    /// `major.minor.patch`.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

/// Where a report came from: configuration, inputs, seeds and build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProvenance {
    /// Hash of the canonical pipeline configuration.
    pub config_hash: String,
    /// SHA-256 of each trajectory input keyed by its configured path.
    pub input_hashes: BTreeMap<String, String>,
    /// Seed used for the train/test split.
    pub split_seed: u64,
    /// Seed used for network initialisation and minibatch shuffling.
    pub network_seed: u64,
    /// RFC 3339 timestamp recording when the report was generated.
    pub created_at: String,
    /// Crate name to version.
    pub tool_versions: BTreeMap<String, String>,
}
