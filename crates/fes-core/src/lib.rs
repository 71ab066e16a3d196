#![deny(missing_docs)]
#![doc = "Shared error, seeding and provenance types for the SMD cumulant free-energy pipeline."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, FesError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};

/// Version of this crate, stamped into run provenance.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Thermal energy in kJ/mol at 300 K used by the cumulant correction.
pub const DEFAULT_KT: f64 = 2.4943389;
