//! Provenance and schema descriptors attached to serialized reports.

use serde::{Deserialize, Serialize};

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance recorded alongside every simulated plan or study.
///
/// Together with the inputs echoed in the report, these fields are enough to
/// reproduce a Monte-Carlo result bit for bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanProvenance {
    /// Schema version of the enclosing payload.
    pub schema_version: SchemaVersion,
    /// Master seed from which every trial stream was derived.
    pub seed: u64,
    /// Number of simulated trials.
    pub num_samples: usize,
    /// Group allocation ratio used by the simulation.
    pub ratio: f64,
    /// Version of the crate that produced the payload.
    pub tool_version: String,
}
