#![deny(missing_docs)]
#![doc = "Shared error surface, deterministic RNG handles and provenance descriptors for the anytime-valid testing crates."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, EvalueError};
pub use provenance::{PlanProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};

/// Returns an error when `alpha` is not a valid significance level in `(0, 1)`.
pub fn check_alpha(alpha: f64) -> Result<(), EvalueError> {
    check_open_unit("alpha", alpha)
}

/// Returns an error when `value` does not lie in the open interval `(0, 1)`.
pub fn check_open_unit(name: &str, value: f64) -> Result<(), EvalueError> {
    if value > 0.0 && value < 1.0 {
        return Ok(());
    }
    Err(EvalueError::Domain(
        ErrorInfo::new("out-of-range", format!("{name} must lie in (0, 1)"))
            .with_context(name, value.to_string()),
    ))
}
