#![deny(missing_docs)]
#![doc = "Numerical primitives behind the e-value crates: special functions, monotone bracketing, Brent root finding and the noncentral t distribution."]

/// Noncentral t distribution (AS 243 CDF and its inverse).
pub mod noncentral_t;
/// Bracket expansion and bracketed root finding.
pub mod root;
/// Special functions used by the e-value formulas.
pub mod special;

pub use noncentral_t::NoncentralT;
pub use root::{brent, find_bracket_mono, BRACKET_MAX_EXPANSIONS, BRENT_MAX_ITERATIONS};
pub use special::{hyp2f1, ln_gamma, normal_cdf, normal_quantile, reg_inc_beta};
