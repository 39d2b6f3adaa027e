#![deny(missing_docs)]
#![doc = "Moment-prior e-process for the two-sample t-test: e-values that stay valid under optional stopping, the confidence intervals they imply, and a sequential runner."]

pub mod mom;
pub mod sequential;
pub mod tstat;

pub use mom::{ConfidenceInterval, Mom};
pub use sequential::{Decision, Group, SequentialTest, Step};
pub use tstat::TStatistic;
