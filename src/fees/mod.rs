//! Fee Estimation Module
//!
//! Recommended base fee and congestion level from Horizon fee stats.

mod estimator;

pub use estimator::*;
