//! Data quality evaluation module.
//!
//! Scores residual missingness, duplication, outliers, skew, scaling and
//! encoding completeness of a table.

mod evaluator;

pub use evaluator::QualityEvaluator;
