//! Quality scoring of a table.
//!
//! Counts residual missing cells, duplicate rows, IQR outliers, skewed and
//! unscaled numeric columns, and leftover text columns, then turns them into
//! capped penalties on a 100-point score.

use crate::cleaner::count_outliers;
use crate::config::CleaningConfig;
use crate::error::Result;
use crate::profiler::statistics::{mean, sample_std, skewness};
use crate::types::{ColumnKind, QualityPenalties, QualityRatios, QualityReport};
use crate::utils::{duplicate_row_count, numeric_values, present_values, round_to};
use polars::prelude::*;
use tracing::{debug, info};

const MISSING_PENALTY_CAP: f64 = 40.0;
const DUPLICATE_PENALTY_CAP: f64 = 15.0;
const OUTLIER_PENALTY_CAP: f64 = 15.0;
const SKEW_PENALTY_WEIGHT: f64 = 15.0;
const SCALING_PENALTY_WEIGHT: f64 = 15.0;
const ENCODING_PENALTY: f64 = 10.0;

/// Audits a table and scores how analysis-ready it is.
///
/// The evaluator is independent of the cleaning pipeline: it can be pointed
/// at any table and never modifies it. Outliers and skew are measured the
/// same way the cleaner measures them.
#[derive(Debug, Clone, Default)]
pub struct QualityEvaluator {
    config: CleaningConfig,
}

/// Per-column numeric signals.
#[derive(Debug, Default)]
struct NumericSignals {
    missing: usize,
    outliers: usize,
    skewed: bool,
    well_scaled: bool,
}

impl QualityEvaluator {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    /// Compute the quality report of a table.
    ///
    /// Score starts at 100 and loses:
    /// - missing: `min(40, missing_ratio * 100)`
    /// - duplicates: `min(15, duplicate_ratio * 100)`
    /// - outliers: `min(15, outlier_ratio * 100)`
    /// - skew: `skew_ratio * 15`
    /// - scaling: `(1 - scaling_ratio) * 15`
    /// - encoding: 10 if any text column remains
    ///
    /// The result is clamped to [0, 100] and rounded to 2 decimals.
    pub fn evaluate(&self, df: &DataFrame) -> Result<QualityReport> {
        info!(
            "Evaluating quality of {} rows x {} columns",
            df.height(),
            df.width()
        );

        let rows = df.height();
        let columns = df.width();
        let mut missing_count = 0;
        let mut outlier_count = 0;
        let mut skewed_column_count = 0;
        let mut numeric_column_count = 0;
        let mut properly_scaled_count = 0;
        let mut text_columns = 0;

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            match ColumnKind::from_dtype(series.dtype()) {
                ColumnKind::Numeric => {
                    let signals = self.numeric_signals(series)?;
                    numeric_column_count += 1;
                    missing_count += signals.missing;
                    outlier_count += signals.outliers;
                    skewed_column_count += usize::from(signals.skewed);
                    properly_scaled_count += usize::from(signals.well_scaled);
                }
                kind => {
                    missing_count += series.null_count();
                    text_columns += usize::from(kind.is_text());
                }
            }
        }

        let duplicate_count = duplicate_row_count(df)?;
        let total_cells = rows * columns;
        let ratio = |count: usize, total: usize| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            }
        };

        let ratios = QualityRatios {
            missing: ratio(missing_count, total_cells),
            duplicate: ratio(duplicate_count, rows),
            outlier: ratio(outlier_count, total_cells),
            skew: ratio(skewed_column_count, numeric_column_count.max(1)),
            scaling: if numeric_column_count == 0 || rows == 0 {
                1.0
            } else {
                ratio(properly_scaled_count, numeric_column_count)
            },
        };

        let encoded_ok = text_columns == 0;
        let penalties = QualityPenalties {
            missing: (ratios.missing * 100.0).min(MISSING_PENALTY_CAP),
            duplicate: (ratios.duplicate * 100.0).min(DUPLICATE_PENALTY_CAP),
            outlier: (ratios.outlier * 100.0).min(OUTLIER_PENALTY_CAP),
            skew: ratios.skew * SKEW_PENALTY_WEIGHT,
            scaling: (1.0 - ratios.scaling) * SCALING_PENALTY_WEIGHT,
            encoding: if encoded_ok { 0.0 } else { ENCODING_PENALTY },
        };
        let score = round_to((100.0 - penalties.total()).clamp(0.0, 100.0), 2);

        let report = QualityReport {
            rows,
            columns,
            missing_count,
            duplicate_count,
            outlier_count,
            skewed_column_count,
            numeric_column_count,
            non_numeric_column_count: columns - numeric_column_count,
            properly_scaled_count,
            encoded_ok,
            memory_mb: df.estimated_size() as f64 / (1024.0 * 1024.0),
            ratios,
            penalties,
            score,
        };

        info!("Quality score: {:.2}/100", report.score);
        Ok(report)
    }

    fn numeric_signals(&self, series: &Series) -> Result<NumericSignals> {
        let values = numeric_values(series)?;
        let present = present_values(&values);
        let name = series.name().as_str();

        let skewed = match skewness(&present, name) {
            Ok(skew) => skew.abs() > self.config.skew_threshold,
            Err(e) if e.is_column_local() => false,
            Err(e) => return Err(e),
        };

        let well_scaled = match (mean(&present), sample_std(&present)) {
            (Some(m), Some(s)) => {
                m.abs() < self.config.scaled_mean_tolerance
                    && s > self.config.scaled_std_min
                    && s < self.config.scaled_std_max
            }
            _ => false,
        };

        let signals = NumericSignals {
            missing: values.len() - present.len(),
            outliers: count_outliers(series, self.config.iqr_multiplier)?,
            skewed,
            well_scaled,
        };
        debug!("Quality signals for '{}': {:?}", name, signals);
        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_perfect_table_scores_100() {
        let df = df! {
            "a" => &[-1.0, 0.0, 1.0],
            "flag" => &[true, false, true],
        }
        .unwrap();

        let report = QualityEvaluator::default().evaluate(&df).unwrap();
        assert_eq!(report.score, 100.0);
        assert!(report.encoded_ok);
        assert_eq!(report.numeric_column_count, 1);
        assert_eq!(report.non_numeric_column_count, 1);
        assert_eq!(report.properly_scaled_count, 1);
    }

    #[test]
    fn test_penalties_and_counts() {
        // 10 rows, one duplicate, one missing, one text column
        let df = df! {
            "x" => &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(6.0), Some(7.0), Some(8.0), None, Some(8.0)],
            "t" => &["a", "b", "c", "d", "e", "f", "g", "h", "i", "h"],
        }
        .unwrap();

        let report = QualityEvaluator::default().evaluate(&df).unwrap();
        assert_eq!(report.rows, 10);
        assert_eq!(report.missing_count, 1);
        assert_eq!(report.duplicate_count, 1);
        assert!(!report.encoded_ok);

        assert_eq!(report.penalties.missing, 5.0); // 1 / 20 cells
        assert_eq!(report.penalties.duplicate, 10.0);
        assert_eq!(report.penalties.encoding, 10.0);
        // x is not standardized
        assert_eq!(report.penalties.scaling, 15.0);
        let expected = round_to(100.0 - report.penalties.total(), 2);
        assert_eq!(report.score, expected);
    }

    #[test]
    fn test_missing_penalty_is_capped() {
        let df = df! {
            "x" => &[None::<f64>, None, None, Some(1.0)],
        }
        .unwrap();
        let report = QualityEvaluator::default().evaluate(&df).unwrap();
        assert_eq!(report.penalties.missing, 40.0);
    }

    #[test]
    fn test_outliers_and_skew_detected() {
        let df = df! {
            "x" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 1000.0],
        }
        .unwrap();
        let report = QualityEvaluator::default().evaluate(&df).unwrap();
        assert_eq!(report.outlier_count, 1);
        assert_eq!(report.skewed_column_count, 1);
        assert_eq!(report.penalties.skew, 15.0);
        assert_eq!(report.penalties.outlier, 10.0);
    }

    #[test]
    fn test_score_never_negative() {
        let df = df! {
            "x" => &[None::<f64>, None, Some(1.0), Some(1.0), Some(1000.0), Some(1.0)],
            "t" => &[None::<&str>, None, Some("a"), Some("a"), Some("b"), Some("a")],
        }
        .unwrap();
        let report = QualityEvaluator::default().evaluate(&df).unwrap();
        assert!((0.0..=100.0).contains(&report.score));
    }

    #[test]
    fn test_empty_table() {
        let df = df! { "x" => Vec::<f64>::new() }.unwrap();
        let report = QualityEvaluator::default().evaluate(&df).unwrap();
        assert_eq!(report.rows, 0);
        assert_eq!(report.score, 100.0);
    }

    #[test]
    fn test_does_not_modify_input() {
        let df = df! { "t" => &["a", "b"] }.unwrap();
        let snapshot = df.clone();
        let _ = QualityEvaluator::default().evaluate(&df).unwrap();
        assert!(df.equals_missing(&snapshot));
    }
}
