//! Data cleaning module for preprocessing datasets.
//!
//! [`DataCleaner::clean`] runs the cleaning stages in a fixed order, each one
//! relying on what the previous ones guarantee:
//! 1. Drop columns whose null ratio is above the threshold
//! 2. Remove duplicate rows
//! 3. Normalize text and convert numeric-looking text columns
//! 4. Impute missing values (median / placeholder)
//! 5. Cap outliers to IQR bounds
//! 6. Log-transform strongly skewed columns
//! 7. Remove rows that became duplicates during cleaning
//! 8. Narrow storage types
//!
//! A problem confined to one column never aborts the run: the column is left
//! as it was and the problem is recorded as a diagnostic.

mod converters;
mod outliers;
mod sanitizers;
mod skew;

pub(crate) use outliers::count_outliers;

use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::imputers::StatisticalImputer;
use crate::optimizer::MemoryOptimizer;
use crate::profiler::DataProfiler;
use crate::transform::Transform;
use crate::types::{CleaningOutcome, CleaningStage, ColumnKind, DatasetProfile, Diagnostic};
use crate::utils::{column_names, drop_duplicate_rows, float_series, nans_to_nulls, string_values};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Data cleaner for automatic dataset cleaning operations.
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    config: CleaningConfig,
}

impl DataCleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean a table. The input is never modified.
    ///
    /// Deterministic for a fixed input and configuration. A table with zero
    /// rows or zero columns is passed through with an `EMPTY_TABLE`
    /// diagnostic.
    pub fn clean(&self, df: &DataFrame) -> Result<CleaningOutcome> {
        let mut diagnostics = Vec::new();
        // NaN is missing from here on
        let df = &nans_to_nulls(df)?;
        let initial_profile = DataProfiler::profile(df)?;

        if initial_profile.is_empty() {
            let error = CleaningError::EmptyTable {
                rows: df.height(),
                columns: df.width(),
            };
            warn!("{}", error);
            diagnostics.push(Diagnostic::from_error(CleaningStage::Profiling, &error));
            return Ok(CleaningOutcome {
                data: df.clone(),
                initial_profile,
                dropped_columns: Vec::new(),
                duplicates_removed: 0,
                coerced_columns: Vec::new(),
                skew_corrected_columns: Vec::new(),
                diagnostics,
            });
        }

        info!(
            "Cleaning dataset with {} rows and {} columns",
            df.height(),
            df.width()
        );

        // 1. Column pruning
        let (mut df, dropped_columns) =
            self.prune_columns(df, &initial_profile, &mut diagnostics);

        // 2. Deduplication
        let mut duplicates_removed =
            Self::deduplicate(&mut df, CleaningStage::Deduplication, &mut diagnostics)?;

        // 3. Text normalization and numeric coercion
        let coerced_columns = self.normalize_text(&mut df, &mut diagnostics)?;

        // Kinds are fixed from here on
        let profile = DataProfiler::profile(&df)?;
        let numeric_columns = profile.columns_of_kind(ColumnKind::Numeric);

        // 4. Imputation
        self.impute(&mut df, &profile, &mut diagnostics)?;

        // 5. Outlier capping
        self.cap_outliers(&mut df, &numeric_columns, &mut diagnostics)?;

        // 6. Skew correction
        let skew_corrected_columns =
            self.correct_skew(&mut df, &numeric_columns, &mut diagnostics)?;

        // 7. Rows made equal by the stages above
        duplicates_removed +=
            Self::deduplicate(&mut df, CleaningStage::Deduplication, &mut diagnostics)?;

        // 8. Memory optimization
        info!("Optimizing memory usage...");
        let data = MemoryOptimizer::from_config(&self.config).apply(&df, &mut diagnostics)?;

        info!(
            "Cleaning complete: {} rows, {} columns",
            data.height(),
            data.width()
        );

        Ok(CleaningOutcome {
            data,
            initial_profile,
            dropped_columns,
            duplicates_removed,
            coerced_columns,
            skew_corrected_columns,
            diagnostics,
        })
    }

    fn prune_columns(
        &self,
        df: &DataFrame,
        profile: &DatasetProfile,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (DataFrame, Vec<String>) {
        let threshold = self.config.null_drop_threshold;
        let high_missing_cols: Vec<String> = profile
            .column_profiles
            .iter()
            .filter(|col| col.null_ratio > threshold)
            .map(|col| col.name.clone())
            .collect();

        if high_missing_cols.is_empty() {
            debug!(
                "No columns with >{:.0}% missing values found",
                threshold * 100.0
            );
            return (df.clone(), high_missing_cols);
        }

        let cols_ref: Vec<PlSmallStr> = high_missing_cols
            .iter()
            .map(|s| s.as_str().into())
            .collect();
        let pruned = df.drop_many(cols_ref);

        info!(
            "Removed {} columns with >{:.0}% missing values",
            high_missing_cols.len(),
            threshold * 100.0
        );
        diagnostics.push(Diagnostic::info(
            CleaningStage::ColumnPruning,
            "COLUMNS_DROPPED",
            format!(
                "Removed {} columns with >{:.0}% missing values: {:?}",
                high_missing_cols.len(),
                threshold * 100.0,
                high_missing_cols
            ),
        ));

        (pruned, high_missing_cols)
    }

    fn deduplicate(
        df: &mut DataFrame,
        stage: CleaningStage,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<usize> {
        let before = df.height();
        *df = drop_duplicate_rows(df)?;
        let removed = before - df.height();

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            info!("Removed {} duplicate rows ({:.1}%)", removed, pct);
            diagnostics.push(Diagnostic::info(
                stage,
                "DUPLICATES_REMOVED",
                format!("Removed {removed} duplicate rows ({pct:.1}%)"),
            ));
        } else {
            debug!("No duplicate rows found");
        }
        Ok(removed)
    }

    /// Normalize every non-numeric column and convert the ones that are
    /// mostly numbers. Returns the converted column names.
    fn normalize_text(
        &self,
        df: &mut DataFrame,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<String>> {
        let mut coerced = Vec::new();
        let mut normalized = 0;

        for name in column_names(df) {
            let series = df.column(&name)?.as_materialized_series().clone();
            if ColumnKind::from_dtype(series.dtype()).is_numeric() {
                continue;
            }

            let values = match string_values(&series) {
                Ok(values) => values,
                Err(e) => {
                    let error = CleaningError::unparseable(
                        &name,
                        format!("{} values cannot be read as text: {}", series.dtype(), e),
                    );
                    recover(CleaningStage::TextNormalization, error, diagnostics)?;
                    continue;
                }
            };

            let (values, changed) = sanitizers::normalize_values(&values);
            normalized += 1;
            let parse = converters::parse_numeric(&values);

            if parse.should_convert(self.config.numeric_coercion_threshold) {
                debug!(
                    "Converted '{}' to numeric ({} of {} values parsed)",
                    name, parse.parsed, parse.non_missing
                );
                diagnostics.push(
                    Diagnostic::info(
                        CleaningStage::TextNormalization,
                        "COLUMN_COERCED",
                        format!(
                            "Converted '{}' to numeric: {:.1}% of values parsed, {} became missing",
                            name,
                            parse.success_ratio() * 100.0,
                            parse.failures()
                        ),
                    )
                    .with_column(&name),
                );
                df.replace(&name, float_series(&name, parse.values))?;
                coerced.push(name);
            } else {
                if changed > 0 {
                    debug!("Normalized {} values in '{}'", changed, name);
                }
                df.replace(&name, Series::new(name.as_str().into(), values))?;
            }
        }

        info!(
            "Normalized {} text columns, converted {} to numeric",
            normalized,
            coerced.len()
        );
        Ok(coerced)
    }

    fn impute(
        &self,
        df: &mut DataFrame,
        profile: &DatasetProfile,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<()> {
        let mut filled_columns = 0;

        for col in &profile.column_profiles {
            if col.null_count == 0 {
                continue;
            }
            let series = df.column(&col.name)?.as_materialized_series();
            let result = match col.kind {
                ColumnKind::Numeric => StatisticalImputer::impute_median(series),
                ColumnKind::Text => {
                    StatisticalImputer::impute_constant(series, &self.config.missing_placeholder)
                }
                ColumnKind::Boolean | ColumnKind::Other => continue,
            };

            match result {
                Ok(Some(imputation)) => {
                    debug!(
                        "Filled {} missing values in '{}' with {}",
                        imputation.filled, col.name, imputation.value
                    );
                    diagnostics.push(
                        Diagnostic::info(
                            CleaningStage::Imputation,
                            "VALUES_IMPUTED",
                            format!(
                                "Filled {} missing values in '{}' with {} '{}'",
                                imputation.filled,
                                col.name,
                                if col.kind.is_numeric() { "median" } else { "placeholder" },
                                imputation.value
                            ),
                        )
                        .with_column(&col.name),
                    );
                    df.replace(&col.name, imputation.series)?;
                    filled_columns += 1;
                }
                Ok(None) => {}
                Err(e) => recover(CleaningStage::Imputation, e, diagnostics)?,
            }
        }

        info!("Imputed missing values in {} columns", filled_columns);
        Ok(())
    }

    fn cap_outliers(
        &self,
        df: &mut DataFrame,
        numeric_columns: &[String],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<()> {
        let mut total_capped = 0;

        for name in numeric_columns {
            let series = df.column(name)?.as_materialized_series();
            match outliers::cap_outliers(series, self.config.iqr_multiplier) {
                Ok(Some(capped)) => {
                    debug!(
                        "Capped {} outliers in '{}' to [{:.4}, {:.4}]",
                        capped.capped, name, capped.bounds.lower, capped.bounds.upper
                    );
                    diagnostics.push(
                        Diagnostic::info(
                            CleaningStage::OutlierCapping,
                            "OUTLIERS_CAPPED",
                            format!(
                                "Capped {} outliers in '{}' to [{:.4}, {:.4}]",
                                capped.capped, name, capped.bounds.lower, capped.bounds.upper
                            ),
                        )
                        .with_column(name),
                    );
                    total_capped += capped.capped;
                    df.replace(name, capped.series)?;
                }
                Ok(None) => {}
                Err(e) => recover(CleaningStage::OutlierCapping, e, diagnostics)?,
            }
        }

        info!("Capped {} outliers using the IQR method", total_capped);
        Ok(())
    }

    fn correct_skew(
        &self,
        df: &mut DataFrame,
        numeric_columns: &[String],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<String>> {
        let mut corrected = Vec::new();

        for name in numeric_columns {
            let series = df.column(name)?.as_materialized_series();
            match skew::correct_skew(series, self.config.skew_threshold) {
                Ok(Some(correction)) => {
                    let how = match correction.shift {
                        Some(shift) => format!("log1p after shifting by {shift}"),
                        None => "log1p".to_string(),
                    };
                    debug!(
                        "Applied {} to '{}' (skewness {:.3})",
                        how, name, correction.skewness
                    );
                    diagnostics.push(
                        Diagnostic::info(
                            CleaningStage::SkewCorrection,
                            "SKEW_CORRECTED",
                            format!(
                                "Applied {} to '{}' (skewness {:.3})",
                                how, name, correction.skewness
                            ),
                        )
                        .with_column(name),
                    );
                    df.replace(name, correction.series)?;
                    corrected.push(name.clone());
                }
                Ok(None) => {}
                Err(e) => recover(CleaningStage::SkewCorrection, e, diagnostics)?,
            }
        }

        info!("Corrected skew in {} columns", corrected.len());
        Ok(corrected)
    }
}

/// Turn a column-local error into a warning diagnostic; anything else is
/// returned to the caller.
fn recover(stage: CleaningStage, error: CleaningError, diagnostics: &mut Vec<Diagnostic>) -> Result<()> {
    if !error.is_column_local() {
        return Err(error);
    }
    warn!("{}: {}", stage, error);
    diagnostics.push(Diagnostic::from_error(stage, &error));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityEvaluator;
    use crate::utils::{duplicate_row_count, numeric_values};
    use pretty_assertions::assert_eq;

    fn cleaner() -> DataCleaner {
        DataCleaner::default()
    }

    #[test]
    fn test_prunes_high_null_columns() {
        let df = df! {
            "keep" => &[Some(1.0), Some(2.0), None, Some(4.0)],
            "drop" => &[None::<f64>, None, None, Some(1.0)],
        }
        .unwrap();

        let outcome = cleaner().clean(&df).unwrap();
        assert_eq!(outcome.dropped_columns, vec!["drop".to_string()]);
        assert!(outcome.data.column("drop").is_err());
        assert_eq!(outcome.initial_profile.get("drop").unwrap().null_ratio, 0.75);
    }

    #[test]
    fn test_null_ratio_at_threshold_is_kept() {
        // 7 of 10 missing is exactly 0.7, not above it
        let values: Vec<Option<f64>> = (0..10)
            .map(|i| if i < 7 { None } else { Some(i as f64) })
            .collect();
        let df = df! {
            "edge" => &values,
            "id" => &(0..10).collect::<Vec<i32>>(),
        }
        .unwrap();

        let outcome = cleaner().clean(&df).unwrap();
        assert!(outcome.dropped_columns.is_empty());
        assert_eq!(outcome.data.column("edge").unwrap().null_count(), 0);
    }

    #[test]
    fn test_removes_duplicates_keeping_order() {
        let df = df! {
            "a" => &[1i32, 2, 1, 3],
            "b" => &["x", "y", "x", "z"],
        }
        .unwrap();

        let outcome = cleaner().clean(&df).unwrap();
        assert_eq!(outcome.duplicates_removed, 1);
        assert_eq!(outcome.data.height(), 3);
        assert_eq!(duplicate_row_count(&outcome.data).unwrap(), 0);
    }

    #[test]
    fn test_text_normalized_and_coerced() {
        let df = df! {
            "price" => &[" 10", "20 ", "30", "forty", "50", "60", "70", "80", "90", "100"],
            "city" => &["  Paris", "ROME", "nan", "", "paris", "Rome", "rome", "oslo", "Oslo", "paris"],
        }
        .unwrap();

        let outcome = cleaner().clean(&df).unwrap();
        assert_eq!(outcome.coerced_columns, vec!["price".to_string()]);
        assert!(
            crate::utils::is_numeric_dtype(outcome.data.column("price").unwrap().dtype())
        );

        let city = outcome
            .data
            .column("city")
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::String)
            .unwrap();
        let city: Vec<Option<&str>> = city.str().unwrap().into_iter().collect();
        assert_eq!(city[0], Some("paris"));
        assert_eq!(city[1], Some("rome"));
        assert_eq!(city[2], Some("missing"));
        assert_eq!(city[3], Some("missing"));
    }

    #[test]
    fn test_no_nulls_after_clean() {
        let df = df! {
            "n" => &[Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)],
            "t" => &[Some("a"), Some("b"), None, Some("a"), Some("c")],
        }
        .unwrap();

        let outcome = cleaner().clean(&df).unwrap();
        for column in outcome.data.get_columns() {
            assert_eq!(column.null_count(), 0, "column {} has nulls", column.name());
        }
    }

    #[test]
    fn test_nan_treated_as_missing() {
        let df = df! {
            "x" => &[1.0, f64::NAN, 3.0, 4.0, 5.0, 6.0],
        }
        .unwrap();

        let outcome = cleaner().clean(&df).unwrap();
        let x = outcome.data.column("x").unwrap().as_materialized_series();
        assert_eq!(x.null_count(), 0);
        assert!(numeric_values(x).unwrap().iter().all(Option::is_some));
        assert!(
            outcome
                .diagnostics
                .iter()
                .any(|d| d.code == "VALUES_IMPUTED" && d.column.as_deref() == Some("x"))
        );

        let report = QualityEvaluator::default().evaluate(&outcome.data).unwrap();
        assert_eq!(report.missing_count, 0);
    }

    #[test]
    fn test_all_nan_column_dropped() {
        let df = df! {
            "keep" => &[1.0, 2.0, 3.0, 4.0],
            "nan" => &[f64::NAN, f64::NAN, f64::NAN, f64::NAN],
        }
        .unwrap();

        let outcome = cleaner().clean(&df).unwrap();
        assert_eq!(outcome.dropped_columns, vec!["nan".to_string()]);
        assert_eq!(outcome.initial_profile.get("nan").unwrap().null_ratio, 1.0);
    }

    #[test]
    fn test_narrowing_never_merges_rows() {
        // 1.0 and 1.00000001 are the same value in 32 bits
        let df = df! {
            "x" => &[1.0, 1.000_000_01, 2.0, 3.0, 4.0, 5.0],
            "t" => &["a", "a", "b", "c", "d", "e"],
        }
        .unwrap();

        let outcome = cleaner().clean(&df).unwrap();
        assert_eq!(outcome.data.height(), 6);
        assert_eq!(duplicate_row_count(&outcome.data).unwrap(), 0);
        assert_eq!(outcome.data.column("x").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_outliers_capped_within_bounds() {
        let df = df! {
            "x" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 1000.0],
        }
        .unwrap();
        let config = CleaningConfig::builder()
            .skew_threshold(100.0)
            .build()
            .unwrap();

        let outcome = DataCleaner::new(config).clean(&df).unwrap();
        let values = numeric_values(outcome.data.column("x").unwrap().as_materialized_series())
            .unwrap();
        // Q1 = 3.25, Q3 = 7.75, upper bound = 14.5
        let max = values.iter().flatten().copied().fold(f64::MIN, f64::max);
        assert!((max - 14.5).abs() < 1e-4);
        assert!(
            outcome
                .diagnostics
                .iter()
                .any(|d| d.code == "OUTLIERS_CAPPED")
        );
    }

    #[test]
    fn test_zero_iqr_column_left_untouched() {
        let df = df! {
            "mostly_zero" => &[0i64, 0, 0, 0, 0, 0, 0, 0, 0, 5],
            "id" => &(0..10).collect::<Vec<i64>>(),
        }
        .unwrap();
        let config = CleaningConfig::builder()
            .skew_threshold(100.0)
            .build()
            .unwrap();

        let outcome = DataCleaner::new(config).clean(&df).unwrap();
        let values = numeric_values(
            outcome
                .data
                .column("mostly_zero")
                .unwrap()
                .as_materialized_series(),
        )
        .unwrap();
        assert!(values.contains(&Some(5.0)));
        assert!(outcome.diagnostics.iter().any(|d| {
            d.stage == CleaningStage::OutlierCapping
                && d.code == "DEGENERATE_DISTRIBUTION"
                && d.column.as_deref() == Some("mostly_zero")
        }));
    }

    #[test]
    fn test_skewed_column_log_transformed() {
        let df = df! {
            "income" => &[1.0, 1.0, 1.0, 1.0, 10.0],
            "id" => &[1i32, 2, 3, 4, 5],
        }
        .unwrap();
        // keep the tail so only the log transform acts on it
        let config = CleaningConfig::builder()
            .iqr_multiplier(100.0)
            .build()
            .unwrap();

        let outcome = DataCleaner::new(config).clean(&df).unwrap();
        assert_eq!(outcome.skew_corrected_columns, vec!["income".to_string()]);

        let values = numeric_values(outcome.data.column("income").unwrap().as_materialized_series())
            .unwrap();
        assert!((values[0].unwrap() - 2f64.ln()).abs() < 1e-6);
        assert!((values[4].unwrap() - 11f64.ln()).abs() < 1e-6);
    }

    #[test]
    fn test_empty_table_passes_through() {
        let df = df! { "x" => Vec::<f64>::new() }.unwrap();
        let outcome = cleaner().clean(&df).unwrap();

        assert_eq!(outcome.data.height(), 0);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].code, "EMPTY_TABLE");
    }

    #[test]
    fn test_input_not_modified() {
        let df = df! {
            "t" => &[" A ", "b"],
            "n" => &[Some(1.0), None],
        }
        .unwrap();
        let snapshot = df.clone();
        let _ = cleaner().clean(&df).unwrap();
        assert!(df.equals_missing(&snapshot));
    }

    #[test]
    fn test_clean_is_deterministic() {
        let df = df! {
            "a" => &[Some(5.0), None, Some(1.0), Some(100.0), Some(2.0)],
            "b" => &[Some("x"), Some("y"), None, Some("x"), Some("z")],
        }
        .unwrap();
        let first = cleaner().clean(&df).unwrap();
        let second = cleaner().clean(&df).unwrap();
        assert!(first.data.equals_missing(&second.data));
        assert_eq!(first.diagnostics, second.diagnostics);
    }
}
