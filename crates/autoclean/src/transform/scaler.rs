//! Standardization of numeric columns.

use polars::prelude::*;
use tracing::{debug, warn};

use super::Transform;
use crate::error::{CleaningError, Result};
use crate::profiler::statistics::{mean, sample_std};
use crate::types::{CleaningStage, ColumnKind, Diagnostic};
use crate::utils::{column_names, float_series, numeric_values, present_values};

/// Rewrites every numeric column as `(x - mean) / std` in `Float64`.
///
/// The standard deviation is the sample one (n - 1). A column with zero
/// variance, or a single value, is centered only, which maps every value to
/// `0.0`, and a `DEGENERATE_DISTRIBUTION` diagnostic is recorded. Columns
/// without any value are left untouched.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler;

impl StandardScaler {
    pub fn new() -> Self {
        Self
    }

    fn scale(series: &Series) -> Result<(Series, Option<CleaningError>)> {
        let values = numeric_values(series)?;
        let present = present_values(&values);
        let name = series.name().as_str();

        let Some(mu) = mean(&present) else {
            return Err(CleaningError::degenerate(name, "no values to standardize"));
        };

        let (sigma, degenerate) = match sample_std(&present) {
            Some(sigma) if sigma > 0.0 => (sigma, None),
            Some(_) => (
                1.0,
                Some(CleaningError::degenerate(
                    name,
                    "zero variance, column centered to 0.0",
                )),
            ),
            None => (
                1.0,
                Some(CleaningError::degenerate(
                    name,
                    "fewer than 2 values, column centered to 0.0",
                )),
            ),
        };

        let scaled = values
            .into_iter()
            .map(|v| v.map(|x| (x - mu) / sigma))
            .collect();
        Ok((float_series(name, scaled), degenerate))
    }
}

impl Transform for StandardScaler {
    fn name(&self) -> &'static str {
        "scaler"
    }

    fn apply(&self, df: &DataFrame, diagnostics: &mut Vec<Diagnostic>) -> Result<DataFrame> {
        let mut df = df.clone();
        let mut scaled = 0;

        for name in column_names(&df) {
            let series = df.column(&name)?.as_materialized_series().clone();
            if ColumnKind::from_dtype(series.dtype()) != ColumnKind::Numeric {
                continue;
            }

            match Self::scale(&series) {
                Ok((standardized, degenerate)) => {
                    df.replace(&name, standardized)?;
                    scaled += 1;
                    if let Some(error) = degenerate {
                        warn!("{}", error);
                        diagnostics.push(Diagnostic::from_error(CleaningStage::Scaling, &error));
                    }
                }
                Err(error) if error.is_column_local() => {
                    warn!("Skipping '{}': {}", name, error);
                    diagnostics.push(Diagnostic::from_error(CleaningStage::Scaling, &error));
                }
                Err(error) => return Err(error),
            }
        }

        debug!("Standardized {} numeric columns", scaled);
        diagnostics.push(Diagnostic::info(
            CleaningStage::Scaling,
            "COLUMNS_STANDARDIZED",
            format!("Standardized {scaled} numeric columns"),
        ));
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(df: &DataFrame, name: &str) -> (f64, f64) {
        let values = present_values(
            &numeric_values(df.column(name).unwrap().as_materialized_series()).unwrap(),
        );
        (mean(&values).unwrap(), sample_std(&values).unwrap())
    }

    #[test]
    fn test_standardizes_numeric_columns() {
        let df = df! {
            "a" => &[1i64, 2, 3, 4, 5],
            "b" => &[10.0, 20.0, 35.0, 41.0, 1000.0],
            "t" => &["x", "y", "z", "w", "v"],
        }
        .unwrap();

        let scaled = StandardScaler::new().transform(&df).unwrap();
        for name in ["a", "b"] {
            let (m, s) = stats(&scaled, name);
            assert!(m.abs() < 1e-6, "mean of {name} was {m}");
            assert!((s - 1.0).abs() < 1e-6, "std of {name} was {s}");
            assert_eq!(scaled.column(name).unwrap().dtype(), &DataType::Float64);
        }
        assert_eq!(scaled.column("t").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_zero_variance_is_centered() {
        let df = df! { "c" => &[7.0, 7.0, 7.0] }.unwrap();
        let mut diagnostics = Vec::new();
        let scaled = StandardScaler::new().apply(&df, &mut diagnostics).unwrap();

        let values: Vec<Option<f64>> = scaled
            .column("c")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(0.0), Some(0.0), Some(0.0)]);
        assert!(
            diagnostics
                .iter()
                .any(|d| d.code == "DEGENERATE_DISTRIBUTION" && d.column.as_deref() == Some("c"))
        );
    }

    #[test]
    fn test_missing_values_stay_missing() {
        let df = df! { "x" => &[Some(1.0), None, Some(3.0)] }.unwrap();
        let scaled = StandardScaler::new().transform(&df).unwrap();
        assert_eq!(scaled.column("x").unwrap().null_count(), 1);
    }

    #[test]
    fn test_idempotent_within_tolerance() {
        let df = df! { "x" => &[3.0, 8.0, 1.0, 9.0, 4.0, 12.0] }.unwrap();
        let scaler = StandardScaler::new();
        let once = scaler.transform(&df).unwrap();
        let twice = scaler.transform(&once).unwrap();

        let first = once.column("x").unwrap().as_materialized_series().f64().unwrap().clone();
        let second = twice.column("x").unwrap().as_materialized_series().f64().unwrap().clone();
        for (a, b) in first.into_iter().zip(second.into_iter()) {
            assert!((a.unwrap() - b.unwrap()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_does_not_modify_input() {
        let df = df! { "x" => &[1i32, 2, 3] }.unwrap();
        let _ = StandardScaler::new().transform(&df).unwrap();
        assert_eq!(df.column("x").unwrap().dtype(), &DataType::Int32);
    }
}
