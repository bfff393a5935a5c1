//! Statistical imputation methods.
//!
//! Numeric columns are filled with their median, text columns with a constant
//! placeholder.

use crate::error::{CleaningError, Result};
use crate::profiler::statistics::median;
use crate::utils::{is_integer_dtype, is_whole, numeric_values, present_values, string_values};
use polars::prelude::*;

/// A filled column together with what was written into it.
#[derive(Debug, Clone)]
pub struct Imputation {
    pub series: Series,
    pub filled: usize,
    /// The fill value, rendered for diagnostics.
    pub value: String,
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill missing entries of a numeric column with the median of its
    /// non-missing values.
    ///
    /// Integer columns keep their dtype when the median is whole; otherwise
    /// the result is `Float64`. Returns `Ok(None)` when nothing is missing and
    /// a degenerate-distribution error when every entry is missing.
    pub fn impute_median(series: &Series) -> Result<Option<Imputation>> {
        let values = numeric_values(series)?;
        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing == 0 {
            return Ok(None);
        }

        let name = series.name().to_string();
        let Some(fill) = median(&present_values(&values)) else {
            return Err(CleaningError::degenerate(
                name,
                "every value is missing, no median to impute",
            ));
        };

        let filled: Series = if is_integer_dtype(series.dtype()) && is_whole(fill) {
            fill_integers(series, fill)?
        } else {
            let floats: Vec<Option<f64>> = values.iter().map(|v| Some(v.unwrap_or(fill))).collect();
            Series::new(name.as_str().into(), floats)
        };

        Ok(Some(Imputation {
            series: filled,
            filled: missing,
            value: format!("{fill}"),
        }))
    }

    /// Fill missing entries of a text column with a constant.
    pub fn impute_constant(series: &Series, placeholder: &str) -> Result<Option<Imputation>> {
        if series.null_count() == 0 {
            return Ok(None);
        }

        let values = string_values(series)?;
        let missing = values.iter().filter(|v| v.is_none()).count();
        let filled: Vec<String> = values
            .into_iter()
            .map(|v| v.unwrap_or_else(|| placeholder.to_string()))
            .collect();

        Ok(Some(Imputation {
            series: Series::new(series.name().clone(), filled),
            filled: missing,
            value: placeholder.to_string(),
        }))
    }
}

/// Fill the nulls of an integer column with a whole `fill`, reading the
/// present values in their own width so large ones stay exact.
fn fill_integers(series: &Series, fill: f64) -> Result<Series> {
    let name = series.name().clone();
    let filled = if matches!(series.dtype(), DataType::UInt64) {
        let fill = fill as u64;
        let values: Vec<u64> = series
            .u64()?
            .into_iter()
            .map(|v| v.unwrap_or(fill))
            .collect();
        Series::new(name, values)
    } else {
        // every other integer width fits in i64
        let wide = series.cast(&DataType::Int64)?;
        let fill = fill as i64;
        let values: Vec<i64> = wide
            .i64()?
            .into_iter()
            .map(|v| v.unwrap_or(fill))
            .collect();
        Series::new(name, values)
    };
    Ok(filled.cast(series.dtype())?)
}
