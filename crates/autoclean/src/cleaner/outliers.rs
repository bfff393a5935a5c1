//! IQR-based outlier capping.

use crate::error::Result;
use crate::profiler::statistics::{IqrBounds, iqr_bounds};
use crate::utils::{float_series, numeric_values, present_values};
use polars::prelude::*;

/// A column whose values were clamped to its IQR bounds.
#[derive(Debug, Clone)]
pub(crate) struct CappedColumn {
    pub series: Series,
    pub bounds: IqrBounds,
    pub capped: usize,
}

/// Clamp every value of a numeric column to `[Q1 - k*IQR, Q3 + k*IQR]`.
///
/// Returns `Ok(None)` when every value is already inside the bounds. A column
/// with no values or a zero IQR is reported as degenerate and left alone.
pub(crate) fn cap_outliers(series: &Series, multiplier: f64) -> Result<Option<CappedColumn>> {
    let values = numeric_values(series)?;
    let bounds = iqr_bounds(&present_values(&values), multiplier, series.name())?;

    let capped = values
        .iter()
        .flatten()
        .filter(|v| !bounds.contains(**v))
        .count();
    if capped == 0 {
        return Ok(None);
    }

    let clamped = values
        .into_iter()
        .map(|v| v.map(|x| bounds.clamp(x)))
        .collect();

    Ok(Some(CappedColumn {
        series: float_series(series.name(), clamped),
        bounds,
        capped,
    }))
}

/// Number of values of a numeric column outside its IQR bounds.
///
/// Degenerate columns count as having no outliers.
pub(crate) fn count_outliers(series: &Series, multiplier: f64) -> Result<usize> {
    let values = present_values(&numeric_values(series)?);
    match iqr_bounds(&values, multiplier, series.name()) {
        Ok(bounds) => Ok(values.iter().filter(|v| !bounds.contains(**v)).count()),
        Err(e) if e.is_column_local() => Ok(0),
        Err(e) => Err(e),
    }
}
