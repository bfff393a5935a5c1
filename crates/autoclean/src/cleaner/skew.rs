//! Log transform of strongly skewed numeric columns.

use crate::error::Result;
use crate::profiler::statistics::skewness;
use crate::utils::{float_series, numeric_values, present_values};
use polars::prelude::*;

#[derive(Debug, Clone)]
pub(crate) struct SkewCorrection {
    pub series: Series,
    pub skewness: f64,
    /// Shift added before the log so the minimum maps to 1, if one was needed.
    pub shift: Option<f64>,
}

/// Apply `ln(1 + x)` when `|skewness| > threshold`.
///
/// When the minimum is not positive the column is first shifted so the
/// minimum becomes 1 (`x - min + 1`). Returns `Ok(None)` for columns within
/// the threshold; undefined skewness is reported as degenerate.
pub(crate) fn correct_skew(series: &Series, threshold: f64) -> Result<Option<SkewCorrection>> {
    let values = numeric_values(series)?;
    let present = present_values(&values);
    let skew = skewness(&present, series.name())?;
    if skew.abs() <= threshold {
        return Ok(None);
    }

    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let shift = (min <= 0.0).then(|| 1.0 - min);
    let offset = shift.unwrap_or(0.0);

    let transformed = values
        .into_iter()
        .map(|v| v.map(|x| (x + offset).ln_1p()))
        .collect();

    Ok(Some(SkewCorrection {
        series: float_series(series.name(), transformed),
        skewness: skew,
        shift,
    }))
}
