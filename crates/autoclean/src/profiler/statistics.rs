//! Descriptive statistics over the non-missing values of a numeric column.
//!
//! These are computed by hand over `f64` slices so the cleaner and the
//! evaluator share exactly the same quartile and skewness definitions.

use crate::error::{CleaningError, Result};

/// Arithmetic mean. `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Quantile of an ascending-sorted slice, interpolating linearly between the
/// two nearest ranks at position `q * (n - 1)`.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Median with linear interpolation. `None` for an empty slice.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted_copy(values), 0.5)
}

/// Interquartile range and the capping bounds derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

/// Compute `[Q1 - k*IQR, Q3 + k*IQR]`.
///
/// Fails with a degenerate-distribution error when the column has no values or
/// a zero IQR; such columns are left untouched by callers.
pub(crate) fn iqr_bounds(values: &[f64], multiplier: f64, column: &str) -> Result<IqrBounds> {
    let sorted = sorted_copy(values);
    let (Some(q1), Some(q3)) = (quantile_sorted(&sorted, 0.25), quantile_sorted(&sorted, 0.75))
    else {
        return Err(CleaningError::degenerate(column, "no values to compute quartiles"));
    };

    let iqr = q3 - q1;
    if iqr == 0.0 {
        return Err(CleaningError::degenerate(
            column,
            format!("zero interquartile range (Q1 = Q3 = {q1})"),
        ));
    }

    Ok(IqrBounds {
        q1,
        q3,
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
    })
}

/// Adjusted Fisher-Pearson sample skewness,
/// `G1 = sqrt(n(n-1)) / (n-2) * m3 / m2^1.5`.
///
/// Undefined below three values or for zero variance.
pub(crate) fn skewness(values: &[f64], column: &str) -> Result<f64> {
    let n = values.len();
    if n < 3 {
        return Err(CleaningError::degenerate(
            column,
            format!("skewness needs at least 3 values, found {n}"),
        ));
    }

    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let (m2, m3) = values.iter().fold((0.0, 0.0), |(m2, m3), v| {
        let d = v - mean;
        (m2 + d * d, m3 + d * d * d)
    });
    let m2 = m2 / nf;
    let m3 = m3 / nf;

    if m2 <= f64::EPSILON * mean.abs().max(1.0) {
        return Err(CleaningError::degenerate(column, "zero variance"));
    }

    Ok((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * m3 / m2.powf(1.5))
}
