//! Shared helpers for reading columns and classifying dtypes.
//!
//! Stages work on plain `Vec<Option<_>>` views of a column and rebuild a
//! `Series` only when something changed.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || is_float_dtype(dtype)
}

/// Check if a DataType is a signed or unsigned integer.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Whether a DataType is stored as text (plain strings or categoricals).
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Dictionary-encoded string dtype backed by the global category registry.
pub fn categorical_dtype() -> DataType {
    DataType::from_categories(Categories::global())
}

/// Names of all columns in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Remove rows that exactly repeat an earlier row, keeping the first
/// occurrence and the original row order.
pub fn drop_duplicate_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    if df.width() == 0 || df.height() == 0 {
        return Ok(df.clone());
    }
    df.clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
}

/// Number of rows that exactly repeat an earlier row.
pub fn duplicate_row_count(df: &DataFrame) -> PolarsResult<usize> {
    Ok(df.height() - drop_duplicate_rows(df)?.height())
}

// =============================================================================
// Column views
// =============================================================================

/// Read a numeric column as `f64`, keeping missing entries as `None`.
///
/// NaN is treated as missing.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Turn NaN entries of a float column into nulls, keeping the dtype.
///
/// Other columns are returned unchanged.
pub fn nan_to_null(series: &Series) -> PolarsResult<Series> {
    if !is_float_dtype(series.dtype()) {
        return Ok(series.clone());
    }
    let values = numeric_values(series)?;
    if values.iter().flatten().count() + series.null_count() == series.len() {
        return Ok(series.clone());
    }
    float_series(series.name(), values).cast(series.dtype())
}

/// Apply [`nan_to_null`] to every float column of a table.
pub fn nans_to_nulls(df: &DataFrame) -> PolarsResult<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| nan_to_null(col.as_materialized_series()).map(Series::into_column))
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}

/// The non-missing values of a numeric column.
pub fn present_values(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Read any column as text. Categoricals and booleans are rendered through
/// their string cast.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Build a `Float64` series from optional values.
pub fn float_series(name: &str, values: Vec<Option<f64>>) -> Series {
    Series::new(name.into(), values)
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a trimmed value as a finite number.
///
/// Unlike lenient spreadsheet parsing, no currency or thousands separators are
/// stripped: the value must be a plain number. `inf` and `nan` are rejected.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whether a float has no fractional part and fits an `i64`.
#[inline]
pub fn is_whole(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::UInt16));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_integer_and_float_dtypes() {
        assert!(is_integer_dtype(&DataType::Int8));
        assert!(!is_integer_dtype(&DataType::Float32));
        assert!(is_float_dtype(&DataType::Float32));
        assert!(!is_float_dtype(&DataType::Int32));
    }

    #[test]
    fn test_nan_to_null() {
        let series = Series::new("x".into(), &[Some(1.0f32), Some(f32::NAN), None]);
        let cleaned = nan_to_null(&series).unwrap();
        assert_eq!(cleaned.dtype(), &DataType::Float32);
        assert_eq!(cleaned.null_count(), 2);
        assert_eq!(cleaned.f32().unwrap().get(0), Some(1.0));

        let text = Series::new("t".into(), &["NaN"]);
        assert_eq!(nan_to_null(&text).unwrap().null_count(), 0);
    }

    #[test]
    fn test_nans_to_nulls_keeps_shape() {
        let df = df! {
            "x" => &[f64::NAN, 2.0],
            "n" => &[1i64, 2],
        }
        .unwrap();
        let cleaned = nans_to_nulls(&df).unwrap();
        assert_eq!(cleaned.shape(), (2, 2));
        assert_eq!(cleaned.column("x").unwrap().null_count(), 1);
        assert_eq!(cleaned.column("n").unwrap().null_count(), 0);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("  -3.5 "), Some(-3.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("$12"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("nan"), None);
    }

    #[test]
    fn test_numeric_values_keeps_nulls() {
        let series = Series::new("x".into(), &[Some(1i64), None, Some(3)]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(present_values(&values), vec![1.0, 3.0]);
    }

    #[test]
    fn test_numeric_values_treats_nan_as_missing() {
        let series = Series::new("x".into(), &[1.0, f64::NAN]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None]);
    }

    #[test]
    fn test_string_values_from_boolean() {
        let series = Series::new("flag".into(), &[Some(true), None, Some(false)]);
        let values = string_values(&series).unwrap();
        assert_eq!(
            values,
            vec![Some("true".to_string()), None, Some("false".to_string())]
        );
    }

    #[test]
    fn test_drop_duplicate_rows_keeps_first_in_order() {
        let df = df! {
            "a" => &[3i32, 1, 3, 2, 1],
            "b" => &["x", "y", "x", "z", "y"],
        }
        .unwrap();
        let deduped = drop_duplicate_rows(&df).unwrap();
        let a: Vec<Option<i32>> = deduped
            .column("a")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(a, vec![Some(3), Some(1), Some(2)]);
        assert_eq!(duplicate_row_count(&df).unwrap(), 2);
    }

    #[test]
    fn test_duplicates_compare_every_column() {
        let df = df! {
            "a" => &[1i32, 1],
            "b" => &["x", "y"],
        }
        .unwrap();
        assert_eq!(duplicate_row_count(&df).unwrap(), 0);
    }

    #[test]
    fn test_is_whole() {
        assert!(is_whole(3.0));
        assert!(is_whole(-12.0));
        assert!(!is_whole(2.5));
        assert!(!is_whole(f64::INFINITY));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(99.999, 2), 100.0);
    }
}
