//! Storage narrowing for cleaned tables.
//!
//! Only the physical representation changes: integers move to the smallest
//! signed width holding their range, floats move to 32 bits when every value
//! survives the round trip and stays distinct, and repetitive text becomes
//! categorical.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::debug;

use crate::config::CleaningConfig;
use crate::error::Result;
use crate::transform::Transform;
use crate::types::{CleaningStage, Diagnostic};
use crate::utils::{
    categorical_dtype, column_names, is_float_dtype, is_integer_dtype, numeric_values,
    present_values,
};

/// Narrows column storage types without changing any value.
#[derive(Debug, Clone)]
pub struct MemoryOptimizer {
    float_tolerance: f64,
    categorical_ratio: f64,
}

impl Default for MemoryOptimizer {
    fn default() -> Self {
        Self::from_config(&CleaningConfig::default())
    }
}

impl MemoryOptimizer {
    pub fn new(float_tolerance: f64, categorical_ratio: f64) -> Self {
        Self {
            float_tolerance,
            categorical_ratio,
        }
    }

    pub fn from_config(config: &CleaningConfig) -> Self {
        Self::new(config.float_tolerance, config.categorical_ratio)
    }

    /// Narrow every column of a table.
    pub fn optimize(&self, df: &DataFrame) -> Result<DataFrame> {
        self.transform(df)
    }

    /// Target dtype for a column, or `None` when it should stay as is.
    fn target_dtype(&self, series: &Series, rows: usize) -> Result<Option<DataType>> {
        let dtype = series.dtype();

        if is_integer_dtype(dtype) {
            let values = present_values(&numeric_values(series)?);
            let (Some(min), Some(max)) = (
                values.iter().copied().reduce(f64::min),
                values.iter().copied().reduce(f64::max),
            ) else {
                return Ok(None);
            };
            let narrowest = smallest_int_dtype(min, max);
            return Ok(narrowest.filter(|target| byte_width(target) < byte_width(dtype)));
        }

        if matches!(dtype, DataType::Float64) {
            let values = present_values(&numeric_values(series)?);
            let fits = values.iter().all(|&x| {
                let narrowed = x as f32 as f64;
                narrowed.is_finite() && (narrowed - x).abs() <= self.float_tolerance * x.abs().max(1.0)
            });
            return Ok((fits && keeps_distinct_values(&values)).then_some(DataType::Float32));
        }

        if matches!(dtype, DataType::String) && rows > 0 {
            let distinct = series.drop_nulls().n_unique()?;
            let ratio = distinct as f64 / rows as f64;
            if ratio < self.categorical_ratio {
                return Ok(Some(categorical_dtype()));
            }
        }

        Ok(None)
    }
}

impl Transform for MemoryOptimizer {
    fn name(&self) -> &'static str {
        "memory_optimizer"
    }

    fn apply(&self, df: &DataFrame, diagnostics: &mut Vec<Diagnostic>) -> Result<DataFrame> {
        let before = df.estimated_size();
        let mut df = df.clone();
        let mut changed = Vec::new();

        for name in column_names(&df) {
            let series = df.column(&name)?.as_materialized_series().clone();
            let Some(target) = self.target_dtype(&series, df.height())? else {
                continue;
            };

            debug!("Narrowing '{}' from {} to {}", name, series.dtype(), target);
            let narrowed = series.cast(&target)?;
            df.replace(&name, narrowed)?;
            changed.push(format!("{name}: {} -> {}", series.dtype(), target));
        }

        let after = df.estimated_size();
        diagnostics.push(Diagnostic::info(
            CleaningStage::MemoryOptimization,
            "MEMORY_OPTIMIZED",
            format!(
                "Narrowed {} columns, {:.3} MB -> {:.3} MB{}",
                changed.len(),
                before as f64 / (1024.0 * 1024.0),
                after as f64 / (1024.0 * 1024.0),
                if changed.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", changed.join(", "))
                }
            ),
        ));
        Ok(df)
    }
}

/// Whether no two distinct values collapse into one in 32 bits.
///
/// Merged values could turn distinct rows into duplicates.
fn keeps_distinct_values(values: &[f64]) -> bool {
    let wide: HashSet<u64> = values.iter().map(|x| x.to_bits()).collect();
    let narrow: HashSet<u32> = values.iter().map(|&x| (x as f32).to_bits()).collect();
    wide.len() == narrow.len()
}

/// Smallest signed integer dtype whose range holds `[min, max]`.
fn smallest_int_dtype(min: f64, max: f64) -> Option<DataType> {
    let fits = |lo: f64, hi: f64| min >= lo && max <= hi;
    if fits(i8::MIN as f64, i8::MAX as f64) {
        Some(DataType::Int8)
    } else if fits(i16::MIN as f64, i16::MAX as f64) {
        Some(DataType::Int16)
    } else if fits(i32::MIN as f64, i32::MAX as f64) {
        Some(DataType::Int32)
    } else if fits(i64::MIN as f64, i64::MAX as f64) {
        Some(DataType::Int64)
    } else {
        None
    }
}

fn byte_width(dtype: &DataType) -> usize {
    match dtype {
        DataType::Int8 | DataType::UInt8 => 1,
        DataType::Int16 | DataType::UInt16 => 2,
        DataType::Int32 | DataType::UInt32 | DataType::Float32 => 4,
        _ if is_float_dtype(dtype) || is_integer_dtype(dtype) => 8,
        _ => usize::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_narrow_to_smallest_width() {
        let df = df! {
            "small" => &[1i64, -5, 100],
            "medium" => &[1i64, 30_000, -2],
            "large" => &[1i64, 3_000_000_000, 0],
        }
        .unwrap();
        let optimized = MemoryOptimizer::default().optimize(&df).unwrap();

        assert_eq!(optimized.column("small").unwrap().dtype(), &DataType::Int8);
        assert_eq!(optimized.column("medium").unwrap().dtype(), &DataType::Int16);
        assert_eq!(optimized.column("large").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_unsigned_never_widens() {
        let df = df! { "u" => &[0u8, 200] }.unwrap();
        let optimized = MemoryOptimizer::default().optimize(&df).unwrap();
        assert_eq!(optimized.column("u").unwrap().dtype(), &DataType::UInt8);
    }

    #[test]
    fn test_floats_narrow_within_tolerance() {
        let df = df! {
            "coarse" => &[0.5, 1.25, -3.0],
            "huge" => &[1e300, 1.0, 2.0],
        }
        .unwrap();
        let optimized = MemoryOptimizer::default().optimize(&df).unwrap();

        assert_eq!(optimized.column("coarse").unwrap().dtype(), &DataType::Float32);
        assert_eq!(optimized.column("huge").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_float_tolerance_is_respected() {
        // 0.1 is off by about 1.5e-9 in 32 bits
        let df = df! { "x" => &[0.1, 0.2] }.unwrap();

        let strict = MemoryOptimizer::new(1e-10, 0.5).optimize(&df).unwrap();
        assert_eq!(strict.column("x").unwrap().dtype(), &DataType::Float64);

        let loose = MemoryOptimizer::new(1e-6, 0.5).optimize(&df).unwrap();
        assert_eq!(loose.column("x").unwrap().dtype(), &DataType::Float32);
    }

    #[test]
    fn test_floats_that_would_merge_stay_wide() {
        let df = df! {
            "close" => &[1.0, 1.000_000_01, 2.0],
            "apart" => &[1.0, 1.5, 2.0],
        }
        .unwrap();
        let optimized = MemoryOptimizer::default().optimize(&df).unwrap();

        assert_eq!(optimized.column("close").unwrap().dtype(), &DataType::Float64);
        assert_eq!(optimized.column("apart").unwrap().dtype(), &DataType::Float32);
    }

    #[test]
    fn test_low_cardinality_text_becomes_categorical() {
        let df = df! {
            "city" => &["a", "b", "a", "a", "b", "a"],
            "id" => &["1", "2", "3", "4", "5", "6"],
        }
        .unwrap();
        let optimized = MemoryOptimizer::default().optimize(&df).unwrap();

        assert!(matches!(
            optimized.column("city").unwrap().dtype(),
            DataType::Categorical(_, _)
        ));
        assert_eq!(optimized.column("id").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_values_unchanged() {
        let df = df! {
            "n" => &[1i64, 2, 3],
            "city" => &["x", "x", "y"],
        }
        .unwrap();
        let optimized = MemoryOptimizer::new(1e-6, 0.9).optimize(&df).unwrap();

        let n: Vec<Option<f64>> =
            numeric_values(optimized.column("n").unwrap().as_materialized_series()).unwrap();
        assert_eq!(n, vec![Some(1.0), Some(2.0), Some(3.0)]);

        let city = optimized
            .column("city")
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::String)
            .unwrap();
        let city: Vec<Option<&str>> = city.str().unwrap().into_iter().collect();
        assert_eq!(city, vec![Some("x"), Some("x"), Some("y")]);
    }

    #[test]
    fn test_records_diagnostic() {
        let df = df! { "n" => &[1i64, 2] }.unwrap();
        let mut diagnostics = Vec::new();
        MemoryOptimizer::default().apply(&df, &mut diagnostics).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "MEMORY_OPTIMIZED");
    }
}
