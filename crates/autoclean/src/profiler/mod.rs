//! Data profiling module.
//!
//! Computes the per-column facts that drive cleaning decisions: the column
//! kind, the null ratio and the number of distinct non-missing values. The
//! profiler never coerces or mutates anything. NaN in a float column counts
//! as missing.

pub(crate) mod statistics;

use crate::error::Result;
use crate::types::{ColumnKind, ColumnProfile, DatasetProfile};
use crate::utils::nan_to_null;
use polars::prelude::*;
use tracing::debug;

/// Data profiler for analyzing dataset structure.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of a table, in table order.
    ///
    /// An empty table yields profiles with a null ratio of 0.
    pub fn profile(df: &DataFrame) -> Result<DatasetProfile> {
        let column_profiles = df
            .get_columns()
            .iter()
            .map(|col| Self::profile_column(col.as_materialized_series(), df.height()))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Profiled {} columns over {} rows",
            column_profiles.len(),
            df.height()
        );

        Ok(DatasetProfile {
            rows: df.height(),
            columns: df.width(),
            column_profiles,
        })
    }

    /// Profile a single column.
    pub fn profile_column(series: &Series, rows: usize) -> Result<ColumnProfile> {
        let series = nan_to_null(series)?;
        let null_count = series.null_count();
        let null_ratio = if rows == 0 {
            0.0
        } else {
            null_count as f64 / rows as f64
        };
        let distinct_count = series.drop_nulls().n_unique()?;

        Ok(ColumnProfile {
            name: series.name().to_string(),
            kind: ColumnKind::from_dtype(series.dtype()),
            dtype: series.dtype().to_string(),
            null_count,
            null_ratio,
            distinct_count,
        })
    }
}
