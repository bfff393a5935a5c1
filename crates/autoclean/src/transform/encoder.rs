//! Categorical encoding.

use std::collections::{BTreeSet, HashMap, HashSet};

use polars::prelude::*;
use tracing::debug;

use super::Transform;
use crate::config::CleaningConfig;
use crate::error::Result;
use crate::types::{CleaningStage, ColumnKind, Diagnostic};
use crate::utils::{column_names, string_values};

/// Replaces every text column with numeric columns.
///
/// Categories are the distinct non-missing values, sorted. Columns with at
/// most `max_cardinality` categories become drop-first one-hot indicators
/// named `{column}_{value}`, placed where the original column was. Wider
/// columns become a single `Int32` column of codes in `[0, distinct)`.
/// Missing values are `false` in every indicator and stay missing as codes.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    max_cardinality: usize,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new(CleaningConfig::default().one_hot_max_cardinality)
    }
}

impl OneHotEncoder {
    pub fn new(max_cardinality: usize) -> Self {
        Self { max_cardinality }
    }

    pub fn from_config(config: &CleaningConfig) -> Self {
        Self::new(config.one_hot_max_cardinality)
    }

    fn one_hot(
        name: &str,
        values: &[Option<String>],
        categories: &[String],
        used_names: &mut HashSet<String>,
    ) -> Vec<Column> {
        categories
            .iter()
            .skip(1)
            .map(|category| {
                let column_name = unique_name(format!("{name}_{category}"), used_names);
                let indicator: Vec<bool> = values
                    .iter()
                    .map(|v| v.as_deref() == Some(category.as_str()))
                    .collect();
                Series::new(column_name.as_str().into(), indicator).into_column()
            })
            .collect()
    }

    fn codes(name: &str, values: &[Option<String>], categories: &[String]) -> Column {
        let lookup: HashMap<&str, i32> = categories
            .iter()
            .enumerate()
            .map(|(code, category)| (category.as_str(), code as i32))
            .collect();
        let codes: Vec<Option<i32>> = values
            .iter()
            .map(|v| v.as_deref().and_then(|v| lookup.get(v).copied()))
            .collect();
        Series::new(name.into(), codes).into_column()
    }
}

impl Transform for OneHotEncoder {
    fn name(&self) -> &'static str {
        "encoder"
    }

    fn apply(&self, df: &DataFrame, diagnostics: &mut Vec<Diagnostic>) -> Result<DataFrame> {
        let mut used_names: HashSet<String> = column_names(df).into_iter().collect();
        let mut columns = Vec::with_capacity(df.width());
        let mut encoded = 0;

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            if ColumnKind::from_dtype(series.dtype()) != ColumnKind::Text {
                columns.push(column.clone());
                continue;
            }

            let name = series.name().to_string();
            let values = string_values(series)?;
            let categories: Vec<String> = values
                .iter()
                .flatten()
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            encoded += 1;

            if categories.len() <= self.max_cardinality {
                let indicators = Self::one_hot(&name, &values, &categories, &mut used_names);
                debug!(
                    "One-hot encoded '{}' into {} indicator columns",
                    name,
                    indicators.len()
                );
                let diagnostic = if indicators.is_empty() {
                    Diagnostic::warning(
                        CleaningStage::Encoding,
                        "SINGLE_CATEGORY_DROPPED",
                        format!(
                            "Column '{}' has {} distinct value(s), nothing remains after drop-first",
                            name,
                            categories.len()
                        ),
                    )
                } else {
                    Diagnostic::info(
                        CleaningStage::Encoding,
                        "ONE_HOT_ENCODED",
                        format!(
                            "One-hot encoded '{}' ({} categories, reference '{}')",
                            name,
                            categories.len(),
                            categories.first().map(String::as_str).unwrap_or_default()
                        ),
                    )
                };
                diagnostics.push(diagnostic.with_column(&name));
                columns.extend(indicators);
            } else {
                debug!(
                    "Label encoded '{}' with {} codes",
                    name,
                    categories.len()
                );
                diagnostics.push(
                    Diagnostic::info(
                        CleaningStage::Encoding,
                        "LABEL_ENCODED",
                        format!(
                            "Encoded '{}' as integer codes ({} categories)",
                            name,
                            categories.len()
                        ),
                    )
                    .with_column(&name),
                );
                columns.push(Self::codes(&name, &values, &categories));
            }
        }

        debug!("Encoded {} text columns", encoded);
        Ok(DataFrame::new(columns)?)
    }
}

/// Make a generated column name unique against names already in use.
fn unique_name(candidate: String, used: &mut HashSet<String>) -> String {
    let mut name = candidate.clone();
    let mut suffix = 1;
    while used.contains(&name) {
        name = format!("{candidate}_{suffix}");
        suffix += 1;
    }
    used.insert(name.clone());
    name
}
