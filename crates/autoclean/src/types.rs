use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CleaningError;
use crate::utils::{is_numeric_dtype, is_text_dtype};

// ============================================================================
// Column kinds and profiles
// ============================================================================

/// Semantic kind of a column, derived from its stored dtype.
///
/// The kind is decided once at profiling time and threaded through every
/// stage instead of being re-derived from the runtime representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point values.
    Numeric,
    /// Strings or categoricals.
    Text,
    /// Booleans (encoder output, or raw boolean input before normalization).
    Boolean,
    /// Anything else (dates, lists, ...). Rendered as text by the cleaner.
    Other,
}

impl ColumnKind {
    /// Classify a polars dtype.
    pub fn from_dtype(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            Self::Numeric
        } else if is_text_dtype(dtype) {
            Self::Text
        } else if matches!(dtype, DataType::Boolean) {
            Self::Boolean
        } else {
            Self::Other
        }
    }

    pub fn is_numeric(self) -> bool {
        self == Self::Numeric
    }

    pub fn is_text(self) -> bool {
        self == Self::Text
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    /// Stored polars dtype, rendered as a string.
    pub dtype: String,
    pub null_count: usize,
    /// Fraction of missing entries, in [0, 1]. Zero for an empty table.
    pub null_ratio: f64,
    /// Number of distinct non-missing values.
    pub distinct_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    pub column_profiles: Vec<ColumnProfile>,
}

impl DatasetProfile {
    /// Look up the profile of a column by name.
    pub fn get(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|p| p.name == name)
    }

    /// Names of the columns of the given kind, in table order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.column_profiles
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns == 0
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Pipeline stage a diagnostic originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Run-level events (start, completion, skipped steps).
    Pipeline,
    Profiling,
    ColumnPruning,
    Deduplication,
    TextNormalization,
    Imputation,
    OutlierCapping,
    SkewCorrection,
    MemoryOptimization,
    Encoding,
    Scaling,
}

impl CleaningStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Profiling => "profiling",
            Self::ColumnPruning => "column_pruning",
            Self::Deduplication => "deduplication",
            Self::TextNormalization => "text_normalization",
            Self::Imputation => "imputation",
            Self::OutlierCapping => "outlier_capping",
            Self::SkewCorrection => "skew_correction",
            Self::MemoryOptimization => "memory_optimization",
            Self::Encoding => "encoding",
            Self::Scaling => "scaling",
        }
    }
}

impl std::fmt::Display for CleaningStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
}

/// Structured record of a stage event or a column-local anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: CleaningStage,
    pub level: DiagnosticLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Stable machine-readable code (e.g. `COLUMNS_DROPPED`, `DEGENERATE_DISTRIBUTION`).
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub fn info(stage: CleaningStage, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage,
            level: DiagnosticLevel::Info,
            column: None,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn warning(
        stage: CleaningStage,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            level: DiagnosticLevel::Warning,
            column: None,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Record a recovered error as a warning, keeping its code and column.
    pub fn from_error(stage: CleaningStage, error: &CleaningError) -> Self {
        Self {
            stage,
            level: DiagnosticLevel::Warning,
            column: error.column().map(str::to_string),
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.level == DiagnosticLevel::Warning
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.column {
            Some(column) => write!(f, "[{}] {} ({}): {}", self.stage, self.code, column, self.message),
            None => write!(f, "[{}] {}: {}", self.stage, self.code, self.message),
        }
    }
}

// ============================================================================
// Cleaning and pipeline results
// ============================================================================

/// Everything the cleaner produced for one table.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub data: DataFrame,
    /// Profile of the input table, before any column was dropped.
    pub initial_profile: DatasetProfile,
    pub dropped_columns: Vec<String>,
    /// Exact duplicates removed, including rows that only became equal after cleaning.
    pub duplicates_removed: usize,
    /// Text columns converted to numeric.
    pub coerced_columns: Vec<String>,
    /// Numeric columns that received a log transform.
    pub skew_corrected_columns: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Summary of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub dropped_columns: Vec<String>,
    pub duplicates_removed: usize,
    pub coerced_columns: Vec<String>,
    pub skew_corrected_columns: Vec<String>,
    pub encoded: bool,
    pub scaled: bool,
    pub warning_count: usize,
    pub duration_ms: u64,
}

/// Result of [`crate::Pipeline::process`].
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub data: DataFrame,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: PipelineSummary,
}

// ============================================================================
// Quality report
// ============================================================================

/// Read-only audit of a table produced by [`crate::QualityEvaluator`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub rows: usize,
    pub columns: usize,
    pub missing_count: usize,
    pub duplicate_count: usize,
    pub outlier_count: usize,
    pub skewed_column_count: usize,
    pub numeric_column_count: usize,
    pub non_numeric_column_count: usize,
    pub properly_scaled_count: usize,
    /// True when no text-kind column remains.
    pub encoded_ok: bool,
    pub memory_mb: f64,
    pub ratios: QualityRatios,
    pub penalties: QualityPenalties,
    /// Composite score in [0, 100], rounded to 2 decimals.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityRatios {
    pub missing: f64,
    pub duplicate: f64,
    pub outlier: f64,
    pub skew: f64,
    pub scaling: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityPenalties {
    pub missing: f64,
    pub duplicate: f64,
    pub outlier: f64,
    pub skew: f64,
    pub scaling: f64,
    pub encoding: f64,
}

impl QualityPenalties {
    pub fn total(&self) -> f64 {
        self.missing + self.duplicate + self.outlier + self.skew + self.scaling + self.encoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_kind_from_dtype() {
        assert_eq!(ColumnKind::from_dtype(&DataType::Int64), ColumnKind::Numeric);
        assert_eq!(ColumnKind::from_dtype(&DataType::Float32), ColumnKind::Numeric);
        assert_eq!(ColumnKind::from_dtype(&DataType::UInt8), ColumnKind::Numeric);
        assert_eq!(ColumnKind::from_dtype(&DataType::String), ColumnKind::Text);
        assert_eq!(ColumnKind::from_dtype(&DataType::Boolean), ColumnKind::Boolean);
        assert_eq!(ColumnKind::from_dtype(&DataType::Date), ColumnKind::Other);
    }

    #[test]
    fn test_diagnostic_from_error_keeps_column() {
        let error = CleaningError::degenerate("price", "zero IQR");
        let diagnostic = Diagnostic::from_error(CleaningStage::OutlierCapping, &error);

        assert!(diagnostic.is_warning());
        assert_eq!(diagnostic.column.as_deref(), Some("price"));
        assert_eq!(diagnostic.code, "DEGENERATE_DISTRIBUTION");
        assert_eq!(
            diagnostic.to_string(),
            "[outlier_capping] DEGENERATE_DISTRIBUTION (price): Degenerate distribution in column 'price': zero IQR"
        );
    }

    #[test]
    fn test_diagnostic_serialization_skips_missing_column() {
        let diagnostic = Diagnostic::info(CleaningStage::Deduplication, "DUPLICATES_REMOVED", "Removed 2 duplicate rows");
        let json = serde_json::to_string(&diagnostic).unwrap();
        assert!(json.contains("\"stage\":\"deduplication\""));
        assert!(json.contains("\"level\":\"info\""));
        assert!(!json.contains("column"));
    }

    #[test]
    fn test_dataset_profile_lookup() {
        let profile = DatasetProfile {
            rows: 3,
            columns: 2,
            column_profiles: vec![
                ColumnProfile {
                    name: "a".to_string(),
                    kind: ColumnKind::Numeric,
                    dtype: "i64".to_string(),
                    null_count: 0,
                    null_ratio: 0.0,
                    distinct_count: 3,
                },
                ColumnProfile {
                    name: "b".to_string(),
                    kind: ColumnKind::Text,
                    dtype: "str".to_string(),
                    null_count: 1,
                    null_ratio: 1.0 / 3.0,
                    distinct_count: 2,
                },
            ],
        };

        assert_eq!(profile.get("b").map(|p| p.null_count), Some(1));
        assert!(profile.get("c").is_none());
        assert_eq!(profile.columns_of_kind(ColumnKind::Numeric), vec!["a".to_string()]);
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_penalties_total() {
        let penalties = QualityPenalties {
            missing: 1.0,
            duplicate: 2.0,
            outlier: 3.0,
            skew: 4.0,
            scaling: 5.0,
            encoding: 10.0,
        };
        assert_eq!(penalties.total(), 25.0);
    }
}
