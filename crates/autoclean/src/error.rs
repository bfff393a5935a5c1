//! Error types for the cleaning pipeline.
//!
//! Only [`CleaningError::MissingInput`] is fatal for a run. The column-local
//! kinds ([`CleaningError::UnparseableColumn`] and
//! [`CleaningError::DegenerateDistribution`]) and [`CleaningError::EmptyTable`]
//! are caught by the stage orchestrators and turned into diagnostics, leaving
//! the affected column as it was.
//!
//! Errors serialize as `{code, message}` so they can be embedded in JSON
//! reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// No table is available to process.
    #[error("No input data available: {0}")]
    MissingInput(String),

    /// The table has zero rows or zero columns.
    #[error("Table is empty ({rows} rows x {columns} columns)")]
    EmptyTable { rows: usize, columns: usize },

    /// A column cannot be interpreted under any expected kind.
    #[error("Column '{column}' cannot be interpreted: {reason}")]
    UnparseableColumn { column: String, reason: String },

    /// A column's distribution makes a statistic undefined (zero variance,
    /// zero IQR, too few values).
    #[error("Degenerate distribution in column '{column}': {reason}")]
    DegenerateDistribution { column: String, reason: String },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CleaningError {
    pub(crate) fn degenerate(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DegenerateDistribution {
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unparseable(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnparseableColumn {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code, used in diagnostics and serialized errors.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "MISSING_INPUT",
            Self::EmptyTable { .. } => "EMPTY_TABLE",
            Self::UnparseableColumn { .. } => "UNPARSEABLE_COLUMN",
            Self::DegenerateDistribution { .. } => "DEGENERATE_DISTRIBUTION",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// The affected column, for column-local errors.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::UnparseableColumn { column, .. }
            | Self::DegenerateDistribution { column, .. } => Some(column),
            Self::ColumnNotFound(column) => Some(column),
            _ => None,
        }
    }

    /// Whether this error only concerns a single column and should degrade
    /// to a no-op for that column instead of aborting the run.
    pub fn is_column_local(&self) -> bool {
        matches!(
            self,
            Self::UnparseableColumn { .. } | Self::DegenerateDistribution { .. }
        )
    }

    /// Whether the run can continue past this error.
    pub fn is_recoverable(&self) -> bool {
        self.is_column_local() || matches!(self, Self::EmptyTable { .. })
    }
}

impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;
