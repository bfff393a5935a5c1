//! Automatic Data Cleaning Library
//!
//! Turns a raw tabular dataset into a clean, numerically encoded and scaled
//! table, plus a quality score summarizing how well the cleaning succeeded.
//! Built with Rust and Polars.
//!
//! # Overview
//!
//! - **Profiling**: column kind, null ratio and distinct count per column
//! - **Cleaning**: sparse column pruning, deduplication, text normalization,
//!   numeric coercion, imputation, IQR outlier capping, skew correction
//! - **Memory Optimization**: integer/float narrowing and categorical text
//! - **Encoding**: one-hot for low-cardinality text, integer codes otherwise
//! - **Scaling**: zero mean, unit variance for numeric columns
//! - **Quality Evaluation**: a 0-100 score with the signals behind it
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use autoclean::{load_csv, CleaningConfig, Pipeline, QualityEvaluator};
//!
//! let df = load_csv("data/raw/dataset.csv")?;
//!
//! let config = CleaningConfig::builder()
//!     .null_drop_threshold(0.6)
//!     .one_hot_max_cardinality(10)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_diagnostic(|d| println!("{d}"))
//!     .build()?
//!     .process(&df)?;
//!
//! let report = QualityEvaluator::default().evaluate(&result.data)?;
//! println!("Quality score: {:.2}/100", report.score);
//! ```
//!
//! # Diagnostics
//!
//! The library never prints. Stage events and column-local anomalies (a
//! column that cannot be parsed, a column with no spread) are reported as
//! [`Diagnostic`] values, both in the returned [`PipelineResult`] and through
//! an optional [`DiagnosticsSink`]. A column-local anomaly never aborts a
//! run: the affected column is left as it was.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod optimizer;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod transform;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use error::{CleaningError, Result as CleaningResult};
pub use imputers::StatisticalImputer;
pub use io::{find_dataset, load_csv, write_csv};
pub use optimizer::MemoryOptimizer;
pub use pipeline::{
    ClosureDiagnosticsSink, CollectingSink, DiagnosticsSink, Pipeline, PipelineBuilder,
};
pub use profiler::DataProfiler;
pub use quality::QualityEvaluator;
pub use transform::{OneHotEncoder, StandardScaler, Transform};
pub use types::{
    CleaningOutcome, CleaningStage, ColumnKind, ColumnProfile, DatasetProfile, Diagnostic,
    DiagnosticLevel, PipelineResult, PipelineSummary, QualityPenalties, QualityRatios,
    QualityReport,
};
