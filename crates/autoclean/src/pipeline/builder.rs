//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder chaining
//! cleaning, encoding and scaling.

use crate::cleaner::DataCleaner;
use crate::config::CleaningConfig;
use crate::error::Result;
use crate::pipeline::sink::{ClosureDiagnosticsSink, DiagnosticsSink};
use crate::quality::QualityEvaluator;
use crate::transform::{OneHotEncoder, StandardScaler, Transform};
use crate::types::{
    CleaningStage, Diagnostic, DiagnosticLevel, PipelineResult, PipelineSummary, QualityReport,
};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The main cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use autoclean::{CleaningConfig, Pipeline};
///
/// let result = Pipeline::builder()
///     .config(CleaningConfig::builder().one_hot_max_cardinality(10).build()?)
///     .on_diagnostic(|d| println!("[{}] {}", d.stage, d.message))
///     .build()?
///     .process(&dataframe)?;
///
/// println!("{} rows left", result.summary.rows_after);
/// ```
pub struct Pipeline {
    config: CleaningConfig,
    sink: Option<Arc<dyn DiagnosticsSink>>,
    cleaner: DataCleaner,
    encoder: OneHotEncoder,
    scaler: StandardScaler,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run cleaning, then encoding and scaling when enabled.
    ///
    /// The input table is not modified. Every diagnostic is forwarded to the
    /// configured sink as it is produced and returned in the result.
    pub fn process(&self, df: &DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let mut diagnostics = Vec::new();
        let mut summary = PipelineSummary {
            rows_before: df.height(),
            columns_before: df.width(),
            ..PipelineSummary::default()
        };

        info!("Starting cleaning pipeline...");
        self.emit(
            &mut diagnostics,
            Diagnostic::info(
                CleaningStage::Pipeline,
                "PIPELINE_STARTED",
                format!(
                    "Starting cleaning pipeline on {} rows x {} columns",
                    df.height(),
                    df.width()
                ),
            ),
        );

        // Step 1: Cleaning
        info!("Step 1: Cleaning dataset...");
        let outcome = self.cleaner.clean(df)?;
        for diagnostic in outcome.diagnostics {
            self.emit(&mut diagnostics, diagnostic);
        }
        summary.dropped_columns = outcome.dropped_columns;
        summary.duplicates_removed = outcome.duplicates_removed;
        summary.coerced_columns = outcome.coerced_columns;
        summary.skew_corrected_columns = outcome.skew_corrected_columns;
        self.emit(
            &mut diagnostics,
            Diagnostic::info(
                CleaningStage::Pipeline,
                "CLEANING_COMPLETED",
                format!(
                    "Cleaning complete: {} rows x {} columns",
                    outcome.data.height(),
                    outcome.data.width()
                ),
            ),
        );
        let mut data = outcome.data;

        // Step 2: Encoding
        if self.config.enable_encoding {
            info!("Step 2: Encoding categorical columns...");
            data = self.run_transform(&self.encoder, &data, &mut diagnostics)?;
            summary.encoded = true;
        } else {
            info!("Step 2: Skipping encoding (disabled)");
            self.emit(
                &mut diagnostics,
                Diagnostic::info(CleaningStage::Pipeline, "ENCODING_SKIPPED", "Encoding disabled"),
            );
        }

        // Step 3: Scaling
        if self.config.enable_scaling {
            info!("Step 3: Standardizing numeric columns...");
            data = self.run_transform(&self.scaler, &data, &mut diagnostics)?;
            summary.scaled = true;
        } else {
            info!("Step 3: Skipping scaling (disabled)");
            self.emit(
                &mut diagnostics,
                Diagnostic::info(CleaningStage::Pipeline, "SCALING_SKIPPED", "Scaling disabled"),
            );
        }

        summary.rows_after = data.height();
        summary.columns_after = data.width();
        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        summary.warning_count = diagnostics.iter().filter(|d| d.is_warning()).count();

        self.emit(
            &mut diagnostics,
            Diagnostic::info(
                CleaningStage::Pipeline,
                "PIPELINE_COMPLETED",
                format!(
                    "Pipeline completed in {} ms: {} rows x {} columns, {} warnings",
                    summary.duration_ms, summary.rows_after, summary.columns_after, summary.warning_count
                ),
            ),
        );
        info!(
            "Pipeline completed in {} ms ({} -> {} rows, {} -> {} columns)",
            summary.duration_ms,
            summary.rows_before,
            summary.rows_after,
            summary.columns_before,
            summary.columns_after
        );

        Ok(PipelineResult {
            data,
            diagnostics,
            summary,
        })
    }

    /// Score a table with the same thresholds as this pipeline.
    pub fn evaluate(&self, df: &DataFrame) -> Result<QualityReport> {
        QualityEvaluator::new(self.config.clone()).evaluate(df)
    }

    fn run_transform(
        &self,
        transform: &dyn Transform,
        df: &DataFrame,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<DataFrame> {
        let mut produced = Vec::new();
        let result = transform.apply(df, &mut produced)?;
        debug!(
            "{} produced {} diagnostics",
            transform.name(),
            produced.len()
        );
        for diagnostic in produced {
            self.emit(diagnostics, diagnostic);
        }
        Ok(result)
    }

    /// Forward a diagnostic to the sink and keep it.
    fn emit(&self, diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Info => debug!("{}", diagnostic),
            DiagnosticLevel::Warning => warn!("{}", diagnostic),
        }
        if let Some(sink) = &self.sink {
            sink.record(&diagnostic);
        }
        diagnostics.push(diagnostic);
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleaningConfig>,
    sink: Option<Arc<dyn DiagnosticsSink>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a sink receiving every diagnostic.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use autoclean::{CollectingSink, Pipeline};
    /// use std::sync::Arc;
    ///
    /// let sink = CollectingSink::new();
    /// let pipeline = Pipeline::builder()
    ///     .diagnostics_sink(Arc::new(sink.clone()))
    ///     .build()?;
    /// ```
    pub fn diagnostics_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set a diagnostic callback closure.
    ///
    /// This is a convenience method for simple handling.
    /// For more complex scenarios, use [`diagnostics_sink`](Self::diagnostics_sink).
    pub fn on_diagnostic<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Diagnostic) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(ClosureDiagnosticsSink::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            cleaner: DataCleaner::new(config.clone()),
            encoder: OneHotEncoder::from_config(&config),
            scaler: StandardScaler::new(),
            sink: self.sink,
            config,
        })
    }
}
