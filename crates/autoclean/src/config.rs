//! Configuration for the cleaning pipeline.
//!
//! Every threshold the stages use is a tunable here, built through
//! [`CleaningConfig::builder()`] and validated on `build()`.

use serde::{Deserialize, Serialize};

/// Tunables for profiling, cleaning, encoding, scaling and evaluation.
///
/// # Example
///
/// ```rust,ignore
/// use autoclean::config::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .null_drop_threshold(0.5)
///     .one_hot_max_cardinality(10)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Columns whose null ratio is strictly above this value are dropped.
    /// Default: 0.7
    pub null_drop_threshold: f64,

    /// A text column is converted to numeric when the share of its non-missing
    /// values that parse as numbers is strictly above this value.
    /// Default: 0.8
    pub numeric_coercion_threshold: f64,

    /// Multiplier applied to the IQR when computing capping bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Columns with |skewness| strictly above this value are log-transformed.
    /// Default: 1.0
    pub skew_threshold: f64,

    /// Text columns with at most this many distinct values are one-hot
    /// encoded; above it they get integer codes.
    /// Default: 15
    pub one_hot_max_cardinality: usize,

    /// Text columns with `distinct / rows` below this ratio are stored as
    /// categoricals by the memory optimizer.
    /// Default: 0.5
    pub categorical_ratio: f64,

    /// A column "looks standardized" when |mean| is below this value.
    /// Default: 0.25
    pub scaled_mean_tolerance: f64,

    /// Lower (exclusive) bound on the standard deviation of a well-scaled column.
    /// Default: 0.5
    pub scaled_std_min: f64,

    /// Upper (exclusive) bound on the standard deviation of a well-scaled column.
    /// Default: 1.5
    pub scaled_std_max: f64,

    /// Relative tolerance for narrowing floats to 32 bits.
    /// Default: 1e-6
    pub float_tolerance: f64,

    /// Placeholder written into missing text cells.
    /// Default: "missing"
    pub missing_placeholder: String,

    /// Whether the pipeline runs the encoder after cleaning.
    /// Default: true
    pub enable_encoding: bool,

    /// Whether the pipeline runs the scaler after encoding.
    /// Default: true
    pub enable_scaling: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            null_drop_threshold: 0.7,
            numeric_coercion_threshold: 0.8,
            iqr_multiplier: 1.5,
            skew_threshold: 1.0,
            one_hot_max_cardinality: 15,
            categorical_ratio: 0.5,
            scaled_mean_tolerance: 0.25,
            scaled_std_min: 0.5,
            scaled_std_max: 1.5,
            float_tolerance: 1e-6,
            missing_placeholder: "missing".to_string(),
            enable_encoding: true,
            enable_scaling: true,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("null_drop_threshold", self.null_drop_threshold),
            ("numeric_coercion_threshold", self.numeric_coercion_threshold),
            ("categorical_ratio", self.categorical_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        for (field, value) in [
            ("iqr_multiplier", self.iqr_multiplier),
            ("skew_threshold", self.skew_threshold),
            ("scaled_mean_tolerance", self.scaled_mean_tolerance),
            ("scaled_std_min", self.scaled_std_min),
            ("float_tolerance", self.float_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigValidationError::NegativeValue {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !self.scaled_std_max.is_finite() || self.scaled_std_min >= self.scaled_std_max {
            return Err(ConfigValidationError::InvalidStdBounds {
                min: self.scaled_std_min,
                max: self.scaled_std_max,
            });
        }

        if self.missing_placeholder.trim().is_empty() {
            return Err(ConfigValidationError::EmptyPlaceholder);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid value for '{field}': {value} (must be finite and non-negative)")]
    NegativeValue { field: String, value: f64 },

    #[error("Invalid scaled std bounds: min {min} must be below max {max}")]
    InvalidStdBounds { min: f64, max: f64 },

    #[error("Missing-value placeholder must not be empty")]
    EmptyPlaceholder,
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    null_drop_threshold: Option<f64>,
    numeric_coercion_threshold: Option<f64>,
    iqr_multiplier: Option<f64>,
    skew_threshold: Option<f64>,
    one_hot_max_cardinality: Option<usize>,
    categorical_ratio: Option<f64>,
    scaled_mean_tolerance: Option<f64>,
    scaled_std_min: Option<f64>,
    scaled_std_max: Option<f64>,
    float_tolerance: Option<f64>,
    missing_placeholder: Option<String>,
    enable_encoding: Option<bool>,
    enable_scaling: Option<bool>,
}

impl CleaningConfigBuilder {
    /// Set the null ratio above which columns are dropped.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.7 = 70%)
    pub fn null_drop_threshold(mut self, threshold: f64) -> Self {
        self.null_drop_threshold = Some(threshold);
        self
    }

    /// Set the share of parsable values needed to convert text to numeric.
    pub fn numeric_coercion_threshold(mut self, threshold: f64) -> Self {
        self.numeric_coercion_threshold = Some(threshold);
        self
    }

    /// Set the IQR multiplier used for outlier bounds.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the absolute skewness above which a log transform is applied.
    pub fn skew_threshold(mut self, threshold: f64) -> Self {
        self.skew_threshold = Some(threshold);
        self
    }

    /// Set the largest cardinality that is still one-hot encoded.
    pub fn one_hot_max_cardinality(mut self, max: usize) -> Self {
        self.one_hot_max_cardinality = Some(max);
        self
    }

    /// Set the distinct/rows ratio below which text becomes categorical.
    pub fn categorical_ratio(mut self, ratio: f64) -> Self {
        self.categorical_ratio = Some(ratio);
        self
    }

    /// Set the mean tolerance of the "well-scaled" check.
    pub fn scaled_mean_tolerance(mut self, tolerance: f64) -> Self {
        self.scaled_mean_tolerance = Some(tolerance);
        self
    }

    /// Set the exclusive standard deviation bounds of the "well-scaled" check.
    pub fn scaled_std_bounds(mut self, min: f64, max: f64) -> Self {
        self.scaled_std_min = Some(min);
        self.scaled_std_max = Some(max);
        self
    }

    /// Set the relative tolerance for float narrowing.
    pub fn float_tolerance(mut self, tolerance: f64) -> Self {
        self.float_tolerance = Some(tolerance);
        self
    }

    /// Set the placeholder used for missing text values.
    pub fn missing_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.missing_placeholder = Some(placeholder.into());
        self
    }

    /// Enable or disable the encoding stage of the pipeline.
    pub fn enable_encoding(mut self, enable: bool) -> Self {
        self.enable_encoding = Some(enable);
        self
    }

    /// Enable or disable the scaling stage of the pipeline.
    pub fn enable_scaling(mut self, enable: bool) -> Self {
        self.enable_scaling = Some(enable);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let defaults = CleaningConfig::default();
        let config = CleaningConfig {
            null_drop_threshold: self
                .null_drop_threshold
                .unwrap_or(defaults.null_drop_threshold),
            numeric_coercion_threshold: self
                .numeric_coercion_threshold
                .unwrap_or(defaults.numeric_coercion_threshold),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            skew_threshold: self.skew_threshold.unwrap_or(defaults.skew_threshold),
            one_hot_max_cardinality: self
                .one_hot_max_cardinality
                .unwrap_or(defaults.one_hot_max_cardinality),
            categorical_ratio: self.categorical_ratio.unwrap_or(defaults.categorical_ratio),
            scaled_mean_tolerance: self
                .scaled_mean_tolerance
                .unwrap_or(defaults.scaled_mean_tolerance),
            scaled_std_min: self.scaled_std_min.unwrap_or(defaults.scaled_std_min),
            scaled_std_max: self.scaled_std_max.unwrap_or(defaults.scaled_std_max),
            float_tolerance: self.float_tolerance.unwrap_or(defaults.float_tolerance),
            missing_placeholder: self
                .missing_placeholder
                .unwrap_or(defaults.missing_placeholder),
            enable_encoding: self.enable_encoding.unwrap_or(defaults.enable_encoding),
            enable_scaling: self.enable_scaling.unwrap_or(defaults.enable_scaling),
        };

        config.validate()?;
        Ok(config)
    }
}
